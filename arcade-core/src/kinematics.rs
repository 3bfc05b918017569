use crate::config::SimConfig;
use crate::entity::Entity;
use crate::math::{normalize_angle, Vec2};
use crate::space::ToroidalSpace;

/// Per-step control input for the craft. Ignored for every other body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Propulsion {
    pub thrust: bool,
    pub speed_multiplier: f64,
}

impl Propulsion {
    pub const COAST: Self = Self {
        thrust: false,
        speed_multiplier: 1.0,
    };
}

#[derive(Clone, Debug)]
pub struct Kinematics {
    space: ToroidalSpace,
    thrust_force: f64,
    max_speed: f64,
    craft_drag: f64,
}

impl Kinematics {
    pub fn new(config: &SimConfig) -> Self {
        let craft_drag = config.kinematics.craft_drag;
        if craft_drag < 1.0 {
            tracing::warn!(
                craft_drag,
                "craft drag enabled; craft momentum is no longer conserved"
            );
        }
        Self {
            space: ToroidalSpace::new(&config.arena),
            thrust_force: config.craft.thrust_force,
            max_speed: config.craft.max_speed,
            craft_drag,
        }
    }

    /// Advances one body by `dt`. Bodies whose lifetime runs out are
    /// deactivated in place and left where they were.
    pub fn integrate(&self, entity: &mut Entity, dt: f64, propulsion: Propulsion) {
        if !entity.active {
            return;
        }

        entity.age += dt;
        if entity.is_expired() {
            entity.active = false;
            return;
        }

        if entity.is_craft() {
            let multiplier = propulsion.speed_multiplier;
            if propulsion.thrust {
                entity.velocity +=
                    Vec2::from_angle(entity.heading, self.thrust_force * multiplier * dt);
            }
            if self.craft_drag < 1.0 {
                entity.velocity = entity.velocity * self.craft_drag;
            }
            entity.velocity = entity.velocity.clamp_length(self.max_speed * multiplier);
        }

        entity.position = self.space.wrap(entity.position + entity.velocity * dt);
        entity.heading = normalize_angle(entity.heading + entity.angular_velocity * dt);
    }
}
