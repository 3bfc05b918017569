use crate::constants::{PROJECTILE_LIFETIME, PROJECTILE_SPEED};
use crate::entity::{Body, Energy, Entity, EntityId, EntityKind, FragmentTier, ResourceTier};
use crate::error::{IntegrityRule, SimError};
use crate::genetics::Genome;
use crate::math::Vec2;
use crate::rng::SeededRng;
use crate::space::ToroidalSpace;

/// Everything needed to create one entity. Per-type defaults fill in the
/// shape and lifetime unless overridden.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    pub body: Body,
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f64,
    pub angular_velocity: f64,
    pub radius: f64,
    pub mass: f64,
}

impl SpawnRequest {
    /// Projectiles ignore `velocity` and leave at the fixed muzzle speed
    /// along `heading`. A craft spawned this way gets the default genome at
    /// full energy; use [`SpawnRequest::craft`] to pick the genome.
    pub fn new(kind: EntityKind, position: Vec2, velocity: Vec2, heading: f64) -> Self {
        let body = match kind {
            EntityKind::PlayerCraft => Body::Craft {
                genome: Genome::default(),
                energy: Energy::FULL,
            },
            EntityKind::Projectile => Body::Projectile {
                lifetime: PROJECTILE_LIFETIME,
            },
            EntityKind::FragmentLarge => Body::Fragment(FragmentTier::Large),
            EntityKind::FragmentMedium => Body::Fragment(FragmentTier::Medium),
            EntityKind::FragmentSmall => Body::Fragment(FragmentTier::Small),
            EntityKind::ResourceCommon => Body::Resource(ResourceTier::Common),
            EntityKind::ResourceRare => Body::Resource(ResourceTier::Rare),
            EntityKind::ResourceEpic => Body::Resource(ResourceTier::Epic),
        };
        let velocity = match body {
            Body::Projectile { .. } => Vec2::from_angle(heading, PROJECTILE_SPEED),
            _ => velocity,
        };
        let (radius, mass) = kind.default_shape();
        Self {
            body,
            position,
            velocity,
            heading,
            angular_velocity: 0.0,
            radius,
            mass,
        }
    }

    pub fn craft(position: Vec2, heading: f64, genome: Genome) -> Self {
        let mut request = Self::new(EntityKind::PlayerCraft, position, Vec2::ZERO, heading);
        request.body = Body::Craft {
            genome,
            energy: Energy::FULL,
        };
        request
    }

    /// A fragment drifting in a random direction at a speed inside its
    /// tier's band, with a random spin.
    pub fn drifting(tier: FragmentTier, position: Vec2, rng: &mut SeededRng) -> Self {
        let (min_speed, max_speed) = tier.speed_band();
        let direction = rng.angle();
        let speed = rng.range_f64(min_speed, max_speed);
        let heading = rng.angle();
        let spin = rng.symmetric(tier.spin_limit());
        Self::new(
            EntityKind::fragment(tier),
            position,
            Vec2::from_angle(direction, speed),
            heading,
        )
        .with_spin(spin)
    }

    pub fn with_shape(mut self, radius: f64, mass: f64) -> Self {
        self.radius = radius;
        self.mass = mass;
        self
    }

    pub fn with_spin(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    fn validate(&self) -> Result<(), SimError> {
        let shape_ok = self.radius.is_finite()
            && self.radius > 0.0
            && self.mass.is_finite()
            && self.mass > 0.0;
        let lifetime_ok = self
            .body
            .lifetime()
            .map_or(true, |lifetime| lifetime.is_finite() && lifetime > 0.0);
        let motion_ok =
            self.position.is_finite() && self.velocity.is_finite() && self.heading.is_finite();
        if shape_ok && lifetime_ok && motion_ok {
            Ok(())
        } else {
            Err(SimError::InvalidSpawnParameters {
                kind: self.body.kind(),
                radius: self.radius,
                mass: self.mass,
            })
        }
    }
}

/// Sole owner of every entity in a session. Entities are kept in ascending
/// id order, which is also the order every phase iterates in.
#[derive(Clone, Debug)]
pub struct EntityPool {
    space: ToroidalSpace,
    entities: Vec<Entity>,
    next_id: u64,
}

impl EntityPool {
    pub fn new(space: ToroidalSpace) -> Self {
        Self {
            space,
            entities: Vec::with_capacity(64),
            next_id: 1,
        }
    }

    /// Adds an entity, or logs and returns `None` when the request has a
    /// non-positive shape. A rejected request leaves the pool untouched.
    pub fn spawn(&mut self, request: SpawnRequest) -> Option<EntityId> {
        if let Err(err) = request.validate() {
            tracing::warn!(error = %err, "spawn rejected");
            return None;
        }

        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            body: request.body,
            position: self.space.wrap(request.position),
            velocity: request.velocity,
            heading: crate::math::normalize_angle(request.heading),
            angular_velocity: request.angular_velocity,
            radius: request.radius,
            mass: request.mass,
            age: 0.0,
            active: true,
        });
        Some(id)
    }

    /// Marks an entity inactive. It stays visible to the rest of the
    /// sub-step until [`EntityPool::compact`] runs. Returns whether the
    /// entity was active.
    pub fn deactivate(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) if entity.active => {
                entity.active = false;
                true
            }
            _ => false,
        }
    }

    /// Drops inactive entities. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.active);
        before - self.entities.len()
    }

    /// Empties the pool and restarts id assignment.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |entity| entity.id)
            .ok()
            .map(|index| &self.entities[index])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.entities.binary_search_by_key(&id, |entity| entity.id) {
            Ok(index) => Some(&mut self.entities[index]),
            Err(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn active(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| entity.active)
    }

    /// Ids of active entities matching `filter`, ascending.
    pub fn active_ids(&self, filter: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.active()
            .filter(|entity| filter(entity))
            .map(|entity| entity.id)
            .collect()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.active().filter(|entity| entity.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Checks the population after a sub-step. Any failure here is a logic
    /// defect upstream, never something to repair in place.
    pub fn validate(&self, frame: u64) -> Result<(), SimError> {
        let mut previous: Option<EntityId> = None;
        for entity in &self.entities {
            let violation = |rule| SimError::PopulationIntegrity {
                frame,
                entity: entity.id,
                rule,
            };

            if let Some(prev) = previous {
                if entity.id == prev {
                    return Err(violation(IntegrityRule::DuplicateId));
                }
                if entity.id < prev {
                    return Err(violation(IntegrityRule::OutOfOrderId));
                }
            }
            previous = Some(entity.id);

            if !(entity.position.is_finite()
                && entity.velocity.is_finite()
                && entity.heading.is_finite())
            {
                return Err(violation(IntegrityRule::NonFiniteState));
            }
            if !self.space.contains(entity.position) {
                return Err(violation(IntegrityRule::PositionOutOfBounds));
            }
            if !(entity.radius > 0.0 && entity.mass > 0.0) {
                return Err(violation(IntegrityRule::NonPositiveShape));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }
}
