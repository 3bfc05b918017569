use crate::config::{Band, FragmentationConfig, SplitConfig};
use crate::entity::{Entity, EntityKind, FragmentTier, ResourceTier};
use crate::math::Vec2;
use crate::pool::SpawnRequest;
use crate::rng::SeededRng;

/// What a destroyed fragment leaves behind.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitOutcome {
    pub children: Vec<SpawnRequest>,
    pub resource: Option<SpawnRequest>,
}

impl SplitOutcome {
    pub fn into_requests(self) -> Vec<SpawnRequest> {
        let mut requests = self.children;
        requests.extend(self.resource);
        requests
    }
}

#[derive(Clone, Debug)]
pub struct FragmentationRule {
    large: SplitConfig,
    medium: SplitConfig,
    resource_chance: f64,
    resource_scatter: f64,
    resource_drift: Band,
    tier_table: [(ResourceTier, u32); 3],
}

impl FragmentationRule {
    pub fn new(config: &FragmentationConfig) -> Self {
        let weights = config.tier_weights;
        Self {
            large: config.large,
            medium: config.medium,
            resource_chance: config.resource_chance,
            resource_scatter: config.resource_scatter,
            resource_drift: config.resource_drift,
            tier_table: [
                (ResourceTier::Common, weights.common),
                (ResourceTier::Rare, weights.rare),
                (ResourceTier::Epic, weights.epic),
            ],
        }
    }

    /// Splits a destroyed fragment. Non-fragments yield nothing.
    pub fn split(&self, fragment: &Entity, rng: &mut SeededRng) -> SplitOutcome {
        let Some(tier) = fragment.fragment_tier() else {
            return SplitOutcome {
                children: Vec::new(),
                resource: None,
            };
        };

        SplitOutcome {
            children: self.children(tier, fragment),
            resource: self.roll_resource(fragment.position, rng),
        }
    }

    /// Two children of the next tier down, mirrored about the parent's
    /// direction of travel. Small fragments have no children.
    pub fn children(&self, tier: FragmentTier, parent: &Entity) -> Vec<SpawnRequest> {
        let (Some(child_tier), Some(split)) = (tier.child(), self.split_for(tier)) else {
            return Vec::new();
        };
        let reference = parent.velocity.heading_or(0.0);
        [reference + split.angular_offset, reference - split.angular_offset]
            .into_iter()
            .map(|direction| {
                SpawnRequest::new(
                    EntityKind::fragment(child_tier),
                    parent.position,
                    Vec2::from_angle(direction, split.speed),
                    direction,
                )
                .with_spin(parent.angular_velocity)
            })
            .collect()
    }

    /// Independent drop roll. The tier draw only happens on a successful
    /// roll, so the RNG stream advances by one draw per miss.
    pub fn roll_resource(&self, origin: Vec2, rng: &mut SeededRng) -> Option<SpawnRequest> {
        if !rng.chance(self.resource_chance) {
            return None;
        }
        let tier = rng.pick_weighted(&self.tier_table)?;
        let offset = Vec2::new(
            rng.symmetric(self.resource_scatter),
            rng.symmetric(self.resource_scatter),
        );
        let drift = Vec2::from_angle(
            rng.angle(),
            rng.range_f64(self.resource_drift.min, self.resource_drift.max),
        );
        Some(SpawnRequest::new(
            EntityKind::resource(tier),
            origin + offset,
            drift,
            0.0,
        ))
    }

    fn split_for(&self, tier: FragmentTier) -> Option<SplitConfig> {
        match tier {
            FragmentTier::Large => Some(self.large),
            FragmentTier::Medium => Some(self.medium),
            FragmentTier::Small => None,
        }
    }
}
