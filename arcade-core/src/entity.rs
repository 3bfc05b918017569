use core::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::genetics::Genome;
use crate::math::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentTier {
    Large,
    Medium,
    Small,
}

impl FragmentTier {
    /// Tier produced when this one breaks, if any.
    pub const fn child(self) -> Option<FragmentTier> {
        match self {
            FragmentTier::Large => Some(FragmentTier::Medium),
            FragmentTier::Medium => Some(FragmentTier::Small),
            FragmentTier::Small => None,
        }
    }

    pub const fn score(self) -> u32 {
        match self {
            FragmentTier::Large => SCORE_LARGE_FRAGMENT,
            FragmentTier::Medium => SCORE_MEDIUM_FRAGMENT,
            FragmentTier::Small => SCORE_SMALL_FRAGMENT,
        }
    }

    pub const fn speed_band(self) -> (f64, f64) {
        match self {
            FragmentTier::Large => FRAGMENT_LARGE_SPEED,
            FragmentTier::Medium => FRAGMENT_MEDIUM_SPEED,
            FragmentTier::Small => FRAGMENT_SMALL_SPEED,
        }
    }

    pub const fn spin_limit(self) -> f64 {
        match self {
            FragmentTier::Large => FRAGMENT_LARGE_SPIN,
            FragmentTier::Medium => FRAGMENT_MEDIUM_SPIN,
            FragmentTier::Small => FRAGMENT_SMALL_SPIN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTier {
    Common,
    Rare,
    Epic,
}

impl ResourceTier {
    pub const ALL: [ResourceTier; 3] = [ResourceTier::Common, ResourceTier::Rare, ResourceTier::Epic];

    /// Credits awarded on collection.
    pub const fn value(self) -> u32 {
        match self {
            ResourceTier::Common => 1,
            ResourceTier::Rare => 3,
            ResourceTier::Epic => 5,
        }
    }

    /// Palette index for render collaborators.
    pub const fn color_class(self) -> u8 {
        match self {
            ResourceTier::Common => 2,
            ResourceTier::Rare => 3,
            ResourceTier::Epic => 1,
        }
    }

    pub const fn size_class(self) -> u8 {
        match self {
            ResourceTier::Common => 1,
            ResourceTier::Rare | ResourceTier::Epic => 2,
        }
    }
}

/// Flat type tag, mainly for snapshots and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    PlayerCraft,
    FragmentLarge,
    FragmentMedium,
    FragmentSmall,
    Projectile,
    ResourceCommon,
    ResourceRare,
    ResourceEpic,
}

impl EntityKind {
    pub const fn fragment(tier: FragmentTier) -> Self {
        match tier {
            FragmentTier::Large => EntityKind::FragmentLarge,
            FragmentTier::Medium => EntityKind::FragmentMedium,
            FragmentTier::Small => EntityKind::FragmentSmall,
        }
    }

    pub const fn resource(tier: ResourceTier) -> Self {
        match tier {
            ResourceTier::Common => EntityKind::ResourceCommon,
            ResourceTier::Rare => EntityKind::ResourceRare,
            ResourceTier::Epic => EntityKind::ResourceEpic,
        }
    }

    pub const fn fragment_tier(self) -> Option<FragmentTier> {
        match self {
            EntityKind::FragmentLarge => Some(FragmentTier::Large),
            EntityKind::FragmentMedium => Some(FragmentTier::Medium),
            EntityKind::FragmentSmall => Some(FragmentTier::Small),
            _ => None,
        }
    }

    pub const fn resource_tier(self) -> Option<ResourceTier> {
        match self {
            EntityKind::ResourceCommon => Some(ResourceTier::Common),
            EntityKind::ResourceRare => Some(ResourceTier::Rare),
            EntityKind::ResourceEpic => Some(ResourceTier::Epic),
            _ => None,
        }
    }

    /// Default `(radius, mass)`.
    pub const fn default_shape(self) -> (f64, f64) {
        match self {
            EntityKind::PlayerCraft => (CRAFT_RADIUS, CRAFT_MASS),
            EntityKind::FragmentLarge => FRAGMENT_LARGE_SHAPE,
            EntityKind::FragmentMedium => FRAGMENT_MEDIUM_SHAPE,
            EntityKind::FragmentSmall => FRAGMENT_SMALL_SHAPE,
            EntityKind::Projectile => (PROJECTILE_RADIUS, PROJECTILE_MASS),
            EntityKind::ResourceCommon | EntityKind::ResourceRare | EntityKind::ResourceEpic => {
                (RESOURCE_RADIUS, RESOURCE_MASS)
            }
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::PlayerCraft => "player_craft",
            EntityKind::FragmentLarge => "fragment_large",
            EntityKind::FragmentMedium => "fragment_medium",
            EntityKind::FragmentSmall => "fragment_small",
            EntityKind::Projectile => "projectile",
            EntityKind::ResourceCommon => "resource_common",
            EntityKind::ResourceRare => "resource_rare",
            EntityKind::ResourceEpic => "resource_epic",
        };
        f.write_str(name)
    }
}

/// Craft energy. Every write clamps into `[0, ENERGY_MAX]`, so under- and
/// overflow cannot be observed.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Energy(f64);

impl Energy {
    pub const FULL: Energy = Energy(ENERGY_MAX);

    pub fn new(value: f64) -> Self {
        let mut energy = Energy(0.0);
        energy.set(value);
        energy
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    pub fn set(&mut self, value: f64) {
        self.0 = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, ENERGY_MAX)
        };
    }

    pub fn add(&mut self, amount: f64) {
        self.set(self.0 + amount);
    }

    pub fn sub(&mut self, amount: f64) {
        self.set(self.0 - amount);
    }
}

/// Variant-specific data. A projectile always carries a lifetime and only
/// the craft carries a genome and energy.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Craft { genome: Genome, energy: Energy },
    Fragment(FragmentTier),
    Projectile { lifetime: f64 },
    Resource(ResourceTier),
}

impl Body {
    pub fn kind(&self) -> EntityKind {
        match self {
            Body::Craft { .. } => EntityKind::PlayerCraft,
            Body::Fragment(tier) => EntityKind::fragment(*tier),
            Body::Projectile { .. } => EntityKind::Projectile,
            Body::Resource(tier) => EntityKind::resource(*tier),
        }
    }

    pub fn lifetime(&self) -> Option<f64> {
        match self {
            Body::Projectile { lifetime } => Some(*lifetime),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f64,
    pub angular_velocity: f64,
    pub radius: f64,
    pub mass: f64,
    pub age: f64,
    pub active: bool,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn is_craft(&self) -> bool {
        matches!(self.body, Body::Craft { .. })
    }

    pub fn fragment_tier(&self) -> Option<FragmentTier> {
        match self.body {
            Body::Fragment(tier) => Some(tier),
            _ => None,
        }
    }

    pub fn resource_tier(&self) -> Option<ResourceTier> {
        match self.body {
            Body::Resource(tier) => Some(tier),
            _ => None,
        }
    }

    pub fn energy(&self) -> Option<Energy> {
        match self.body {
            Body::Craft { energy, .. } => Some(energy),
            _ => None,
        }
    }

    pub fn energy_mut(&mut self) -> Option<&mut Energy> {
        match &mut self.body {
            Body::Craft { energy, .. } => Some(energy),
            _ => None,
        }
    }

    pub fn genome(&self) -> Option<&Genome> {
        match &self.body {
            Body::Craft { genome, .. } => Some(genome),
            _ => None,
        }
    }

    /// True once a lifetime-bearing entity has lived its full span.
    pub fn is_expired(&self) -> bool {
        self.body.lifetime().is_some_and(|lifetime| self.age >= lifetime)
    }
}
