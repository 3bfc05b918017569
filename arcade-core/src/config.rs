//! Simulation context.
//!
//! A [`SimConfig`] is built by the caller and handed by reference to every
//! component constructor. There is no process-wide registry, so any number of
//! independent simulations can coexist.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::SimError;
use crate::genetics::{Genome, Terrain};

/// Closed interval `[min, max]` (or half-open for random draws).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn is_ordered(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<(f64, f64)> for Band {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds simulated by one sub-step.
    pub fixed_step: f64,
    /// Upper bound on sub-steps run by a single `tick`.
    pub max_substeps: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_step: FIXED_STEP,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Fraction of craft velocity retained per sub-step. Fragments,
    /// projectiles and resources never see drag.
    pub craft_drag: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            craft_drag: CRAFT_DRAG,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    pub thrust_force: f64,
    /// Radians per second while a rotation input is held.
    pub rotation_speed: f64,
    pub max_speed: f64,
    pub fire_cooldown: f64,
    pub spawn_invulnerability: f64,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            thrust_force: CRAFT_THRUST_FORCE,
            rotation_speed: CRAFT_ROTATION_SPEED,
            max_speed: CRAFT_MAX_SPEED,
            fire_cooldown: CRAFT_FIRE_COOLDOWN,
            spawn_invulnerability: CRAFT_SPAWN_INVULNERABLE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Energy drained per second of thrust, before genetic modifiers.
    pub thrust_cost: f64,
    /// Energy recovered per second while not thrusting.
    pub regen: f64,
    /// Below this the craft is forced to rest.
    pub min_movement: f64,
    pub weapon_cost: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            thrust_cost: ENERGY_THRUST_COST,
            regen: ENERGY_REGEN,
            min_movement: ENERGY_MIN_MOVEMENT,
            weapon_cost: ENERGY_WEAPON_COST,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Children leave at `+offset` and `-offset` radians from the parent heading.
    pub angular_offset: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentationConfig {
    pub large: SplitConfig,
    pub medium: SplitConfig,
    pub resource_chance: f64,
    pub resource_scatter: f64,
    pub resource_drift: Band,
    pub tier_weights: TierWeights,
}

impl Default for FragmentationConfig {
    fn default() -> Self {
        Self {
            large: SplitConfig {
                angular_offset: SPLIT_LARGE.0,
                speed: SPLIT_LARGE.1,
            },
            medium: SplitConfig {
                angular_offset: SPLIT_MEDIUM.0,
                speed: SPLIT_MEDIUM.1,
            },
            resource_chance: RESOURCE_DROP_CHANCE,
            resource_scatter: RESOURCE_SCATTER,
            resource_drift: RESOURCE_DRIFT_SPEED.into(),
            tier_weights: TierWeights {
                common: RESOURCE_WEIGHT_COMMON,
                rare: RESOURCE_WEIGHT_RARE,
                epic: RESOURCE_WEIGHT_EPIC,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierBounds {
    pub speed: Band,
    pub drain: Band,
}

impl Default for ModifierBounds {
    fn default() -> Self {
        Self {
            speed: SPEED_MULTIPLIER_BOUNDS.into(),
            drain: DRAIN_MULTIPLIER_BOUNDS.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub spawn_craft: bool,
    pub large_fragments: u32,
    pub edge_padding: f64,
    /// Minimum toroidal distance between the craft and a seeded fragment.
    pub craft_clearance: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            spawn_craft: true,
            large_fragments: INITIAL_LARGE_FRAGMENTS,
            edge_padding: SPAWN_EDGE_PADDING,
            craft_clearance: SPAWN_CRAFT_CLEARANCE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub scheduler: SchedulerConfig,
    pub kinematics: KinematicsConfig,
    pub craft: CraftConfig,
    pub energy: EnergyConfig,
    pub fragmentation: FragmentationConfig,
    pub modifiers: ModifierBounds,
    pub population: PopulationConfig,
    /// Medium filling the arena; feeds the craft's genetic modifiers.
    pub medium: Terrain,
    pub genome: Genome,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        positive(self.arena.width, "arena.width")?;
        positive(self.arena.height, "arena.height")?;
        positive(self.scheduler.fixed_step, "scheduler.fixed_step")?;
        if self.scheduler.max_substeps == 0 {
            return Err(invalid("scheduler.max_substeps", "must be at least 1"));
        }
        if !(self.kinematics.craft_drag > 0.0 && self.kinematics.craft_drag <= 1.0) {
            return Err(invalid("kinematics.craft_drag", "must be in (0, 1]"));
        }
        non_negative(self.craft.thrust_force, "craft.thrust_force")?;
        non_negative(self.craft.rotation_speed, "craft.rotation_speed")?;
        positive(self.craft.max_speed, "craft.max_speed")?;
        non_negative(self.craft.fire_cooldown, "craft.fire_cooldown")?;
        non_negative(self.craft.spawn_invulnerability, "craft.spawn_invulnerability")?;
        non_negative(self.energy.thrust_cost, "energy.thrust_cost")?;
        non_negative(self.energy.regen, "energy.regen")?;
        non_negative(self.energy.weapon_cost, "energy.weapon_cost")?;
        if !(0.0..=ENERGY_MAX).contains(&self.energy.min_movement) {
            return Err(invalid("energy.min_movement", "must be within the energy range"));
        }
        let frag = &self.fragmentation;
        if !(0.0..=1.0).contains(&frag.resource_chance) {
            return Err(invalid("fragmentation.resource_chance", "must be a probability"));
        }
        non_negative(frag.resource_scatter, "fragmentation.resource_scatter")?;
        ordered(frag.resource_drift, "fragmentation.resource_drift")?;
        let weights = frag.tier_weights;
        match weights
            .common
            .checked_add(weights.rare)
            .and_then(|sum| sum.checked_add(weights.epic))
        {
            None => return Err(invalid("fragmentation.tier_weights", "total overflows")),
            Some(0) => return Err(invalid("fragmentation.tier_weights", "all weights are zero")),
            Some(_) => {}
        }
        ordered(self.modifiers.speed, "modifiers.speed")?;
        ordered(self.modifiers.drain, "modifiers.drain")?;
        if self.modifiers.speed.min <= 0.0 || self.modifiers.drain.min < 0.0 {
            return Err(invalid("modifiers", "lower bounds must be positive"));
        }
        non_negative(self.population.edge_padding, "population.edge_padding")?;
        if self.population.edge_padding * 2.0 >= self.arena.width.min(self.arena.height) {
            return Err(invalid("population.edge_padding", "leaves no room to spawn"));
        }
        non_negative(self.population.craft_clearance, "population.craft_clearance")?;
        Ok(())
    }
}

pub(crate) fn invalid(field: &'static str, reason: &'static str) -> SimError {
    SimError::InvalidConfig { field, reason }
}

pub(crate) fn positive(value: f64, field: &'static str) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number"))
    }
}

pub(crate) fn non_negative(value: f64, field: &'static str) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a non-negative number"))
    }
}

fn ordered(band: Band, field: &'static str) -> Result<(), SimError> {
    if band.is_ordered() {
        Ok(())
    } else {
        Err(invalid(field, "min must not exceed max"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default()
            .validate()
            .expect("default config must validate");
    }

    #[test]
    fn zero_substeps_rejected() {
        let mut config = SimConfig::default();
        config.scheduler.max_substeps = 0;
        assert_eq!(
            config.validate(),
            Err(SimError::InvalidConfig {
                field: "scheduler.max_substeps",
                reason: "must be at least 1",
            })
        );
    }

    #[test]
    fn bad_probability_and_arena_rejected() {
        let mut config = SimConfig::default();
        config.fragmentation.resource_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.arena.width = -10.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.kinematics.craft_drag = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_tier_weights_rejected() {
        let mut config = SimConfig::default();
        config.fragmentation.tier_weights.common = u32::MAX;
        config.fragmentation.tier_weights.rare = 1;
        assert_eq!(
            config.validate(),
            Err(SimError::InvalidConfig {
                field: "fragmentation.tier_weights",
                reason: "total overflows",
            })
        );

        config.fragmentation.tier_weights.rare = 0;
        config.fragmentation.tier_weights.epic = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "arena": { "width": 320.0 }, "medium": "water" }"#)
                .expect("partial config should parse");
        assert_eq!(config.arena.width, 320.0);
        assert_eq!(config.arena.height, ARENA_HEIGHT);
        assert_eq!(config.medium, Terrain::Water);
        assert_eq!(config.scheduler.max_substeps, MAX_SUBSTEPS);
    }
}
