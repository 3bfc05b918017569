//! Genome traits and the terrain/medium modifier tables.
//!
//! [`GeneticModifierResolver::resolve`] turns a genome and the terrain under
//! the body into a speed multiplier and an energy-drain multiplier:
//!
//! ```text
//! speed = base_speed(terrain) * limb_bonus(limb, terrain) * stride(genome)
//! drain = base_drain(terrain, softened for strong swimmers) / efficiency(genome)
//! ```
//!
//! Both results are clamped to the configured bounds.

use serde::{Deserialize, Serialize};

use crate::config::{Band, ModifierBounds};
use crate::rng::SeededRng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Open,
    Track,
    Finish,
    Sand,
    Rock,
    Rough,
    Water,
    Mud,
}

impl Terrain {
    pub const ALL: [Terrain; 8] = [
        Terrain::Open,
        Terrain::Track,
        Terrain::Finish,
        Terrain::Sand,
        Terrain::Rock,
        Terrain::Rough,
        Terrain::Water,
        Terrain::Mud,
    ];

    /// Base `(speed, drain)` multipliers.
    pub const fn base(self) -> (f64, f64) {
        match self {
            Terrain::Open => (1.0, 1.0),
            Terrain::Track => (1.1, 0.9),
            Terrain::Finish => (1.0, 1.0),
            Terrain::Sand => (0.7, 1.3),
            Terrain::Rock => (0.5, 1.4),
            Terrain::Rough => (0.8, 1.2),
            Terrain::Water => (0.4, 1.2),
            Terrain::Mud => (0.6, 1.5),
        }
    }

    /// Fluid media where swimming limbs matter.
    pub const fn is_dense(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Mud)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbShape {
    Fins,
    #[default]
    Flippers,
    Feet,
}

impl LimbShape {
    pub const ALL: [LimbShape; 3] = [LimbShape::Fins, LimbShape::Flippers, LimbShape::Feet];

    /// Speed factor this limb shape contributes on `terrain`.
    pub const fn speed_bonus(self, terrain: Terrain) -> f64 {
        match (self, terrain) {
            (LimbShape::Fins, Terrain::Water) => 2.0,
            (LimbShape::Fins, Terrain::Mud) => 1.5,
            (LimbShape::Fins, Terrain::Sand | Terrain::Rock) => 0.8,
            (LimbShape::Flippers, Terrain::Water) => 1.2,
            (LimbShape::Flippers, Terrain::Mud) => 1.1,
            (LimbShape::Feet, Terrain::Water) => 0.5,
            (LimbShape::Feet, Terrain::Mud) => 0.8,
            (LimbShape::Feet, Terrain::Sand) => 1.3,
            (LimbShape::Feet, Terrain::Rock) => 1.1,
            (LimbShape::Feet, Terrain::Open) => 1.2,
            _ => 1.0,
        }
    }
}

pub const LEG_LENGTH_RANGE: (f64, f64) = (0.5, 1.5);
pub const LEG_THICKNESS_RANGE: (f64, f64) = (0.7, 1.3);
pub const SHELL_SIZE_RANGE: (f64, f64) = (0.5, 1.5);

/// A limb bonus at or above this in a dense medium halves the extra drain.
const STRONG_SWIMMER_BONUS: f64 = 1.5;

/// Static traits of a craft or racer. Immutable once attached to a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genome {
    pub limb_shape: LimbShape,
    pub leg_length: f64,
    pub leg_thickness: f64,
    pub shell_size: f64,
}

impl Default for Genome {
    fn default() -> Self {
        Self {
            limb_shape: LimbShape::default(),
            leg_length: 1.0,
            leg_thickness: 1.0,
            shell_size: 1.0,
        }
    }
}

impl Genome {
    pub fn with_limbs(limb_shape: LimbShape) -> Self {
        Self {
            limb_shape,
            ..Self::default()
        }
    }

    pub fn random(rng: &mut SeededRng) -> Self {
        let limb_shape = LimbShape::ALL[rng.next_int(LimbShape::ALL.len() as u32) as usize];
        Self {
            limb_shape,
            leg_length: rng.range_f64(LEG_LENGTH_RANGE.0, LEG_LENGTH_RANGE.1),
            leg_thickness: rng.range_f64(LEG_THICKNESS_RANGE.0, LEG_THICKNESS_RANGE.1),
            shell_size: rng.range_f64(SHELL_SIZE_RANGE.0, SHELL_SIZE_RANGE.1),
        }
    }

    /// Longer legs cover more ground: 0.8 at the shortest, 1.2 at the longest.
    pub fn stride(&self) -> f64 {
        let leg = trait_value(self.leg_length, LEG_LENGTH_RANGE);
        1.0 + 0.4 * (leg - 1.0)
    }

    /// Drain divisor: thick legs and a small shell spend less energy.
    pub fn efficiency(&self) -> f64 {
        let thickness = trait_value(self.leg_thickness, LEG_THICKNESS_RANGE);
        let shell = trait_value(self.shell_size, SHELL_SIZE_RANGE);
        (1.0 + 0.5 * (thickness - 1.0)) * (1.0 + 0.2 * (1.0 - shell))
    }
}

/// Out-of-schema traits are clamped and non-finite ones treated as neutral.
fn trait_value(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub speed: f64,
    pub drain: f64,
}

impl Modifiers {
    pub const NEUTRAL: Self = Self {
        speed: 1.0,
        drain: 1.0,
    };
}

#[derive(Clone, Debug)]
pub struct GeneticModifierResolver {
    speed_bounds: Band,
    drain_bounds: Band,
}

impl GeneticModifierResolver {
    pub fn new(bounds: &ModifierBounds) -> Self {
        Self {
            speed_bounds: bounds.speed,
            drain_bounds: bounds.drain,
        }
    }

    pub fn resolve(&self, genome: &Genome, terrain: Terrain) -> Modifiers {
        let (base_speed, base_drain) = terrain.base();
        let bonus = genome.limb_shape.speed_bonus(terrain);

        let drain = if terrain.is_dense() && bonus >= STRONG_SWIMMER_BONUS {
            1.0 + (base_drain - 1.0) * 0.5
        } else {
            base_drain
        };

        Modifiers {
            speed: self.speed_bounds.clamp(base_speed * bonus * genome.stride()),
            drain: self.drain_bounds.clamp(drain / genome.efficiency()),
        }
    }
}
