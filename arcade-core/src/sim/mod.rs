use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::constants::FIXED_STEP;
use crate::economy::CraftState;
use crate::entity::{Entity, EntityId, EntityKind, FragmentTier, ResourceTier};
use crate::error::SimError;
use crate::math::Vec2;

mod session;

pub use session::Simulation;

/// Rotation input. Maps to the conventional `-1 | 0 | 1` encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Left,
    #[default]
    Neutral,
    Right,
}

impl Rotation {
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Left => -1.0,
            Rotation::Neutral => 0.0,
            Rotation::Right => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidRotation(pub i8);

impl fmt::Display for InvalidRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rotation direction must be -1, 0 or 1, got {}", self.0)
    }
}

impl std::error::Error for InvalidRotation {}

impl TryFrom<i8> for Rotation {
    type Error = InvalidRotation;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Rotation::Left),
            0 => Ok(Rotation::Neutral),
            1 => Ok(Rotation::Right),
            other => Err(InvalidRotation(other)),
        }
    }
}

/// Controls held for one external frame, plus the frame's duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    pub frame_delta: f64,
    pub thrust: bool,
    pub rotation: Rotation,
    pub fire: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            frame_delta: FIXED_STEP,
            thrust: false,
            rotation: Rotation::Neutral,
            fire: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f64,
    pub radius: f64,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind(),
            position: entity.position,
            velocity: entity.velocity,
            heading: entity.heading,
            radius: entity.radius,
        }
    }
}

/// Read-only view handed to renderers and recorders after each tick.
/// Entities are listed in ascending id order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Sub-steps simulated since the last reset.
    pub frame: u64,
    pub score: u32,
    pub energy: f64,
    pub elapsed_time: f64,
    /// Sub-steps consumed by the call that produced this snapshot.
    pub sub_steps: u32,
    pub craft_state: CraftState,
    pub game_over: bool,
    pub fragments_destroyed: u32,
    pub entities: Vec<EntitySnapshot>,
}

impl SimulationSnapshot {
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|entity| entity.kind == kind).count()
    }

    pub fn craft(&self) -> Option<&EntitySnapshot> {
        self.entities
            .iter()
            .find(|entity| entity.kind == EntityKind::PlayerCraft)
    }

    /// FNV-1a over every field, for cheap determinism comparisons.
    pub fn fingerprint(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        hash = mix(hash, self.frame);
        hash = mix(hash, self.score as u64);
        hash = mix(hash, self.energy.to_bits());
        hash = mix(hash, self.elapsed_time.to_bits());
        hash = mix(hash, self.sub_steps as u64);
        hash = mix(hash, self.craft_state as u64);
        hash = mix(hash, self.fragments_destroyed as u64);
        for entity in &self.entities {
            hash = mix(hash, entity.id.0);
            hash = mix(hash, entity.kind as u64);
            hash = mix(hash, entity.position.x.to_bits());
            hash = mix(hash, entity.position.y.to_bits());
            hash = mix(hash, entity.velocity.x.to_bits());
            hash = mix(hash, entity.velocity.y.to_bits());
            hash = mix(hash, entity.heading.to_bits());
            hash = mix(hash, entity.radius.to_bits());
        }
        hash
    }
}

const FNV_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

fn mix(hash: u64, value: u64) -> u64 {
    let mut hash = hash;
    for byte in value.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Running fingerprint over a sequence of snapshots, for callers that do not
/// keep the whole run in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunFingerprint(u64);

impl RunFingerprint {
    pub fn new() -> Self {
        Self(FNV_OFFSET)
    }

    pub fn push(&mut self, snapshot: &SimulationSnapshot) {
        self.0 = mix(self.0, snapshot.fingerprint());
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for RunFingerprint {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds a whole run into one value.
pub fn fingerprint(snapshots: &[SimulationSnapshot]) -> u64 {
    let mut run = RunFingerprint::new();
    for snapshot in snapshots {
        run.push(snapshot);
    }
    run.value()
}

/// Things that happened during a tick, queued for UI and audio
/// collaborators. Drained with [`Simulation::drain_events`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    FragmentDestroyed {
        id: EntityId,
        tier: FragmentTier,
        score: u32,
    },
    ResourceSpawned {
        id: EntityId,
        tier: ResourceTier,
    },
    ResourceCollected {
        tier: ResourceTier,
        credits: u32,
        new_total: u32,
    },
    CraftDestroyed {
        id: EntityId,
    },
    StateChanged {
        from: CraftState,
        to: CraftState,
    },
}

/// Runs a fresh session over `inputs`, one tick per input, and returns the
/// snapshot after each tick.
pub fn replay(
    config: &SimConfig,
    seed: u32,
    inputs: &[FrameInput],
) -> Result<Vec<SimulationSnapshot>, SimError> {
    let mut sim = Simulation::new(config, seed)?;
    let mut snapshots = Vec::with_capacity(inputs.len());
    for input in inputs {
        sim.apply_input(input);
        snapshots.push(sim.tick(input.frame_delta)?);
    }
    Ok(snapshots)
}

/// Like [`replay`] but keeps only every `interval`-th snapshot and the last.
pub fn replay_with_checkpoints(
    config: &SimConfig,
    seed: u32,
    inputs: &[FrameInput],
    interval: usize,
) -> Result<Vec<SimulationSnapshot>, SimError> {
    let interval = interval.max(1);
    let mut sim = Simulation::new(config, seed)?;
    let mut checkpoints = vec![sim.snapshot()];
    for (index, input) in inputs.iter().enumerate() {
        sim.apply_input(input);
        let snapshot = sim.tick(input.frame_delta)?;
        if (index + 1) % interval == 0 || index + 1 == inputs.len() {
            checkpoints.push(snapshot);
        }
    }
    Ok(checkpoints)
}
