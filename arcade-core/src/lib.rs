//! Deterministic fixed-step physics core for a wrap-around arcade arena, plus
//! a lane race that reuses the same genetic and energy rules.

pub mod collision;
pub mod config;
pub mod constants;
pub mod economy;
pub mod entity;
pub mod error;
pub mod fragmentation;
pub mod genetics;
pub mod kinematics;
pub mod math;
pub mod pool;
pub mod race;
pub mod rng;
pub mod scheduler;
pub mod sim;
pub mod space;

pub use config::SimConfig;
pub use economy::{CraftState, ResourceLedger};
pub use entity::{EntityId, EntityKind, FragmentTier, ResourceTier};
pub use error::{IntegrityRule, SimError};
pub use genetics::{Genome, LimbShape, Terrain};
pub use math::Vec2;
pub use race::{Race, RaceConfig, RaceSnapshot};
pub use sim::{
    fingerprint, replay, replay_with_checkpoints, FrameInput, Rotation, RunFingerprint, SimEvent,
    Simulation, SimulationSnapshot,
};
