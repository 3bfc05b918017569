use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EnergyConfig;
use crate::entity::{Energy, ResourceTier};

/// Craft movement state.
///
/// ```text
///   Idle <-> Thrusting          (thrust input)
///   any live state -> Resting   (energy < threshold, input ignored)
///   Resting -> Idle             (energy > threshold)
///   any live state -> Destroyed | Finished   (terminal)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftState {
    #[default]
    Idle,
    Thrusting,
    Resting,
    Destroyed,
    Finished,
}

impl CraftState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CraftState::Destroyed | CraftState::Finished)
    }

    pub fn is_thrusting(self) -> bool {
        self == CraftState::Thrusting
    }

    pub fn next(self, thrust_input: bool, energy: f64, threshold: f64) -> CraftState {
        match self {
            CraftState::Destroyed | CraftState::Finished => self,
            CraftState::Resting if energy > threshold => CraftState::Idle,
            CraftState::Resting => CraftState::Resting,
            CraftState::Idle | CraftState::Thrusting if energy < threshold => CraftState::Resting,
            CraftState::Idle | CraftState::Thrusting if thrust_input => CraftState::Thrusting,
            CraftState::Idle | CraftState::Thrusting => CraftState::Idle,
        }
    }

    pub fn destroyed(self) -> CraftState {
        if self.is_terminal() {
            self
        } else {
            CraftState::Destroyed
        }
    }

    pub fn finished(self) -> CraftState {
        if self.is_terminal() {
            self
        } else {
            CraftState::Finished
        }
    }
}

impl fmt::Display for CraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CraftState::Idle => "IDLE",
            CraftState::Thrusting => "THRUSTING",
            CraftState::Resting => "RESTING",
            CraftState::Destroyed => "DESTROYED",
            CraftState::Finished => "FINISHED",
        };
        f.write_str(name)
    }
}

/// Countdown that gates repeated actions such as firing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cooldown {
    duration: f64,
    remaining: f64,
}

impl Cooldown {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }

    pub fn tick(&mut self, dt: f64) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }
}

/// Cumulative resource credits. Read by the persistence layer, which owns
/// writing it anywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
    pub total: u32,
    /// Number of pickups, regardless of tier.
    pub pieces: u32,
}

impl ResourceLedger {
    pub fn credits(&self, tier: ResourceTier) -> u32 {
        match tier {
            ResourceTier::Common => self.common,
            ResourceTier::Rare => self.rare,
            ResourceTier::Epic => self.epic,
        }
    }

    fn credit(&mut self, tier: ResourceTier, amount: u32) {
        let slot = match tier {
            ResourceTier::Common => &mut self.common,
            ResourceTier::Rare => &mut self.rare,
            ResourceTier::Epic => &mut self.epic,
        };
        *slot = slot.saturating_add(amount);
        self.total = self.total.saturating_add(amount);
        self.pieces = self.pieces.saturating_add(1);
    }
}

#[derive(Clone, Debug)]
pub struct EnergyEconomy {
    thrust_cost: f64,
    regen: f64,
    min_movement: f64,
    weapon_cost: f64,
    ledger: ResourceLedger,
}

impl EnergyEconomy {
    pub fn new(config: &EnergyConfig) -> Self {
        Self {
            thrust_cost: config.thrust_cost,
            regen: config.regen,
            min_movement: config.min_movement,
            weapon_cost: config.weapon_cost,
            ledger: ResourceLedger::default(),
        }
    }

    pub fn min_movement(&self) -> f64 {
        self.min_movement
    }

    pub fn apply_thrust_cost(&self, energy: &mut Energy, dt: f64, drain_multiplier: f64) {
        energy.sub(self.thrust_cost * drain_multiplier * dt);
    }

    /// Only called while the craft is not thrusting.
    pub fn apply_regen(&self, energy: &mut Energy, dt: f64) {
        energy.add(self.regen * dt);
    }

    /// Spends the weapon cost if affordable. Leaves `energy` untouched and
    /// returns false otherwise.
    pub fn try_fire_weapon(&self, energy: &mut Energy) -> bool {
        if energy.get() < self.weapon_cost {
            return false;
        }
        energy.sub(self.weapon_cost);
        true
    }

    /// Credits a collected resource and returns the amount credited.
    pub fn collect(&mut self, tier: ResourceTier) -> u32 {
        let credits = tier.value();
        self.ledger.credit(tier, credits);
        tracing::debug!(tier = ?tier, credits, total = self.ledger.total, "resource collected");
        credits
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn next_state(&self, state: CraftState, thrust_input: bool, energy: Energy) -> CraftState {
        state.next(thrust_input, energy.get(), self.min_movement)
    }
}
