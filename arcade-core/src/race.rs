//! Lane race: racers run independent straight lanes over a cycle of terrain
//! segments, moving under the same genetic modifiers and thrust/rest state
//! machine as the space craft.

use core::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::config::{invalid, non_negative, positive, EnergyConfig, ModifierBounds, SchedulerConfig};
use crate::constants::*;
use crate::economy::{CraftState, EnergyEconomy};
use crate::entity::Energy;
use crate::error::SimError;
use crate::genetics::{GeneticModifierResolver, Genome, Terrain};
use crate::rng::SeededRng;
use crate::scheduler::FixedStepScheduler;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub track_length: f64,
    pub segment_length: f64,
    /// Terrain of consecutive segments, repeated along the track.
    pub terrain: Vec<Terrain>,
    pub base_speed: f64,
    pub max_speed: f64,
    /// Speed change per second while approaching the target speed.
    pub acceleration: f64,
    pub energy_drain: f64,
    pub energy_recovery: f64,
    pub min_energy: f64,
    pub fixed_step: f64,
    pub max_substeps: u32,
    pub modifiers: ModifierBounds,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track_length: RACE_TRACK_LENGTH,
            segment_length: RACE_SEGMENT_LENGTH,
            terrain: vec![
                Terrain::Open,
                Terrain::Mud,
                Terrain::Water,
                Terrain::Sand,
                Terrain::Rock,
                Terrain::Track,
            ],
            base_speed: RACE_BASE_SPEED,
            max_speed: RACE_MAX_SPEED,
            acceleration: RACE_ACCELERATION,
            energy_drain: RACE_ENERGY_DRAIN,
            energy_recovery: RACE_ENERGY_RECOVERY,
            min_energy: ENERGY_MIN_MOVEMENT,
            fixed_step: RACE_FIXED_STEP,
            max_substeps: MAX_SUBSTEPS,
            modifiers: ModifierBounds::default(),
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        positive(self.track_length, "race.track_length")?;
        positive(self.segment_length, "race.segment_length")?;
        if self.terrain.is_empty() {
            return Err(invalid("race.terrain", "needs at least one segment"));
        }
        non_negative(self.base_speed, "race.base_speed")?;
        positive(self.max_speed, "race.max_speed")?;
        positive(self.acceleration, "race.acceleration")?;
        non_negative(self.energy_drain, "race.energy_drain")?;
        non_negative(self.energy_recovery, "race.energy_recovery")?;
        if !(0.0..=ENERGY_MAX).contains(&self.min_energy) {
            return Err(invalid("race.min_energy", "must be within the energy range"));
        }
        positive(self.fixed_step, "race.fixed_step")?;
        if self.max_substeps == 0 {
            return Err(invalid("race.max_substeps", "must be at least 1"));
        }
        Ok(())
    }

    /// Terrain under a racer that has covered `distance`.
    pub fn terrain_at(&self, distance: f64) -> Terrain {
        if distance >= self.track_length {
            return Terrain::Finish;
        }
        let segment = (distance.max(0.0) / self.segment_length) as usize;
        self.terrain[segment % self.terrain.len()]
    }

    fn energy(&self) -> EnergyConfig {
        EnergyConfig {
            thrust_cost: self.energy_drain,
            regen: self.energy_recovery,
            min_movement: self.min_energy,
            weapon_cost: 0.0,
        }
    }

    fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            fixed_step: self.fixed_step,
            max_substeps: self.max_substeps,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Racer {
    pub lane: u32,
    pub genome: Genome,
    pub distance: f64,
    pub velocity: f64,
    pub energy: Energy,
    pub state: CraftState,
    pub terrain: Terrain,
    /// 1-based finishing position.
    pub rank: Option<u32>,
    pub finish_time: Option<f64>,
}

impl Racer {
    fn new(lane: u32, genome: Genome) -> Self {
        Self {
            lane,
            genome,
            distance: 0.0,
            velocity: 0.0,
            energy: Energy::FULL,
            state: CraftState::Idle,
            terrain: Terrain::default(),
            rank: None,
            finish_time: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub frame: u64,
    pub elapsed_time: f64,
    pub sub_steps: u32,
    pub finished: bool,
    pub racers: Vec<Racer>,
}

#[derive(Clone, Debug)]
pub struct Race {
    config: RaceConfig,
    resolver: GeneticModifierResolver,
    economy: EnergyEconomy,
    scheduler: FixedStepScheduler,
    racers: Vec<Racer>,
    finish_order: Vec<u32>,
    frame: u64,
    elapsed: f64,
    last_sub_steps: u32,
}

impl Race {
    /// One lane per genome, in the order given.
    pub fn new(config: &RaceConfig, genomes: &[Genome]) -> Result<Self, SimError> {
        config.validate()?;
        let racers = genomes
            .iter()
            .zip(0u32..)
            .map(|(genome, lane)| Racer::new(lane, *genome))
            .collect();
        Ok(Self {
            config: config.clone(),
            resolver: GeneticModifierResolver::new(&config.modifiers),
            economy: EnergyEconomy::new(&config.energy()),
            scheduler: FixedStepScheduler::new(&config.scheduler()),
            racers,
            finish_order: Vec::new(),
            frame: 0,
            elapsed: 0.0,
            last_sub_steps: 0,
        })
    }

    /// `count` racers with genomes drawn from `seed`.
    pub fn seeded(config: &RaceConfig, seed: u32, count: usize) -> Result<Self, SimError> {
        let mut rng = SeededRng::new(seed);
        let genomes: Vec<Genome> = (0..count).map(|_| Genome::random(&mut rng)).collect();
        Self::new(config, &genomes)
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn is_finished(&self) -> bool {
        self.racers.iter().all(|racer| racer.state == CraftState::Finished)
    }

    /// Lanes in finishing order. Racers still running are not listed.
    pub fn results(&self) -> &[u32] {
        &self.finish_order
    }

    pub fn tick(&mut self, frame_delta: f64) -> RaceSnapshot {
        let mut scheduler = core::mem::replace(
            &mut self.scheduler,
            FixedStepScheduler::new(&self.config.scheduler()),
        );
        self.last_sub_steps = scheduler
            .advance(frame_delta, |dt| {
                self.substep(dt);
                Ok::<(), Infallible>(())
            })
            .unwrap_or_else(|never| match never {});
        self.scheduler = scheduler;
        self.snapshot()
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            frame: self.frame,
            elapsed_time: self.elapsed,
            sub_steps: self.last_sub_steps,
            finished: self.is_finished(),
            racers: self.racers.clone(),
        }
    }

    fn substep(&mut self, dt: f64) {
        self.frame += 1;
        self.elapsed += dt;

        for index in 0..self.racers.len() {
            if self.racers[index].state.is_terminal() {
                continue;
            }
            self.advance_racer(index, dt);
        }
    }

    fn advance_racer(&mut self, index: usize, dt: f64) {
        let config = &self.config;
        let racer = &mut self.racers[index];

        racer.terrain = config.terrain_at(racer.distance);
        let modifiers = self.resolver.resolve(&racer.genome, racer.terrain);
        racer.state = self.economy.next_state(racer.state, true, racer.energy);

        if racer.state.is_thrusting() {
            let target = (config.base_speed * modifiers.speed).min(config.max_speed);
            racer.velocity = approach(racer.velocity, target, config.acceleration * dt);
            self.economy
                .apply_thrust_cost(&mut racer.energy, dt, modifiers.drain);
        } else {
            racer.velocity = approach(racer.velocity, 0.0, config.acceleration * dt);
            self.economy.apply_regen(&mut racer.energy, dt);
        }

        racer.distance += racer.velocity * dt;
        if racer.distance >= config.track_length {
            racer.distance = config.track_length;
            racer.velocity = 0.0;
            racer.terrain = Terrain::Finish;
            racer.state = racer.state.finished();
            let rank = self.finish_order.len() as u32 + 1;
            racer.rank = Some(rank);
            racer.finish_time = Some(self.elapsed);
            self.finish_order.push(racer.lane);
            tracing::info!(lane = racer.lane, rank, time = self.elapsed, "racer finished");
        }
    }
}

fn approach(current: f64, target: f64, max_delta: f64) -> f64 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::LimbShape;

    fn run_to_end(race: &mut Race, max_frames: usize) -> RaceSnapshot {
        let mut last = race.snapshot();
        for _ in 0..max_frames {
            last = race.tick(RACE_FIXED_STEP);
            if last.finished {
                break;
            }
        }
        last
    }

    #[test]
    fn terrain_cycles_by_segment() {
        let config = RaceConfig::default();
        assert_eq!(config.terrain_at(0.0), Terrain::Open);
        assert_eq!(config.terrain_at(199.9), Terrain::Open);
        assert_eq!(config.terrain_at(200.0), Terrain::Mud);
        assert_eq!(config.terrain_at(1_250.0), Terrain::Open);
        assert_eq!(config.terrain_at(1_500.0), Terrain::Finish);
    }

    #[test]
    fn fins_beat_feet_in_water() {
        let config = RaceConfig {
            track_length: 300.0,
            terrain: vec![Terrain::Water],
            ..RaceConfig::default()
        };
        let genomes = [
            Genome::with_limbs(LimbShape::Feet),
            Genome::with_limbs(LimbShape::Fins),
        ];
        let mut race = Race::new(&config, &genomes).expect("valid race");
        let snapshot = run_to_end(&mut race, 10_000);

        assert!(snapshot.finished);
        assert_eq!(race.results(), &[1, 0]);
        assert_eq!(snapshot.racers[1].rank, Some(1));
        assert_eq!(snapshot.racers[0].rank, Some(2));
        assert!(snapshot.racers.iter().all(|r| r.distance == 300.0));
    }

    #[test]
    fn everyone_finishes_an_open_track_with_unique_ranks() {
        let config = RaceConfig {
            track_length: 400.0,
            terrain: vec![Terrain::Open],
            ..RaceConfig::default()
        };
        let mut race = Race::seeded(&config, 2024, 5).expect("valid race");
        let snapshot = run_to_end(&mut race, 20_000);

        assert!(race.is_finished());
        let mut ranks: Vec<u32> = snapshot.racers.iter().filter_map(|r| r.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(race.results().len(), 5);
    }

    #[test]
    fn exhausted_racer_rests_and_recovers() {
        let config = RaceConfig {
            energy_drain: 50.0,
            ..RaceConfig::default()
        };
        let mut race = Race::new(&config, &[Genome::default()]).expect("valid race");

        let mut rested = false;
        let mut resumed = false;
        for _ in 0..600 {
            let snapshot = race.tick(RACE_FIXED_STEP);
            let racer = &snapshot.racers[0];
            assert!((0.0..=ENERGY_MAX).contains(&racer.energy.get()));
            if racer.state == CraftState::Resting {
                rested = true;
            } else if rested && racer.state == CraftState::Thrusting {
                resumed = true;
                break;
            }
        }
        assert!(rested && resumed);
    }

    #[test]
    fn finished_racers_stop_changing() {
        let config = RaceConfig {
            track_length: 20.0,
            ..RaceConfig::default()
        };
        let mut race = Race::new(&config, &[Genome::default()]).expect("valid race");
        let done = run_to_end(&mut race, 10_000);
        assert_eq!(done.racers[0].state, CraftState::Finished);

        let later = race.tick(1.0);
        assert_eq!(later.racers, done.racers);
    }

    #[test]
    fn seeded_races_are_reproducible() {
        let config = RaceConfig::default();
        let mut a = Race::seeded(&config, 77, 4).expect("valid race");
        let mut b = Race::seeded(&config, 77, 4).expect("valid race");
        for _ in 0..300 {
            assert_eq!(a.tick(RACE_FIXED_STEP), b.tick(RACE_FIXED_STEP));
        }
    }

    #[test]
    fn empty_terrain_is_rejected() {
        let config = RaceConfig {
            terrain: Vec::new(),
            ..RaceConfig::default()
        };
        assert!(Race::new(&config, &[]).is_err());
    }
}
