use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use arcade_physics_core::{
    CraftState, FrameInput, LimbShape, Race, RaceConfig, ResourceLedger, Rotation,
    RunFingerprint, SimConfig, SimEvent, Simulation, SimulationSnapshot,
};
use serde::Serialize;

use crate::util::{fingerprint_to_hex, seed_to_hex};

/// Upper bound on race ticks before a race is declared stuck.
const RACE_TICK_LIMIT: u32 = 1_000_000;

/// Picks the controls for the next frame from the latest snapshot.
pub trait Pilot {
    fn id(&self) -> &str;
    fn next_input(&mut self, snapshot: &SimulationSnapshot) -> FrameInput;
}

/// Built-in pilot: slow sweeps with short thrust bursts and steady fire.
#[derive(Clone, Debug, Default)]
pub struct PatrolPilot {
    frame: u64,
}

impl Pilot for PatrolPilot {
    fn id(&self) -> &str {
        "patrol"
    }

    fn next_input(&mut self, snapshot: &SimulationSnapshot) -> FrameInput {
        let frame = self.frame;
        self.frame += 1;
        let rested = snapshot.energy > 30.0;
        FrameInput {
            thrust: rested && frame % 150 < 20,
            rotation: match frame % 120 {
                0..=24 => Rotation::Right,
                60..=71 => Rotation::Left,
                _ => Rotation::Neutral,
            },
            fire: frame % 10 == 0,
            ..FrameInput::default()
        }
    }
}

/// Plays back recorded inputs, then idles.
#[derive(Clone, Debug)]
pub struct ScriptedPilot {
    inputs: Vec<FrameInput>,
    cursor: usize,
}

impl ScriptedPilot {
    pub fn new(inputs: Vec<FrameInput>) -> Self {
        Self { inputs, cursor: 0 }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading script {}", path.display()))?;
        let inputs: Vec<FrameInput> = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing script {}", path.display()))?;
        Ok(Self::new(inputs))
    }
}

impl Pilot for ScriptedPilot {
    fn id(&self) -> &str {
        "scripted"
    }

    fn next_input(&mut self, _snapshot: &SimulationSnapshot) -> FrameInput {
        let input = self.inputs.get(self.cursor).copied().unwrap_or_default();
        self.cursor += 1;
        input
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub pilot: String,
    pub seed: u32,
    pub seed_hex: String,
    pub max_frames: u32,
    pub frames: u32,
    pub sub_steps: u64,
    pub final_score: u32,
    pub fragments_destroyed: u32,
    pub final_energy: f64,
    pub craft_state: CraftState,
    pub game_over: bool,
    pub resources_collected: u32,
    pub resting_entries: u32,
    pub ledger: ResourceLedger,
    pub fingerprint: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub final_snapshot: SimulationSnapshot,
}

/// Drives one session for up to `max_frames` fixed-step frames, stopping
/// early once the craft is gone.
pub fn run_session(
    config: &SimConfig,
    seed: u32,
    max_frames: u32,
    pilot: &mut dyn Pilot,
) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    let mut sim = Simulation::new(config, seed).context("failed to start session")?;
    let mut snapshot = sim.snapshot();
    let mut run = RunFingerprint::new();
    let mut frames = 0;
    let mut sub_steps = 0u64;
    let mut resources_collected = 0;
    let mut resting_entries = 0;

    while frames < max_frames && !snapshot.game_over {
        let input = pilot.next_input(&snapshot);
        sim.apply_input(&input);
        snapshot = sim
            .tick(input.frame_delta)
            .with_context(|| format!("session aborted at frame {frames} (seed={seed:#x})"))?;
        run.push(&snapshot);
        frames += 1;
        sub_steps += u64::from(snapshot.sub_steps);

        for event in sim.drain_events() {
            match event {
                SimEvent::ResourceCollected { .. } => resources_collected += 1,
                SimEvent::StateChanged {
                    to: CraftState::Resting,
                    ..
                } => resting_entries += 1,
                _ => {}
            }
        }
    }

    tracing::debug!(
        seed = %seed_to_hex(seed),
        frames,
        score = snapshot.score,
        game_over = snapshot.game_over,
        "session finished"
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            pilot: pilot.id().to_string(),
            seed,
            seed_hex: seed_to_hex(seed),
            max_frames,
            frames,
            sub_steps,
            final_score: snapshot.score,
            fragments_destroyed: snapshot.fragments_destroyed,
            final_energy: snapshot.energy,
            craft_state: snapshot.craft_state,
            game_over: snapshot.game_over,
            resources_collected,
            resting_entries,
            ledger: sim.ledger().clone(),
            fingerprint: fingerprint_to_hex(run.value()),
        },
        final_snapshot: snapshot,
    })
}

pub fn write_report(path: &Path, artifact: &RunArtifact) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(artifact).context("failed to serialize report")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

#[derive(Clone, Debug, Serialize)]
pub struct Standing {
    pub rank: u32,
    pub lane: u32,
    pub limb_shape: LimbShape,
    pub finish_time: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RaceReport {
    pub seed: u32,
    pub seed_hex: String,
    pub frames: u64,
    pub elapsed_time: f64,
    pub standings: Vec<Standing>,
}

/// Runs a seeded race to completion at the configured tick rate.
pub fn run_race(config: &RaceConfig, seed: u32, racers: usize) -> Result<RaceReport> {
    if racers == 0 {
        return Err(anyhow!("a race needs at least one racer"));
    }
    let mut race = Race::seeded(config, seed, racers).context("failed to start race")?;

    let mut snapshot = race.snapshot();
    let mut ticks = 0;
    while !snapshot.finished {
        if ticks >= RACE_TICK_LIMIT {
            return Err(anyhow!(
                "race did not finish within {RACE_TICK_LIMIT} ticks (seed={seed:#x})"
            ));
        }
        snapshot = race.tick(config.fixed_step);
        ticks += 1;
    }

    let standings = race
        .results()
        .iter()
        .filter_map(|lane| snapshot.racers.iter().find(|racer| racer.lane == *lane))
        .map(|racer| Standing {
            rank: racer.rank.unwrap_or_default(),
            lane: racer.lane,
            limb_shape: racer.genome.limb_shape,
            finish_time: racer.finish_time.unwrap_or(snapshot.elapsed_time),
        })
        .collect();

    Ok(RaceReport {
        seed,
        seed_hex: seed_to_hex(seed),
        frames: snapshot.frame,
        elapsed_time: snapshot.elapsed_time,
        standings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_pilot_idles_after_script() {
        let mut pilot = ScriptedPilot::new(vec![FrameInput {
            thrust: true,
            ..FrameInput::default()
        }]);
        let sim = Simulation::new(&SimConfig::default(), 1).unwrap();
        let snapshot = sim.snapshot();
        assert!(pilot.next_input(&snapshot).thrust);
        assert_eq!(pilot.next_input(&snapshot), FrameInput::default());
    }

    #[test]
    fn session_stops_at_max_frames() {
        let artifact = run_session(&SimConfig::default(), 3, 90, &mut PatrolPilot::default())
            .expect("session runs");
        assert!(artifact.metrics.frames <= 90);
        assert_eq!(artifact.metrics.pilot, "patrol");
        assert_eq!(artifact.metrics.fingerprint.len(), 16);
    }

    #[test]
    fn zero_frames_is_rejected() {
        assert!(run_session(&SimConfig::default(), 3, 0, &mut PatrolPilot::default()).is_err());
    }

    #[test]
    fn race_report_lists_every_racer_once() {
        let config = RaceConfig {
            track_length: 100.0,
            ..RaceConfig::default()
        };
        let report = run_race(&config, 8, 3).expect("race finishes");
        let ranks: Vec<u32> = report.standings.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
