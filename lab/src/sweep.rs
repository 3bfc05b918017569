use crate::runner::{self, PatrolPilot, RunMetrics};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use arcade_physics_core::SimConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub frames: u32,
    pub final_score: u32,
    pub fragments_destroyed: u32,
    pub resources_total: u32,
    pub game_over: bool,
    pub fingerprint: String,
    /// Both runs of this seed produced the same fingerprint.
    pub deterministic: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepReport {
    pub generated_unix_s: u64,
    pub max_frames: u32,
    pub seed_count: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_frames: f64,
    pub survival_rate: f64,
    /// Seeds whose repeated runs diverged.
    pub divergent_seeds: Vec<u32>,
    pub runs: Vec<SweepRecord>,
}

pub struct SweepConfig {
    pub sim: SimConfig,
    pub seeds: Vec<u32>,
    pub max_frames: u32,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

struct SeedRun {
    first: RunMetrics,
    second: RunMetrics,
}

/// Runs every seed twice with the patrol pilot, in parallel, and writes
/// `summary.json` under the output directory.
pub fn run_sweep(config: SweepConfig) -> Result<SweepReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("sweep requires at least one seed"));
    }

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |seed: &u32| -> Result<SeedRun> {
        let run = || {
            runner::run_session(&config.sim, *seed, config.max_frames, &mut PatrolPilot::default())
                .map(|artifact| artifact.metrics)
                .with_context(|| format!("sweep run failed for seed={seed:#x}"))
        };
        Ok(SeedRun {
            first: run()?,
            second: run()?,
        })
    };

    let run_results: Vec<Result<SeedRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let mut records: Vec<SweepRecord> = runs
        .iter()
        .map(|run| {
            let m = &run.first;
            SweepRecord {
                seed: m.seed,
                seed_hex: seed_to_hex(m.seed),
                frames: m.frames,
                final_score: m.final_score,
                fragments_destroyed: m.fragments_destroyed,
                resources_total: m.ledger.total,
                game_over: m.game_over,
                fingerprint: m.fingerprint.clone(),
                deterministic: m.fingerprint == run.second.fingerprint,
            }
        })
        .collect();

    let divergent_seeds: Vec<u32> = records
        .iter()
        .filter(|record| !record.deterministic)
        .map(|record| record.seed)
        .collect();
    for seed in &divergent_seeds {
        tracing::error!(seed = %seed_to_hex(*seed), "repeated run diverged");
    }

    let total = records.len();
    let sum_score: u64 = records.iter().map(|r| r.final_score as u64).sum();
    let max_score = records.iter().map(|r| r.final_score).max().unwrap_or(0);
    let sum_frames: u64 = records.iter().map(|r| r.frames as u64).sum();
    let survived = records.iter().filter(|r| !r.game_over).count();
    records.sort_by(|a, b| b.final_score.cmp(&a.final_score).then(a.seed.cmp(&b.seed)));

    let report = SweepReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        max_frames: config.max_frames,
        seed_count: total,
        avg_score: sum_score as f64 / total as f64,
        max_score,
        avg_frames: sum_frames as f64 / total as f64,
        survival_rate: survived as f64 / total as f64,
        divergent_seeds,
        runs: records,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}
