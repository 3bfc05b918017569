use anyhow::{anyhow, Result};
use arcade_lab::config::load_config;
use arcade_lab::runner::{run_race, run_session, write_report, PatrolPilot, Pilot, ScriptedPilot};
use arcade_lab::sweep::{run_sweep, SweepConfig};
use arcade_lab::util::{parse_seed, parse_seed_file, parse_seed_list, seed_range, seed_to_hex};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "arcade-lab")]
#[command(about = "Headless driver for the deterministic arcade physics core")]
struct Cli {
    /// JSON config file; `ARCADE_*` environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one space session and print its metrics
    Run {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 3_600)]
        frames: u32,
        /// JSON array of frame inputs; the patrol pilot flies when omitted
        #[arg(long)]
        script: Option<PathBuf>,
        /// Write the final snapshot and metrics here
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a seeded lane race to the finish and print the standings
    Race {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 4)]
        racers: usize,
    },
    /// Run many seeds in parallel, twice each, and check they replay identically
    Sweep {
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 3_600)]
        frames: u32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let Cli { config, command } = Cli::parse();
    let config = load_config(config.as_deref())?;

    match command {
        Commands::Run {
            seed,
            frames,
            script,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let mut pilot: Box<dyn Pilot> = match script {
                Some(path) => Box::new(ScriptedPilot::load(&path)?),
                None => Box::new(PatrolPilot::default()),
            };
            let artifact = run_session(&config.sim, seed, frames, pilot.as_mut())?;
            let m = &artifact.metrics;
            println!("pilot={}", m.pilot);
            println!("seed={}", m.seed_hex);
            println!("frames={}", m.frames);
            println!("sub_steps={}", m.sub_steps);
            println!("final_score={}", m.final_score);
            println!("fragments_destroyed={}", m.fragments_destroyed);
            println!("final_energy={:.2}", m.final_energy);
            println!("craft_state={}", m.craft_state);
            println!("game_over={}", m.game_over);
            println!("resources_total={}", m.ledger.total);
            println!("fingerprint={}", m.fingerprint);
            if let Some(path) = output {
                write_report(&path, &artifact)?;
                println!("wrote={}", path.display());
            }
        }
        Commands::Race { seed, racers } => {
            let seed = parse_seed(&seed)?;
            let report = run_race(&config.race, seed, racers)?;
            println!("seed={}", seed_to_hex(seed));
            println!("frames={}", report.frames);
            println!("elapsed={:.2}s", report.elapsed_time);
            for standing in &report.standings {
                println!(
                    "  {}. lane={} limbs={:?} time={:.2}s",
                    standing.rank, standing.lane, standing.limb_shape, standing.finish_time
                );
            }
        }
        Commands::Sweep {
            seeds,
            seed_file,
            seed_start,
            seed_count,
            frames,
            out_dir,
            jobs,
        } => {
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let out_dir = out_dir
                .unwrap_or_else(|| PathBuf::from(format!("sweeps/{}", timestamp_suffix())));

            let report = run_sweep(SweepConfig {
                sim: config.sim,
                seeds,
                max_frames: frames,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!("runs={}", report.seed_count);
            println!(
                "jobs={}",
                jobs.map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("avg_score={:.1}", report.avg_score);
            println!("max_score={}", report.max_score);
            println!("survival={:.0}%", report.survival_rate * 100.0);
            println!("out_dir={}", out_dir.display());
            if !report.divergent_seeds.is_empty() {
                let seeds: Vec<String> =
                    report.divergent_seeds.iter().copied().map(seed_to_hex).collect();
                return Err(anyhow!("non-deterministic seeds: {}", seeds.join(", ")));
            }
            println!("deterministic=true");
        }
    }

    Ok(())
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }
    if let Some(list) = seeds {
        return parse_seed_list(list);
    }
    let start = match seed_start {
        Some(start) => parse_seed(start)?,
        None => 0xA5C4_0001,
    };
    Ok(seed_range(start, seed_count))
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
