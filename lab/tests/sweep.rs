use arcade_lab::runner::{run_session, write_report, ScriptedPilot};
use arcade_lab::sweep::{run_sweep, SweepConfig, SweepReport};
use arcade_physics_core::{FrameInput, SimConfig};
use std::fs;

#[test]
fn sweep_writes_a_deterministic_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_dir = dir.path().join("sweep");

    let report = run_sweep(SweepConfig {
        sim: SimConfig::default(),
        seeds: vec![1, 2, 0xDEAD_BEEF],
        max_frames: 240,
        out_dir: out_dir.clone(),
        jobs: Some(2),
    })
    .expect("sweep runs");

    assert_eq!(report.seed_count, 3);
    assert!(report.divergent_seeds.is_empty());
    assert!(report.runs.iter().all(|run| run.deterministic));

    let raw = fs::read_to_string(out_dir.join("summary.json")).expect("summary written");
    let on_disk: SweepReport = serde_json::from_str(&raw).expect("summary parses");
    assert_eq!(on_disk.runs.len(), 3);
    assert_eq!(on_disk.max_score, report.max_score);
}

#[test]
fn empty_seed_list_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = run_sweep(SweepConfig {
        sim: SimConfig::default(),
        seeds: Vec::new(),
        max_frames: 10,
        out_dir: dir.path().to_path_buf(),
        jobs: None,
    });
    assert!(result.is_err());
}

#[test]
fn scripted_run_report_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("inputs.json");
    let inputs = vec![
        FrameInput {
            thrust: true,
            ..FrameInput::default()
        };
        30
    ];
    fs::write(&script, serde_json::to_vec(&inputs).unwrap()).unwrap();

    let mut pilot = ScriptedPilot::load(&script).expect("script loads");
    let artifact = run_session(&SimConfig::default(), 11, 60, &mut pilot).expect("session runs");
    assert_eq!(artifact.metrics.frames, 60);
    assert!(artifact.metrics.final_energy < 100.0);

    let report = dir.path().join("out/report.json");
    write_report(&report, &artifact).expect("report written");
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["metrics"]["frames"], 60);
    assert_eq!(value["metrics"]["pilot"], "scripted");
    assert!(value["final_snapshot"]["entities"].is_array());
}
