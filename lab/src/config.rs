use std::{env, fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use arcade_physics_core::{RaceConfig, SimConfig, Terrain};
use serde::{Deserialize, Serialize};

/// Everything the lab can be told about a run. Loaded from an optional JSON
/// file, then overridden by `ARCADE_*` environment variables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub sim: SimConfig,
    pub race: RaceConfig,
}

pub fn load_config(path: Option<&Path>) -> Result<LabConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading config {}", path.display()))?;
            serde_json::from_str::<LabConfig>(&raw)
                .with_context(|| format!("failed parsing config {}", path.display()))?
        }
        None => LabConfig::default(),
    };
    config.apply_overrides(|name| env::var(name).ok());
    config.sim.validate().context("invalid simulation config")?;
    config.race.validate().context("invalid race config")?;
    Ok(config)
}

impl LabConfig {
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read_f64 = |name: &str, default: f64| parse_env(name, lookup(name), default);
        let read_u32 = |name: &str, default: u32| parse_env(name, lookup(name), default);

        let sim = &mut self.sim;
        sim.arena.width = read_f64("ARCADE_ARENA_WIDTH", sim.arena.width);
        sim.arena.height = read_f64("ARCADE_ARENA_HEIGHT", sim.arena.height);
        sim.scheduler.fixed_step = read_f64("ARCADE_FIXED_STEP", sim.scheduler.fixed_step);
        sim.scheduler.max_substeps = read_u32("ARCADE_MAX_SUBSTEPS", sim.scheduler.max_substeps);
        sim.kinematics.craft_drag = read_f64("ARCADE_CRAFT_DRAG", sim.kinematics.craft_drag);
        sim.population.large_fragments =
            read_u32("ARCADE_LARGE_FRAGMENTS", sim.population.large_fragments);
        sim.fragmentation.resource_chance =
            read_f64("ARCADE_RESOURCE_CHANCE", sim.fragmentation.resource_chance);
        sim.medium = read_terrain("ARCADE_MEDIUM", lookup("ARCADE_MEDIUM"), sim.medium);

        let race = &mut self.race;
        race.track_length = read_f64("ARCADE_RACE_TRACK_LENGTH", race.track_length);
        race.segment_length = read_f64("ARCADE_RACE_SEGMENT_LENGTH", race.segment_length);
    }
}

/// Parses an override, keeping `default` (with a warning) when the value is
/// malformed.
pub(crate) fn parse_env<T: FromStr + Copy>(name: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(name, value = %raw, "ignoring malformed override");
            default
        }
    }
}

fn read_terrain(name: &str, raw: Option<String>, default: Terrain) -> Terrain {
    let Some(raw) = raw else {
        return default;
    };
    match serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase())) {
        Ok(terrain) => terrain,
        Err(err) => {
            tracing::warn!(name, value = %raw, error = %err, "ignoring unknown terrain");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = LabConfig::default();
        config.apply_overrides(overrides(&[
            ("ARCADE_ARENA_WIDTH", "320"),
            ("ARCADE_MAX_SUBSTEPS", "8"),
            ("ARCADE_MEDIUM", "Water"),
        ]));
        assert_eq!(config.sim.arena.width, 320.0);
        assert_eq!(config.sim.scheduler.max_substeps, 8);
        assert_eq!(config.sim.medium, Terrain::Water);
    }

    #[test]
    fn malformed_overrides_fall_back() {
        let mut config = LabConfig::default();
        config.apply_overrides(overrides(&[
            ("ARCADE_ARENA_WIDTH", "wide"),
            ("ARCADE_MEDIUM", "lava"),
        ]));
        assert_eq!(config, LabConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: LabConfig =
            serde_json::from_str(r#"{ "race": { "track_length": 600.0 } }"#).unwrap();
        assert_eq!(config.race.track_length, 600.0);
        assert_eq!(config.sim, SimConfig::default());
    }
}
