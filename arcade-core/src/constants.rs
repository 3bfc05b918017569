//! Default tuning values for the space session and lane race.
//!
//! These seed the `Default` impls in [`crate::config`]; nothing in the
//! simulation reads them directly once a config has been built.

// Arena
pub const ARENA_WIDTH: f64 = 160.0;
pub const ARENA_HEIGHT: f64 = 144.0;

// Scheduler
pub const FIXED_STEP: f64 = 1.0 / 60.0;
pub const MAX_SUBSTEPS: u32 = 4;

// Player craft
pub const CRAFT_RADIUS: f64 = 4.0;
pub const CRAFT_MASS: f64 = 1.0;
pub const CRAFT_THRUST_FORCE: f64 = 150.0;
pub const CRAFT_ROTATION_SPEED: f64 = 3.0; // rad/s
pub const CRAFT_MAX_SPEED: f64 = 200.0;
pub const CRAFT_FIRE_COOLDOWN: f64 = 0.25;
pub const CRAFT_SPAWN_INVULNERABLE: f64 = 2.0;
pub const CRAFT_DRAG: f64 = 1.0; // retained velocity per sub-step, 1.0 = frictionless

// Fragments: (radius, mass)
pub const FRAGMENT_LARGE_SHAPE: (f64, f64) = (12.0, 4.0);
pub const FRAGMENT_MEDIUM_SHAPE: (f64, f64) = (8.0, 2.0);
pub const FRAGMENT_SMALL_SHAPE: (f64, f64) = (4.0, 1.0);

// Fragment drift speed bands [min, max)
pub const FRAGMENT_LARGE_SPEED: (f64, f64) = (10.0, 30.0);
pub const FRAGMENT_MEDIUM_SPEED: (f64, f64) = (15.0, 40.0);
pub const FRAGMENT_SMALL_SPEED: (f64, f64) = (20.0, 50.0);

// Fragment spin limits, rad/s (symmetric)
pub const FRAGMENT_LARGE_SPIN: f64 = 1.0;
pub const FRAGMENT_MEDIUM_SPIN: f64 = 1.5;
pub const FRAGMENT_SMALL_SPIN: f64 = 2.0;

// Projectile
pub const PROJECTILE_RADIUS: f64 = 1.0;
pub const PROJECTILE_MASS: f64 = 0.1;
pub const PROJECTILE_LIFETIME: f64 = 1.0;
pub const PROJECTILE_SPEED: f64 = 300.0;

// Resource pickups
pub const RESOURCE_RADIUS: f64 = 1.0;
pub const RESOURCE_MASS: f64 = 0.1;
pub const RESOURCE_DROP_CHANCE: f64 = 0.05;
pub const RESOURCE_SCATTER: f64 = 5.0;
pub const RESOURCE_DRIFT_SPEED: (f64, f64) = (5.0, 15.0);
pub const RESOURCE_WEIGHT_COMMON: u32 = 70;
pub const RESOURCE_WEIGHT_RARE: u32 = 25;
pub const RESOURCE_WEIGHT_EPIC: u32 = 5;

// Splitting: (angular offset rad, child speed)
pub const SPLIT_LARGE: (f64, f64) = (0.5, 30.0);
pub const SPLIT_MEDIUM: (f64, f64) = (0.8, 40.0);

// Scoring
pub const SCORE_LARGE_FRAGMENT: u32 = 20;
pub const SCORE_MEDIUM_FRAGMENT: u32 = 50;
pub const SCORE_SMALL_FRAGMENT: u32 = 100;

// Energy
pub const ENERGY_MAX: f64 = 100.0;
pub const ENERGY_THRUST_COST: f64 = 5.0; // per second
pub const ENERGY_REGEN: f64 = 2.0; // per second
pub const ENERGY_MIN_MOVEMENT: f64 = 5.0;
pub const ENERGY_WEAPON_COST: f64 = 2.0;

// Genetic modifier clamps
pub const SPEED_MULTIPLIER_BOUNDS: (f64, f64) = (0.3, 2.0);
pub const DRAIN_MULTIPLIER_BOUNDS: (f64, f64) = (0.3, 1.5);

// Initial population
pub const INITIAL_LARGE_FRAGMENTS: u32 = 3;
pub const SPAWN_EDGE_PADDING: f64 = 20.0;
pub const SPAWN_CRAFT_CLEARANCE: f64 = 50.0;
pub const SPAWN_MAX_ATTEMPTS: u32 = 32;

// Lane race
pub const RACE_TRACK_LENGTH: f64 = 1500.0;
pub const RACE_SEGMENT_LENGTH: f64 = 200.0;
pub const RACE_BASE_SPEED: f64 = 10.0;
pub const RACE_MAX_SPEED: f64 = 25.0;
pub const RACE_ACCELERATION: f64 = 5.0;
pub const RACE_ENERGY_DRAIN: f64 = 1.0; // per second
pub const RACE_ENERGY_RECOVERY: f64 = 2.0; // per second
pub const RACE_FIXED_STEP: f64 = 1.0 / 30.0;
