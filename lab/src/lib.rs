pub mod config;
pub mod runner;
pub mod sweep;
pub mod util;
