//! CLI command implementations.

pub mod menu;
pub mod params;
pub mod run;
