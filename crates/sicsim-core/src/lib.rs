//! SICSim Core - Infection/Callose Lattice Simulation Engine
//!
//! A stochastic-deterministic simulation of a pathogen spreading over a
//! square lattice of host cells, opposed by callose deposited at the infection
//! front and, optionally, by a drug with a one-compartment concentration curve.
//!
//! # Architecture
//!
//! - **Fields**: [`infection::InfectionField`] and [`defense::DefenseField`]
//!   each own a lattice and its double buffer
//! - **Engine**: [`engine::SimulationEngine`] owns the fields, the dose
//!   schedule and the run's RNG, and advances them in a fixed order
//! - **Output**: observers in [`output`] receive every step's summary and full
//!   state; file writers degrade instead of aborting the run
//!
//! # Example
//!
//! ```rust,no_run
//! use sicsim_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(Params::default(), Scenario::Ctx, 42);
//! let mut recorder = CsvRecorder::new(
//!     "out",
//!     Scenario::Ctx,
//!     engine.total_steps(),
//!     RecorderOptions::default(),
//! );
//! let summaries = engine.run(&mut recorder);
//! let stats = recorder.finish();
//! println!("{} steps, {} frames", summaries.len(), stats.frames_written);
//! ```

pub mod defense;
pub mod engine;
pub mod error;
pub mod infection;
pub mod output;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::{Frame, Phase, SimulationEngine, StepObserver};
    pub use crate::error::OutputError;
    pub use crate::output::{CsvRecorder, MemoryRecorder, RecorderOptions, RecorderStats};
    pub use sicsim_logic::analysis::{RunReport, StepSummary};
    pub use sicsim_logic::params::{DrugParams, Params};
    pub use sicsim_logic::treatment::{Scenario, Treatment};
}
