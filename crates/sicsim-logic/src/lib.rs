//! Pure model logic for SICSim.
//!
//! This crate contains every piece of the infection/callose model that is
//! independent of random numbers, file output, or the time loop. Functions take
//! plain data and return results, making them unit-testable and shareable
//! between the engine, the CLI, and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`analysis`] | Per-step summaries and the post-run report |
//! | [`constants`] | Fixed model constants (seed loads, Hill shape, thresholds) |
//! | [`lattice`] | Square row-major grid of `f64` cells |
//! | [`params`] | Run parameters, drug parameters, validation |
//! | [`pharmacokinetics`] | Single-dose concentration curve and dose schedules |
//! | [`topology`] | Toroidal neighbors, clipped local signal, Hill function |
//! | [`treatment`] | Scenario enumeration and treatment variants |

pub mod analysis;
pub mod constants;
pub mod lattice;
pub mod params;
pub mod pharmacokinetics;
pub mod topology;
pub mod treatment;
