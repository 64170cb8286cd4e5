//! Run parameters for grid, duration, infection and callose rates, and drugs.
//!
//! A [`Params`] value is built once (defaults, or deserialized from a config
//! file), validated, and then treated as immutable for the whole run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::hill;

/// Pharmacological properties of one treatment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrugParams {
    /// Normalized dose administered per dose event.
    pub dose: f64,
    /// Concentration giving half the maximal effect.
    pub ec50: f64,
    /// Hill coefficient of the dose-response curve.
    pub hill_n: f64,
    /// Maximum efficacy multiplier applied on top of the Hill response.
    pub kill_scale: f64,
    /// Steps from administration to peak concentration.
    pub t_max: f64,
    /// Elimination half-life in steps.
    pub half_life: f64,
}

impl DrugParams {
    /// Reference bactericidal drug (CTX).
    pub const CTX: DrugParams = DrugParams {
        dose: 15.0 / 80.0,
        ec50: 0.40,
        hill_n: 2.0,
        kill_scale: 3.0,
        t_max: 14.0,
        half_life: 100.0,
    };

    /// Reference bacteriostatic drug (oxytetracycline).
    pub const TETRACYCLINE: DrugParams = DrugParams {
        dose: 150.0 / 80.0,
        ec50: 1.0,
        hill_n: 2.0,
        kill_scale: 3.0,
        t_max: 14.0,
        half_life: 200.0,
    };

    /// Fractional effect at `concentration`: scaled Hill response capped at 1.
    ///
    /// Used both as the bactericidal kill fraction and as the bacteriostatic
    /// growth/spread inhibition.
    pub fn effect(&self, concentration: f64) -> f64 {
        (hill(concentration, self.ec50, self.hill_n) * self.kill_scale).min(1.0)
    }

    fn validate(&self, name: &'static str) -> Result<(), ParamError> {
        non_negative(name, "dose", self.dose)?;
        positive(name, "ec50", self.ec50)?;
        positive(name, "hill_n", self.hill_n)?;
        non_negative(name, "kill_scale", self.kill_scale)?;
        positive(name, "t_max", self.t_max)?;
        positive(name, "half_life", self.half_life)
    }
}

/// All adjustable settings of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // --- Grid and time ---
    /// Lattice dimension L (the grid is L×L).
    pub grid_size: usize,
    /// Steps before treatment starts; treatment starts at this step index.
    pub steps: u32,
    /// Steps after treatment start.
    pub extra_steps: u32,

    // --- Infection ---
    /// Base spread probability β.
    pub beta: f64,
    /// Intrinsic growth rate r.
    pub growth_rate: f64,
    /// Per-cell carrying capacity Imax.
    pub carrying_capacity: f64,
    /// Callose suppression strength d.
    pub defense_suppression: f64,
    /// Natural death rate δI.
    pub death_rate: f64,

    // --- Callose ---
    /// Callose production rate αC.
    pub defense_production: f64,
    /// Callose decay rate δC.
    pub defense_decay: f64,
    /// Per-cell callose ceiling Climit.
    pub defense_limit: f64,
    /// Manhattan radius R of local signal averaging.
    pub signal_radius: usize,

    // --- Treatments ---
    pub ctx: DrugParams,
    pub tetracycline: DrugParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            grid_size: 50,
            steps: 1000,
            extra_steps: 1500,
            beta: 0.08,
            growth_rate: 0.15,
            carrying_capacity: 1.0,
            defense_suppression: 0.7,
            death_rate: 0.001,
            defense_production: 0.6,
            defense_decay: 0.001,
            defense_limit: 1.0,
            signal_radius: 6,
            ctx: DrugParams::CTX,
            tetracycline: DrugParams::TETRACYCLINE,
        }
    }
}

impl Params {
    /// Total number of steps in a run.
    pub fn total_steps(&self) -> u32 {
        self.steps.saturating_add(self.extra_steps)
    }

    /// Step index at which treatment begins.
    pub fn treatment_start(&self) -> u32 {
        self.steps
    }

    /// Check every value is usable by the engine.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.grid_size == 0 {
            return Err(ParamError::EmptyGrid);
        }
        probability("beta", self.beta)?;
        non_negative("params", "growth_rate", self.growth_rate)?;
        positive("params", "carrying_capacity", self.carrying_capacity)?;
        non_negative("params", "defense_suppression", self.defense_suppression)?;
        probability("death_rate", self.death_rate)?;
        non_negative("params", "defense_production", self.defense_production)?;
        probability("defense_decay", self.defense_decay)?;
        non_negative("params", "defense_limit", self.defense_limit)?;
        self.ctx.validate("ctx")?;
        self.tetracycline.validate("tetracycline")
    }
}

/// Invalid run configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("grid_size must be at least 1")]
    EmptyGrid,
    #[error("{section}.{field} must be finite, got {value}")]
    NotFinite {
        section: &'static str,
        field: &'static str,
        value: f64,
    },
    #[error("{section}.{field} out of range: {value} (must be {requirement})")]
    OutOfRange {
        section: &'static str,
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },
}

fn finite(section: &'static str, field: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NotFinite {
            section,
            field,
            value,
        })
    }
}

fn non_negative(section: &'static str, field: &'static str, value: f64) -> Result<(), ParamError> {
    finite(section, field, value)?;
    if value < 0.0 {
        return Err(ParamError::OutOfRange {
            section,
            field,
            value,
            requirement: ">= 0",
        });
    }
    Ok(())
}

fn positive(section: &'static str, field: &'static str, value: f64) -> Result<(), ParamError> {
    finite(section, field, value)?;
    if value <= 0.0 {
        return Err(ParamError::OutOfRange {
            section,
            field,
            value,
            requirement: "> 0",
        });
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ParamError> {
    finite("params", field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ParamError::OutOfRange {
            section: "params",
            field,
            value,
            requirement: "within 0-1",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Params::default().validate(), Ok(()));
    }

    #[test]
    fn test_total_steps_and_start() {
        let p = Params::default();
        assert_eq!(p.total_steps(), 2500);
        assert_eq!(p.treatment_start(), 1000);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let p = Params {
            grid_size: 0,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(ParamError::EmptyGrid));
    }

    #[test]
    fn test_beta_above_one_rejected() {
        let p = Params {
            beta: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParamError::OutOfRange { field: "beta", .. })
        ));
    }

    #[test]
    fn test_nan_rate_rejected() {
        let p = Params {
            growth_rate: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParamError::NotFinite {
                field: "growth_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_drug_half_life_must_be_positive() {
        let mut p = Params::default();
        p.tetracycline.half_life = 0.0;
        let err = p.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "tetracycline.half_life out of range: 0 (must be > 0)"
        );
    }

    #[test]
    fn test_effect_is_capped() {
        let drug = DrugParams::CTX;
        assert_eq!(drug.effect(0.0), 0.0);
        // hill(ec50) = 0.5, scaled by 3 → capped at 1
        assert_eq!(drug.effect(drug.ec50), 1.0);
        let small = drug.effect(0.1);
        assert!(small > 0.0 && small < 1.0);
    }
}
