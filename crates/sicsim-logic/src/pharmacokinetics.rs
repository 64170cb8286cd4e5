//! Drug concentration over time.
//!
//! A single dose ramps linearly to its peak at `t_max`, then decays
//! exponentially with the drug's half-life. Multiple doses superpose.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::DrugParams;

/// Concentration contributed by one dose, `elapsed` steps after administration.
///
/// - `elapsed < 0`: not yet administered, 0.
/// - `0 ≤ elapsed ≤ t_max`: linear ramp `dose * elapsed / t_max`.
/// - `elapsed > t_max`: `dose * exp(-ln2 / half_life * (elapsed - t_max))`.
pub fn concentration(dose: f64, elapsed: f64, t_max: f64, half_life: f64) -> f64 {
    if elapsed < 0.0 {
        return 0.0;
    }
    if elapsed <= t_max {
        return dose * (elapsed / t_max);
    }
    let k = std::f64::consts::LN_2 / half_life;
    dose * (-k * (elapsed - t_max)).exp()
}

/// One administration, `offset` steps after treatment start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoseEvent {
    pub offset: u32,
}

/// Append-only, time-ordered list of dose events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoseSchedule {
    doses: Vec<DoseEvent>,
}

/// Dose schedule misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("dose at offset {offset} would precede the last dose at offset {last}")]
    OutOfOrder { offset: u32, last: u32 },
}

impl DoseSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dose. Offsets must be non-decreasing.
    pub fn administer(&mut self, offset: u32) -> Result<(), ScheduleError> {
        if let Some(last) = self.doses.last() {
            if offset < last.offset {
                return Err(ScheduleError::OutOfOrder {
                    offset,
                    last: last.offset,
                });
            }
        }
        self.doses.push(DoseEvent { offset });
        Ok(())
    }

    pub fn doses(&self) -> &[DoseEvent] {
        &self.doses
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    pub fn clear(&mut self) {
        self.doses.clear();
    }

    /// Summed concentration of `drug` at `step`, with dose offsets counted
    /// from `treatment_start`.
    pub fn total_concentration(&self, drug: &DrugParams, step: u32, treatment_start: u32) -> f64 {
        self.doses
            .iter()
            .map(|d| {
                let elapsed = step as f64 - (treatment_start as f64 + d.offset as f64);
                concentration(drug.dose, elapsed, drug.t_max, drug.half_life)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_before_dose_is_zero() {
        assert_eq!(concentration(1.0, -1.0, 14.0, 100.0), 0.0);
        assert_eq!(concentration(123.0, -0.001, 0.5, 1.0), 0.0);
    }

    #[test]
    fn test_ramp() {
        assert_eq!(concentration(2.0, 0.0, 10.0, 50.0), 0.0);
        assert!((concentration(2.0, 5.0, 10.0, 50.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_continuous_at_peak() {
        let dose = 1.875;
        let at_peak = concentration(dose, 14.0, 14.0, 200.0);
        let just_after = concentration(dose, 14.0 + 1e-9, 14.0, 200.0);
        assert_eq!(at_peak, dose);
        assert!((just_after - dose).abs() < 1e-9);
    }

    #[test]
    fn test_half_life_after_peak() {
        let c = concentration(1.0, 14.0 + 100.0, 14.0, 100.0);
        assert!((c - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_decay_is_non_increasing() {
        let mut prev = concentration(1.0, 14.0, 14.0, 100.0);
        for t in 15..400 {
            let c = concentration(1.0, t as f64, 14.0, 100.0);
            assert!(c <= prev);
            assert!(c >= 0.0);
            prev = c;
        }
    }

    #[test]
    fn test_schedule_rejects_out_of_order() {
        let mut s = DoseSchedule::new();
        s.administer(0).unwrap();
        s.administer(30).unwrap();
        s.administer(30).unwrap();
        assert_eq!(
            s.administer(10),
            Err(ScheduleError::OutOfOrder {
                offset: 10,
                last: 30
            })
        );
        assert_eq!(s.doses().len(), 3);
    }

    #[test]
    fn test_empty_schedule_has_no_drug() {
        let s = DoseSchedule::new();
        assert_eq!(s.total_concentration(&DrugParams::CTX, 5000, 1000), 0.0);
    }

    #[test]
    fn test_doses_superpose() {
        let drug = DrugParams::TETRACYCLINE;
        let mut single = DoseSchedule::new();
        single.administer(0).unwrap();
        let mut double = DoseSchedule::new();
        double.administer(0).unwrap();
        double.administer(20).unwrap();

        let step = 1000 + 40;
        let a = single.total_concentration(&drug, step, 1000);
        let b = concentration(drug.dose, 20.0, drug.t_max, drug.half_life);
        assert!((double.total_concentration(&drug, step, 1000) - (a + b)).abs() < 1e-12);
        // Second dose contributes nothing before its own administration
        assert_eq!(
            double.total_concentration(&drug, 1010, 1000),
            single.total_concentration(&drug, 1010, 1000)
        );
    }
}
