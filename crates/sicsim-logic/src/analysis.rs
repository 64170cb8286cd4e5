//! Per-step summaries and the post-run report derived from them.

use serde::{Deserialize, Serialize};

use crate::constants::drug::PRESENCE_EPSILON;

/// One row of the per-run summary: field means and drug level after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub step: u32,
    pub mean_infection: f64,
    pub mean_defense: f64,
    pub drug_concentration: f64,
}

/// Headline numbers of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub steps: u32,
    pub treatment_start: u32,
    pub peak_infection: f64,
    pub peak_infection_step: u32,
    pub final_infection: f64,
    pub final_defense: f64,
    /// Mean infection on the last step before treatment.
    pub pre_treatment_infection: Option<f64>,
    /// Average mean infection over the effect window after treatment start.
    pub effect_window_mean_infection: Option<f64>,
    pub effect_window_steps: u32,
    /// First step at or after treatment start with no infection left.
    pub cleared_at: Option<u32>,
    pub peak_drug: Option<f64>,
    pub peak_drug_step: Option<u32>,
}

impl RunReport {
    /// Build a report from a run's summaries. Returns `None` for an empty run.
    pub fn from_summaries(
        summaries: &[StepSummary],
        treatment_start: u32,
        effect_window_steps: u32,
    ) -> Option<Self> {
        let last = summaries.last()?;

        let mut peak = summaries[0];
        for s in summaries {
            if s.mean_infection > peak.mean_infection {
                peak = *s;
            }
        }

        let pre_treatment_infection = treatment_start
            .checked_sub(1)
            .and_then(|step| summaries.iter().find(|s| s.step == step))
            .map(|s| s.mean_infection);

        let window_end = treatment_start.saturating_add(effect_window_steps);
        let window: Vec<f64> = summaries
            .iter()
            .filter(|s| s.step >= treatment_start && s.step < window_end)
            .map(|s| s.mean_infection)
            .collect();
        let effect_window_mean_infection = if window.is_empty() {
            None
        } else {
            Some(window.iter().sum::<f64>() / window.len() as f64)
        };

        let cleared_at = summaries
            .iter()
            .find(|s| s.step >= treatment_start && s.mean_infection == 0.0)
            .map(|s| s.step);

        let drug_peak = summaries
            .iter()
            .filter(|s| s.drug_concentration > PRESENCE_EPSILON)
            .fold(None::<StepSummary>, |best, s| match best {
                Some(b) if b.drug_concentration >= s.drug_concentration => Some(b),
                _ => Some(*s),
            });

        Some(Self {
            steps: summaries.len() as u32,
            treatment_start,
            peak_infection: peak.mean_infection,
            peak_infection_step: peak.step,
            final_infection: last.mean_infection,
            final_defense: last.mean_defense,
            pre_treatment_infection,
            effect_window_mean_infection,
            effect_window_steps,
            cleared_at,
            peak_drug: drug_peak.map(|s| s.drug_concentration),
            peak_drug_step: drug_peak.map(|s| s.step),
        })
    }
}
