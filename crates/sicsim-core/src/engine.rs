//! Simulation engine owning both fields and the time loop.
//!
//! One step is, in strict order:
//! 1. administer the dose if treatment starts this step;
//! 2. compute the bacteriostatic spread inhibition (0 otherwise);
//! 3. spread infection against the callose lattice of the *previous* step;
//! 4. apply infection kinetics with the active drug exposure;
//! 5. update callose against the infection lattice of *this* step;
//! 6. summarise and hand the full state to the observer.
//!
//! The one-step lag between 3 and 5 is part of the model.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sicsim_logic::analysis::StepSummary;
use sicsim_logic::constants::drug::PRESENCE_EPSILON;
use sicsim_logic::constants::output::PROGRESS_INTERVAL;
use sicsim_logic::lattice::Lattice;
use sicsim_logic::params::Params;
use sicsim_logic::pharmacokinetics::DoseSchedule;
use sicsim_logic::topology::Topology;
use sicsim_logic::treatment::{Scenario, Treatment};

use crate::defense::DefenseField;
use crate::infection::{DrugExposure, InfectionField};

/// Where the run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreTreatment,
    TreatmentActive,
    Finished,
}

/// Borrowed full state after a step, for snapshot output.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub step: u32,
    pub infection: &'a Lattice,
    pub defense: &'a Lattice,
    /// Drug concentration, uniform over the lattice.
    pub drug_concentration: f64,
}

/// Receives every step's summary and full-state frame.
pub trait StepObserver {
    fn observe(&mut self, summary: &StepSummary, frame: &Frame<'_>);
}

impl StepObserver for Vec<StepSummary> {
    fn observe(&mut self, summary: &StepSummary, _frame: &Frame<'_>) {
        self.push(*summary);
    }
}

/// Main simulation engine for one scenario run.
pub struct SimulationEngine {
    params: Params,
    scenario: Scenario,
    treatment: Treatment,
    topology: Topology,
    infection: InfectionField,
    defense: DefenseField,
    schedule: DoseSchedule,
    rng: StdRng,
    seed: u64,
    seeded_cell: (usize, usize),
    step: u32,
    phase: Phase,
    last_drug_concentration: f64,
}

impl SimulationEngine {
    /// Build an engine and seed the initial infection.
    ///
    /// # Panics
    ///
    /// If `params` fails validation. Configuration is checked by the loader;
    /// reaching this with invalid values is a setup bug.
    pub fn new(params: Params, scenario: Scenario, seed: u64) -> Self {
        if let Err(err) = params.validate() {
            panic!("invalid simulation parameters: {err}");
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let topology = Topology::new(params.grid_size, params.signal_radius);
        let mut infection = InfectionField::new(&params);
        let mut defense = DefenseField::new(&params);
        defense.reset();
        let seeded_cell = infection.reset(&mut rng);
        let treatment = scenario.treatment(&params);
        let phase = if params.total_steps() == 0 {
            Phase::Finished
        } else {
            Phase::PreTreatment
        };

        log::debug!(
            "Engine ready: scenario={} grid={}x{} seed={} seeded_cell={:?}",
            scenario,
            params.grid_size,
            params.grid_size,
            seed,
            seeded_cell
        );

        Self {
            params,
            scenario,
            treatment,
            topology,
            infection,
            defense,
            schedule: DoseSchedule::new(),
            rng,
            seed,
            seeded_cell,
            step: 0,
            phase,
            last_drug_concentration: 0.0,
        }
    }

    /// Advance one step. Returns `None` once the run is finished.
    pub fn step(&mut self) -> Option<StepSummary> {
        if self.phase == Phase::Finished {
            return None;
        }
        let t = self.step;
        let start = self.params.treatment_start();

        // 1. Treatment onset
        if t >= start && self.phase == Phase::PreTreatment && self.treatment.drug().is_some() {
            self.begin_treatment(t);
        }

        // 2. Spread inhibition (bacteriostatic only)
        let mut drug_concentration = 0.0;
        let mut inhibition = 0.0;
        if let Treatment::Bacteriostatic(drug) = &self.treatment {
            drug_concentration = self.schedule.total_concentration(drug, t, start);
            if drug_concentration > PRESENCE_EPSILON {
                inhibition = drug.effect(drug_concentration);
            }
        }

        // 3. Spread, against last step's callose
        let newly_infected = self.infection.spread(
            self.defense.lattice(),
            self.params.beta,
            inhibition,
            &self.topology,
            &mut self.rng,
        );

        // 4. Kinetics
        let exposure = match self.treatment {
            Treatment::None => DrugExposure::None,
            Treatment::Bactericidal(drug) => {
                drug_concentration = self.schedule.total_concentration(&drug, t, start);
                DrugExposure::Bactericidal {
                    drug,
                    concentration: drug_concentration,
                }
            }
            Treatment::Bacteriostatic(drug) => DrugExposure::Bacteriostatic {
                drug,
                concentration: drug_concentration,
            },
        };
        self.infection.update(self.defense.lattice(), &exposure);

        // 5. Callose, against this step's infection
        self.defense.update(self.infection.lattice(), &self.topology);

        // 6. Summary
        let summary = StepSummary {
            step: t,
            mean_infection: self.infection.mean(),
            mean_defense: self.defense.mean(),
            drug_concentration,
        };
        self.last_drug_concentration = drug_concentration;

        if t % PROGRESS_INTERVAL == 0 {
            log::info!(
                "[{}] Step {} | Mean Infection: {:.4} | Mean Callose: {:.4} | Drug: {:.4}",
                self.scenario,
                t,
                summary.mean_infection,
                summary.mean_defense,
                summary.drug_concentration
            );
        }
        log::trace!(
            "step {}: {} new infections, {} infected cells",
            t,
            newly_infected,
            self.infection.infected_cells()
        );

        self.step += 1;
        if self.step >= self.params.total_steps() {
            self.phase = Phase::Finished;
        }
        Some(summary)
    }

    /// Run to completion, feeding every step to `observer`.
    ///
    /// Returns all per-step summaries.
    pub fn run<O: StepObserver + ?Sized>(&mut self, observer: &mut O) -> Vec<StepSummary> {
        let mut summaries = Vec::new();
        while let Some(summary) = self.step() {
            observer.observe(&summary, &self.frame());
            summaries.push(summary);
        }
        log::info!(
            "[{}] Simulation finished after {} steps",
            self.scenario,
            self.step
        );
        summaries
    }

    fn begin_treatment(&mut self, t: u32) {
        let offset = t - self.params.treatment_start();
        match self.schedule.administer(offset) {
            Ok(()) => {
                self.phase = Phase::TreatmentActive;
                log::info!(
                    "[{}] Treatment started at step {} (dose offset {})",
                    self.scenario,
                    t,
                    offset
                );
            }
            Err(err) => log::error!("[{}] dose not scheduled: {}", self.scenario, err),
        }
    }

    /// Full state after the most recent step.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            step: self.step.saturating_sub(1),
            infection: self.infection.lattice(),
            defense: self.defense.lattice(),
            drug_concentration: self.last_drug_concentration,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the next step to run.
    pub fn current_step(&self) -> u32 {
        self.step
    }

    pub fn total_steps(&self) -> u32 {
        self.params.total_steps()
    }

    pub fn remaining_steps(&self) -> u32 {
        self.total_steps().saturating_sub(self.step)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn treatment(&self) -> &Treatment {
        &self.treatment
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Cell that received the initial infection.
    pub fn seeded_cell(&self) -> (usize, usize) {
        self.seeded_cell
    }

    pub fn infection(&self) -> &InfectionField {
        &self.infection
    }

    pub fn defense(&self) -> &DefenseField {
        &self.defense
    }

    pub fn dose_schedule(&self) -> &DoseSchedule {
        &self.schedule
    }
}
