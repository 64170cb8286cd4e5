//! Infection field: pathogen load per lattice cell.
//!
//! The load advances in two passes per step: stochastic spread into empty
//! neighbors, then a deterministic local kinetic update (logistic growth,
//! natural death, callose suppression, drug action). Both passes read the
//! previous generation and write a private buffer that is swapped in at the
//! end, so no cell ever observes a value written in the same pass.

use rand::Rng;
use sicsim_logic::constants::defense::SPREAD_ATTENUATION;
use sicsim_logic::constants::drug::{BACTERIOSTATIC_ACTIVE_CLEARING, PRESENCE_EPSILON};
use sicsim_logic::constants::loads;
use sicsim_logic::lattice::Lattice;
use sicsim_logic::params::{DrugParams, Params};
use sicsim_logic::topology::Topology;

/// Drug acting on the kinetic update this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrugExposure {
    None,
    Bactericidal {
        drug: DrugParams,
        concentration: f64,
    },
    Bacteriostatic {
        drug: DrugParams,
        concentration: f64,
    },
}

impl DrugExposure {
    pub fn concentration(&self) -> f64 {
        match self {
            DrugExposure::None => 0.0,
            DrugExposure::Bactericidal { concentration, .. }
            | DrugExposure::Bacteriostatic { concentration, .. } => *concentration,
        }
    }
}

/// Pathogen load lattice with its double buffer.
#[derive(Debug, Clone)]
pub struct InfectionField {
    current: Lattice,
    next: Lattice,
    growth_rate: f64,
    carrying_capacity: f64,
    defense_suppression: f64,
    death_rate: f64,
}

impl InfectionField {
    pub fn new(params: &Params) -> Self {
        Self {
            current: Lattice::zeros(params.grid_size),
            next: Lattice::zeros(params.grid_size),
            growth_rate: params.growth_rate,
            carrying_capacity: params.carrying_capacity,
            defense_suppression: params.defense_suppression,
            death_rate: params.death_rate,
        }
    }

    /// Zero the lattice and seed one uniformly random cell.
    ///
    /// Returns the seeded cell.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) -> (usize, usize) {
        let l = self.current.size();
        self.current.fill(0.0);
        self.next.fill(0.0);
        let i0 = rng.gen_range(0..l);
        let j0 = rng.gen_range(0..l);
        self.current.set(i0, j0, loads::INITIAL_INFECTION_LOAD);
        (i0, j0)
    }

    /// Overwrite a single cell's load, for custom initial conditions.
    pub fn set(&mut self, row: usize, col: usize, load: f64) {
        self.current.set(row, col, load);
    }

    /// Spread into empty neighbors of every infected cell.
    ///
    /// Each infected cell makes one draw per neighbor that is still empty in
    /// this pass's output, and infects it if the draw falls below
    /// `beta * (1 - inhibition) * exp(-5 * C)`. `defense` must be the
    /// callose lattice from before this step's callose update. Cells infected
    /// earlier in the same pass are neither re-infected nor spread from.
    ///
    /// Returns the number of newly infected cells.
    pub fn spread<R: Rng>(
        &mut self,
        defense: &Lattice,
        beta: f64,
        inhibition: f64,
        topology: &Topology,
        rng: &mut R,
    ) -> usize {
        let l = self.current.size();
        let base = beta * (1.0 - inhibition);
        self.next.copy_from(&self.current);

        let mut infected = 0;
        for i in 0..l {
            for j in 0..l {
                if self.current.get(i, j) <= 0.0 {
                    continue;
                }
                for (ni, nj) in topology.neighbors(i, j) {
                    if self.next.get(ni, nj) != 0.0 {
                        continue;
                    }
                    let p = base * (-SPREAD_ATTENUATION * defense.get(ni, nj)).exp();
                    if rng.gen::<f64>() < p {
                        self.next.set(ni, nj, loads::SPREAD_INFECTION_LOAD);
                        infected += 1;
                    }
                }
            }
        }

        std::mem::swap(&mut self.current, &mut self.next);
        infected
    }

    /// Change in load for one cell over one step.
    pub fn kinetic_delta(&self, load: f64, callose: f64, exposure: &DrugExposure) -> f64 {
        let growth = self.growth_rate * load * (1.0 - load / self.carrying_capacity);
        let natural_death = self.death_rate * load;
        let suppression = self.defense_suppression * callose * load;
        let base = growth - natural_death - suppression;

        if exposure.concentration() < PRESENCE_EPSILON {
            return base;
        }
        match exposure {
            DrugExposure::None => base,
            DrugExposure::Bactericidal {
                drug,
                concentration,
            } => base - drug.effect(*concentration) * load,
            DrugExposure::Bacteriostatic {
                drug,
                concentration,
            } => {
                let inhibition = drug.effect(*concentration);
                let effective_growth = growth * (1.0 - inhibition);
                let active_clearing = BACTERIOSTATIC_ACTIVE_CLEARING * inhibition * load;
                effective_growth - natural_death - suppression - active_clearing
            }
        }
    }

    /// Apply local kinetics to every infected cell, then clamp to `[0, Imax]`
    /// with sub-threshold loads snapped to zero.
    pub fn update(&mut self, defense: &Lattice, exposure: &DrugExposure) {
        let cap = self.carrying_capacity;
        for k in 0..self.current.as_slice().len() {
            let load = self.current.as_slice()[k];
            let new = if load <= 0.0 {
                load
            } else {
                let raw = load + self.kinetic_delta(load, defense.as_slice()[k], exposure);
                if raw < loads::NUMERICAL_EXTINCTION_THRESHOLD {
                    0.0
                } else if raw > cap {
                    cap
                } else {
                    raw
                }
            };
            self.next.as_mut_slice()[k] = new;
        }
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub fn mean(&self) -> f64 {
        self.current.mean()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.current
    }

    pub fn infected_cells(&self) -> usize {
        self.current.count_positive()
    }

    pub fn carrying_capacity(&self) -> f64 {
        self.carrying_capacity
    }
}
