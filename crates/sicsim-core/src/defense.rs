//! Callose field: host defense concentration per lattice cell.
//!
//! Callose decays uniformly and is induced in healthy cells bordering
//! infected ones, in proportion to a saturating response to the local
//! infection signal. Production never lands inside infected territory.

use sicsim_logic::lattice::Lattice;
use sicsim_logic::params::Params;
use sicsim_logic::topology::Topology;

/// Callose lattice with its double buffer.
#[derive(Debug, Clone)]
pub struct DefenseField {
    current: Lattice,
    next: Lattice,
    /// Per-update memo of the signal response, indexed row-major.
    response_cache: Vec<Option<f64>>,
    production: f64,
    decay: f64,
    limit: f64,
}

impl DefenseField {
    pub fn new(params: &Params) -> Self {
        let l = params.grid_size;
        Self {
            current: Lattice::zeros(l),
            next: Lattice::zeros(l),
            response_cache: vec![None; l * l],
            production: params.defense_production,
            decay: params.defense_decay,
            limit: params.defense_limit,
        }
    }

    pub fn reset(&mut self) {
        self.current.fill(0.0);
        self.next.fill(0.0);
    }

    /// Overwrite a single cell's concentration, for custom initial conditions.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.current.set(row, col, value);
    }

    /// Advance one step against the infection lattice of this step (after
    /// spread and kinetics).
    ///
    /// Decay is applied first, then each healthy neighbor of each infected
    /// cell gains `alpha_c * hill(local_signal)`, once per infected neighbor.
    /// The result is clamped to `[0, Climit]`.
    pub fn update(&mut self, infection: &Lattice, topology: &Topology) {
        let l = self.current.size();
        debug_assert_eq!(infection.size(), l);

        for (new, &old) in self
            .next
            .as_mut_slice()
            .iter_mut()
            .zip(self.current.as_slice())
        {
            *new = old - self.decay * old;
        }

        self.response_cache.fill(None);
        for i in 0..l {
            for j in 0..l {
                if infection.get(i, j) <= 0.0 {
                    continue;
                }
                for (ni, nj) in topology.neighbors(i, j) {
                    if infection.get(ni, nj) != 0.0 {
                        continue;
                    }
                    let k = ni * l + nj;
                    let response = *self.response_cache[k]
                        .get_or_insert_with(|| topology.defense_response(ni, nj, infection));
                    self.next.as_mut_slice()[k] += self.production * response;
                }
            }
        }

        let limit = self.limit;
        for c in self.next.as_mut_slice() {
            *c = c.clamp(0.0, limit);
        }
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub fn mean(&self) -> f64 {
        self.current.mean()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.current
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicsim_logic::topology::hill;

    fn params(decay: f64) -> Params {
        Params {
            grid_size: 6,
            signal_radius: 1,
            defense_decay: decay,
            ..Default::default()
        }
    }

    #[test]
    fn test_uniform_decay() {
        let p = params(0.1);
        let topo = Topology::new(6, 1);
        let mut field = DefenseField::new(&p);
        field.set(2, 2, 0.5);
        field.update(&Lattice::zeros(6), &topo);
        assert!((field.lattice().get(2, 2) - 0.45).abs() < 1e-12);
        assert_eq!(field.lattice().get(0, 0), 0.0);
    }

    #[test]
    fn test_production_only_in_healthy_neighbors() {
        let p = params(0.0);
        let topo = Topology::new(6, 1);
        let mut field = DefenseField::new(&p);
        let mut infection = Lattice::zeros(6);
        infection.set(2, 2, 1.0);
        infection.set(2, 3, 1.0);

        field.update(&infection, &topo);

        assert_eq!(field.lattice().get(2, 2), 0.0);
        assert_eq!(field.lattice().get(2, 3), 0.0);
        assert!(field.lattice().get(1, 2) > 0.0);
        assert!(field.lattice().get(2, 4) > 0.0);
        // Not adjacent to any infected cell
        assert_eq!(field.lattice().get(5, 5), 0.0);
    }

    #[test]
    fn test_production_matches_signal_response() {
        let p = params(0.0);
        let topo = Topology::new(6, 1);
        let mut field = DefenseField::new(&p);
        let mut infection = Lattice::zeros(6);
        infection.set(3, 3, 1.0);

        field.update(&infection, &topo);

        // (4, 3) has a 5-cell ball containing one infected cell
        let expected = 0.6 * hill(0.2, 0.5, 2.0);
        assert!((field.lattice().get(4, 3) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_production_accumulates_per_infected_neighbor() {
        let p = params(0.0);
        let topo = Topology::new(6, 1);
        let mut field = DefenseField::new(&p);
        let mut infection = Lattice::zeros(6);
        // (2, 2) borders both
        infection.set(1, 2, 1.0);
        infection.set(3, 2, 1.0);

        field.update(&infection, &topo);

        let once = 0.6 * hill(0.4, 0.5, 2.0);
        assert!((field.lattice().get(2, 2) - 2.0 * once).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_to_limit() {
        let p = Params {
            defense_production: 50.0,
            ..params(0.0)
        };
        let topo = Topology::new(6, 1);
        let mut field = DefenseField::new(&p);
        let mut infection = Lattice::zeros(6);
        infection.set(0, 0, 1.0);

        field.update(&infection, &topo);

        assert_eq!(field.limit(), p.defense_limit);
        assert_eq!(field.lattice().max(), field.limit());
        assert!(field.lattice().min() >= 0.0);
    }

    #[test]
    fn test_reset_zeroes() {
        let p = params(0.0);
        let mut field = DefenseField::new(&p);
        field.set(1, 1, 0.4);
        field.reset();
        assert_eq!(field.mean(), 0.0);
    }
}
