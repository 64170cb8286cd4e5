//! Lattice topology: neighbor lookup, the local signal and the saturation curve.
//!
//! Direct neighbor lookup wraps toroidally, but local signal aggregation stops
//! at the true lattice edge. The two deliberately differ: spread sees a torus,
//! callose induction sees a bounded sheet.

use serde::{Deserialize, Serialize};

use crate::constants::defense;
use crate::lattice::Lattice;

/// Neighbor and signal geometry of an L×L lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    grid_size: usize,
    signal_radius: usize,
}

impl Topology {
    pub fn new(grid_size: usize, signal_radius: usize) -> Self {
        assert!(grid_size > 0, "topology needs a non-empty grid");
        Self {
            grid_size,
            signal_radius,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn signal_radius(&self) -> usize {
        self.signal_radius
    }

    /// The four von Neumann neighbors of `(i, j)`, wrapped modulo L.
    ///
    /// Order is fixed: +row, -row, +col, -col.
    pub fn neighbors(&self, i: usize, j: usize) -> [(usize, usize); 4] {
        let l = self.grid_size;
        [
            ((i + 1) % l, j),
            ((i + l - 1) % l, j),
            (i, (j + 1) % l),
            (i, (j + l - 1) % l),
        ]
    }

    /// Mean of `field` over the Manhattan ball of radius R around `(i, j)`,
    /// clipped to the lattice bounds. Returns 0 when no cell qualifies.
    pub fn local_signal(&self, i: usize, j: usize, field: &Lattice) -> f64 {
        debug_assert_eq!(field.size(), self.grid_size);
        let r = self.signal_radius;
        let l = self.grid_size;

        let mut total = 0.0;
        let mut count = 0usize;
        for row in i.saturating_sub(r)..=(i + r).min(l - 1) {
            let reach = r - row.abs_diff(i);
            for col in j.saturating_sub(reach)..=(j + reach).min(l - 1) {
                total += field.get(row, col);
                count += 1;
            }
        }

        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Callose production response to the local infection signal at `(i, j)`.
    pub fn defense_response(&self, i: usize, j: usize, infection: &Lattice) -> f64 {
        hill(
            self.local_signal(i, j, infection),
            defense::SIGNAL_EC50,
            defense::HILL_COEFFICIENT,
        )
    }
}

/// Hill saturation `x^n / (x^n + ec50^n)`.
///
/// 0 at x = 0, 0.5 at x = ec50, approaching 1 as x grows.
pub fn hill(x: f64, ec50: f64, n: f64) -> f64 {
    let x_n = x.powf(n);
    let ec50_n = ec50.powf(n);
    let denom = x_n + ec50_n;
    if denom == 0.0 {
        return 0.0;
    }
    x_n / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_wrap_at_origin() {
        let topo = Topology::new(10, 2);
        let n = topo.neighbors(0, 0);
        assert_eq!(n, [(1, 0), (9, 0), (0, 1), (0, 9)]);
        assert!(n.contains(&(9, 0)));
        assert!(n.contains(&(0, 9)));
    }

    #[test]
    fn test_neighbors_wrap_at_far_corner() {
        let topo = Topology::new(5, 1);
        assert_eq!(topo.neighbors(4, 4), [(0, 4), (3, 4), (4, 0), (4, 3)]);
    }

    #[test]
    fn test_neighbors_on_single_cell_grid() {
        let topo = Topology::new(1, 0);
        assert_eq!(topo.neighbors(0, 0), [(0, 0); 4]);
    }

    #[test]
    fn test_local_signal_interior_counts_diamond() {
        // R = 1 interior ball has 5 cells
        let topo = Topology::new(5, 1);
        let mut field = Lattice::zeros(5);
        field[(2, 2)] = 1.0;
        assert!((topo.local_signal(2, 2, &field) - 0.2).abs() < 1e-12);
        // R = 2 interior ball has 13 cells
        let topo = Topology::new(5, 2);
        assert!((topo.local_signal(2, 2, &field) - 1.0 / 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_local_signal_clips_without_wrapping() {
        let topo = Topology::new(5, 1);
        let mut field = Lattice::zeros(5);
        // Would be a wrapped neighbor of (0, 0) on a torus
        field[(4, 0)] = 1.0;
        assert_eq!(topo.local_signal(0, 0, &field), 0.0);
        // Corner ball clipped to 3 cells
        field[(0, 0)] = 0.9;
        assert!((topo.local_signal(0, 0, &field) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_local_signal_radius_zero_is_cell_value() {
        let topo = Topology::new(3, 0);
        let mut field = Lattice::zeros(3);
        field[(1, 1)] = 0.7;
        assert_eq!(topo.local_signal(1, 1, &field), 0.7);
    }

    #[test]
    fn test_hill_shape() {
        assert_eq!(hill(0.0, 0.5, 2.0), 0.0);
        for n in [0.5, 1.0, 2.0, 4.0] {
            assert!((hill(0.5, 0.5, n) - 0.5).abs() < 1e-12);
        }
        assert!(hill(1e6, 0.5, 2.0) > 0.999_999);
        assert!(hill(1e6, 0.5, 2.0) <= 1.0);
    }

    #[test]
    fn test_hill_monotone() {
        let mut prev = 0.0;
        for k in 1..50 {
            let h = hill(k as f64 * 0.1, 1.0, 2.0);
            assert!(h > prev);
            prev = h;
        }
    }
}
