//! Square lattice of real-valued cells.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// An L×L grid of `f64`, stored row-major and indexed by `(row, col)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    size: usize,
    cells: Vec<f64>,
}

impl Lattice {
    /// All-zero lattice of dimension `size`.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    /// Lattice with every cell set to `value`.
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Dimension L.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.size + col] = value;
    }

    pub fn fill(&mut self, value: f64) {
        self.cells.fill(value);
    }

    /// Overwrite this lattice with the contents of `other` (same dimension).
    pub fn copy_from(&mut self, other: &Lattice) {
        debug_assert_eq!(self.size, other.size);
        self.cells.copy_from_slice(&other.cells);
    }

    /// Arithmetic mean over all L² cells.
    pub fn mean(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().sum::<f64>() / self.cells.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.cells.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.cells.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of cells with a strictly positive value.
    pub fn count_positive(&self) -> usize {
        self.cells.iter().filter(|&&v| v > 0.0).count()
    }

    /// Iterate `((row, col), value)` in row-major order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(k, &v)| ((k / size, k % size), v))
    }

    /// Raw row-major cell slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.cells
    }
}

impl Index<(usize, usize)> for Lattice {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.cells[row * self.size + col]
    }
}

impl IndexMut<(usize, usize)> for Lattice {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.cells[row * self.size + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_mean() {
        let mut lat = Lattice::zeros(4);
        assert_eq!(lat.mean(), 0.0);
        lat[(1, 2)] = 1.6;
        assert_eq!(lat.get(1, 2), 1.6);
        assert!((lat.mean() - 0.1).abs() < 1e-12);
        assert_eq!(lat.count_positive(), 1);
    }

    #[test]
    fn test_indexed_iter_is_row_major() {
        let mut lat = Lattice::zeros(3);
        lat.set(2, 0, 5.0);
        let found: Vec<_> = lat.indexed_iter().filter(|(_, v)| *v > 0.0).collect();
        assert_eq!(found, vec![((2, 0), 5.0)]);
        assert_eq!(lat.indexed_iter().nth(4).map(|(rc, _)| rc), Some((1, 1)));
    }

    #[test]
    fn test_min_max() {
        let mut lat = Lattice::filled(2, 0.5);
        lat[(0, 1)] = -1.0;
        lat[(1, 1)] = 2.0;
        assert_eq!(lat.min(), -1.0);
        assert_eq!(lat.max(), 2.0);
    }
}
