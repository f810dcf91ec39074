//! `CellArray`: an owning 2D scalar field with ghost cells (spec.md §3,
//! §4.1). Addressing follows the teacher's flat-`Vec` convention
//! (`index.x + dim.x * index.y`, see `Grid::cell` in the teacher's
//! `solver/grid.rs`), generalized from a `Vec<Cell>` of structs to a
//! `Vec<Scalar>` of bare values since our fields are single scalars rather
//! than bundles of velocity/pressure/smoke.

use crate::grid::Grid2D;
use crate::types::{Index2, Scalar};

#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    qx: usize,
    qy: usize,
    data: Vec<Scalar>,
}

impl CellArray {
    pub fn zeros(qx: usize, qy: usize) -> Self {
        CellArray {
            qx,
            qy,
            data: vec![0.0; qx * qy],
        }
    }

    pub fn qx(&self) -> usize {
        self.qx
    }

    pub fn qy(&self) -> usize {
        self.qy
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.qx && j < self.qy, "index ({i}, {j}) out of bounds");
        i + self.qx * j
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Scalar {
        self.data[self.offset(i, j)]
    }

    #[inline]
    pub fn get_idx(&self, idx: Index2) -> Scalar {
        self.get(idx.x, idx.y)
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: Scalar) {
        let o = self.offset(i, j);
        self.data[o] = value;
    }

    #[inline]
    pub fn set_idx(&mut self, idx: Index2, value: Scalar) {
        self.set(idx.x, idx.y, value);
    }

    #[inline]
    pub fn add_assign(&mut self, i: usize, j: usize, delta: Scalar) {
        let o = self.offset(i, j);
        self.data[o] += delta;
    }

    pub fn fill(&mut self, value: Scalar) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    pub fn zero(&mut self) {
        self.fill(0.0);
    }

    /// Deep copy of `other`'s contents into `self`. Both must share shape.
    pub fn clone_from_array(&mut self, other: &CellArray) {
        assert_eq!(self.qx, other.qx);
        assert_eq!(self.qy, other.qy);
        self.data.copy_from_slice(&other.data);
    }

    /// `self += other`, elementwise, over the full shape including ghosts.
    pub fn add_in_place(&mut self, other: &CellArray) {
        assert_eq!(self.qx, other.qx);
        assert_eq!(self.qy, other.qy);
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
    }

    /// `self -= scale * other`, elementwise, over the full shape including
    /// ghosts.
    pub fn sub_scaled_in_place(&mut self, scale: Scalar, other: &CellArray) {
        assert_eq!(self.qx, other.qx);
        assert_eq!(self.qy, other.qy);
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= scale * *b;
        }
    }

    /// L2 grid norm over interior cells only (spec.md §4.1):
    /// `‖r‖ = sqrt(dx*dy*sum(r^2))`.
    pub fn l2_norm(&self, grid: &Grid2D) -> Scalar {
        let mut acc = 0.0;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let v = self.get(i, j);
                acc += v * v;
            }
        }
        (grid.dx * grid.dy * acc).sqrt()
    }

    /// Max absolute value over interior cells, used by scenario assertions
    /// (spec.md §8, S1/S3/S4/S5/S6) that are phrased in terms of `max|...|`.
    pub fn max_abs_interior(&self, grid: &Grid2D) -> Scalar {
        let mut m: Scalar = 0.0;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                m = m.max(self.get(i, j).abs());
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut a = CellArray::zeros(4, 4);
        a.set(1, 2, 3.5);
        assert_eq!(a.get(1, 2), 3.5);
        assert_eq!(a.get(0, 0), 0.0);
    }

    #[test]
    fn l2_norm_of_constant_field() {
        let grid = Grid2D::new(4, 4, 1, 0.0, 1.0, 0.0, 1.0);
        let mut a = grid.scratch_array();
        for idx in grid.interior_indices() {
            a.set_idx(idx, 2.0);
        }
        let norm = a.l2_norm(&grid);
        // dx = dy = 0.25, 16 interior cells each contributing 4.0
        let expected = (0.25 * 0.25 * 16.0 * 4.0 as Scalar).sqrt();
        assert!((norm - expected).abs() < 1e-12);
    }
}
