//! Grid geometry and the cell-centered scalar field it backs (spec.md §3,
//! §4.1).

pub mod bc;
pub mod cell_array;

pub use cell_array::CellArray;

use crate::types::{Index2, Scalar};

/// Cell-centered grid geometry: extents, spacing, ghost width and the
/// interior index range they imply. Every `CellArray` on this grid shares
/// this shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid2D {
    pub nx: usize,
    pub ny: usize,
    pub ng: usize,

    pub xmin: Scalar,
    pub xmax: Scalar,
    pub ymin: Scalar,
    pub ymax: Scalar,

    pub dx: Scalar,
    pub dy: Scalar,
}

impl Grid2D {
    pub fn new(
        nx: usize,
        ny: usize,
        ng: usize,
        xmin: Scalar,
        xmax: Scalar,
        ymin: Scalar,
        ymax: Scalar,
    ) -> Self {
        let dx = (xmax - xmin) / nx as Scalar;
        let dy = (ymax - ymin) / ny as Scalar;
        Grid2D {
            nx,
            ny,
            ng,
            xmin,
            xmax,
            ymin,
            ymax,
            dx,
            dy,
        }
    }

    /// Total extent including ghosts along x (spec.md §3's `qx`).
    pub fn qx(&self) -> usize {
        self.nx + 2 * self.ng
    }

    /// Total extent including ghosts along y (spec.md §3's `qy`).
    pub fn qy(&self) -> usize {
        self.ny + 2 * self.ng
    }

    pub fn ilo(&self) -> usize {
        self.ng
    }

    pub fn ihi(&self) -> usize {
        self.ng + self.nx - 1
    }

    pub fn jlo(&self) -> usize {
        self.ng
    }

    pub fn jhi(&self) -> usize {
        self.ng + self.ny - 1
    }

    /// x-coordinate of the center of interior-relative cell `i`.
    pub fn x(&self, i: usize) -> Scalar {
        self.xmin + (i as Scalar - self.ng as Scalar + 0.5) * self.dx
    }

    /// y-coordinate of the center of interior-relative cell `j`.
    pub fn y(&self, j: usize) -> Scalar {
        self.ymin + (j as Scalar - self.ng as Scalar + 0.5) * self.dy
    }

    /// A fresh zeroed field matching this grid's shape (spec.md §4.1).
    pub fn scratch_array(&self) -> CellArray {
        CellArray::zeros(self.qx(), self.qy())
    }

    /// Iterate interior `(i, j)` index pairs in row-major (j outer, i inner
    /// varies fastest... here i outer to match the teacher's
    /// `GridIndexIterator`, which advances `x` before `y`).
    pub fn interior_indices(&self) -> impl Iterator<Item = Index2> + '_ {
        let (ilo, ihi, jlo, jhi) = (self.ilo(), self.ihi(), self.jlo(), self.jhi());
        (jlo..=jhi).flat_map(move |j| (ilo..=ihi).map(move |i| Index2::new(i, j)))
    }

    /// Derive a coarser grid with half the interior resolution and twice
    /// the spacing, same physical extents and ghost width (spec.md §3's
    /// `MGHierarchy` invariant).
    pub fn coarsened(&self) -> Grid2D {
        Grid2D::new(
            self.nx / 2,
            self.ny / 2,
            self.ng,
            self.xmin,
            self.xmax,
            self.ymin,
            self.ymax,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qx_qy_and_interior_range() {
        let g = Grid2D::new(8, 8, 4, 0.0, 1.0, 0.0, 1.0);
        assert_eq!(g.qx(), 16);
        assert_eq!(g.ilo(), 4);
        assert_eq!(g.ihi(), 11);
        assert_eq!(g.dx, 0.125);
    }

    #[test]
    fn interior_indices_count_matches_nx_ny() {
        let g = Grid2D::new(4, 3, 1, 0.0, 1.0, 0.0, 1.0);
        assert_eq!(g.interior_indices().count(), 12);
    }
}
