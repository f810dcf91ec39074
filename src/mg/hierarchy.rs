//! `MGHierarchy`: the pyramid of levels a V-cycle walks (spec.md §3, §4.3).
//! A straightforward owning `Vec` indexed by level, no cyclic references,
//! per spec.md §9's design notes.

use crate::error::ConfigError;
use crate::grid::bc::BcSet;
use crate::grid::{CellArray, Grid2D};
use crate::types::Scalar;

/// One level of the hierarchy: a grid plus the solution (`v`), right-hand
/// side (`f`) and residual (`r`) living on it (spec.md §3).
pub struct MgLevel {
    pub grid: Grid2D,
    pub v: CellArray,
    pub f: CellArray,
    pub r: CellArray,
}

impl MgLevel {
    fn new(grid: Grid2D) -> Self {
        let v = grid.scratch_array();
        let f = grid.scratch_array();
        let r = grid.scratch_array();
        MgLevel { grid, v, f, r }
    }
}

/// Ordered levels, index 0 = coarsest (1x1 interior), index `L-1` =
/// finest (`nx x nx` interior). `BcSet` is shared across `v`, `f`, `r`
/// within the hierarchy (spec.md §3).
pub struct MgHierarchy {
    pub levels: Vec<MgLevel>,
    pub bc: BcSet,
}

impl MgHierarchy {
    /// Build `L = log2(nx) + 1` levels with interior sizes `1, 2, 4, ...,
    /// nx`. Fails per spec.md §4.3 if `nx != ny`, the domain isn't square,
    /// or `nx` isn't a power of two.
    pub fn new(
        nx: usize,
        ny: usize,
        xmin: Scalar,
        xmax: Scalar,
        ymin: Scalar,
        ymax: Scalar,
        bc: BcSet,
    ) -> Result<Self, ConfigError> {
        if nx != ny {
            return Err(ConfigError::NonSquareResolution { nx, ny });
        }
        if !nx.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { nx });
        }
        let width = xmax - xmin;
        let height = ymax - ymin;
        if (width - height).abs() > 1e-12 * width.abs().max(height.abs()).max(1.0) {
            return Err(ConfigError::NonSquareDomain { width, height });
        }
        bc.validate()?;

        let nlevels = (nx as f64).log2().round() as usize + 1;
        let mut levels = Vec::with_capacity(nlevels);
        let mut n = 1usize;
        for _ in 0..nlevels {
            let grid = Grid2D::new(n, n, 1, xmin, xmax, ymin, ymax);
            levels.push(MgLevel::new(grid));
            n *= 2;
        }

        Ok(MgHierarchy { levels, bc })
    }

    pub fn nlevels(&self) -> usize {
        self.levels.len()
    }

    pub fn finest(&self) -> usize {
        self.nlevels() - 1
    }

    pub fn finest_grid(&self) -> Grid2D {
        self.levels[self.finest()].grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::bc::BcKind;

    #[test]
    fn builds_expected_level_count() {
        let bc = BcSet::new(
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
        );
        let h = MgHierarchy::new(32, 32, 0.0, 1.0, 0.0, 1.0, bc).unwrap();
        // nlevels = log2(32) + 1 = 6, interior sizes 1,2,4,8,16,32
        assert_eq!(h.nlevels(), 6);
        assert_eq!(h.levels[0].grid.nx, 1);
        assert_eq!(h.levels[h.finest()].grid.nx, 32);
    }

    #[test]
    fn rejects_non_power_of_two() {
        let bc = BcSet::new(
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
        );
        assert!(MgHierarchy::new(24, 24, 0.0, 1.0, 0.0, 1.0, bc).is_err());
    }

    #[test]
    fn rejects_non_square_resolution() {
        let bc = BcSet::new(
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
        );
        assert!(MgHierarchy::new(16, 32, 0.0, 1.0, 0.0, 1.0, bc).is_err());
    }
}
