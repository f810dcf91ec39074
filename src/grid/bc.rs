//! Boundary-condition fill (spec.md §3, §4.2). A `BcSet` is a pure
//! description of per-edge kinds plus an odd-reflection axis flag; `fill`
//! is the pure function of `(BcSet, CellArray)` that writes the ghost
//! region, grounded in `original_source/multigrid/multigrid.py`'s
//! `bcObject`/`fillBC` and `original_source/incompressible/simulation.py`'s
//! three `BCObject` constructions (`bc`, `bc_xodd`, `bc_yodd`).

use crate::error::ConfigError;
use crate::grid::{CellArray, Grid2D};

/// Per-edge boundary kind (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcKind {
    Periodic,
    ReflectEven,
    ReflectOdd,
    Dirichlet,
    Neumann,
    Outflow,
}

impl BcKind {
    /// Parse the `mesh.{x,y}{l,r}boundary` string values spec.md §6 lists.
    /// `reflect` without further qualification means "even"; the odd
    /// variant is only ever selected via `OddReflectAxis`, never spelled
    /// out as a distinct string, matching
    /// `original_source/incompressible/simulation.py`'s `odd_reflect_dir`
    /// parameter living alongside (not instead of) the plain `"reflect"`
    /// BC string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "periodic" => Ok(BcKind::Periodic),
            "reflect" => Ok(BcKind::ReflectEven),
            "dirichlet" => Ok(BcKind::Dirichlet),
            "neumann" => Ok(BcKind::Neumann),
            "outflow" => Ok(BcKind::Outflow),
            other => Err(ConfigError::UnknownBcKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Which axis (if any) gets odd reflection instead of even, for the
/// velocity component normal to a reflecting wall (spec.md §3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddReflectAxis {
    None,
    X,
    Y,
}

/// The four edge kinds plus the odd-reflection axis, fully describing how
/// to fill ghosts for one field (spec.md §3's "BCPolicy").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcSet {
    pub xlo: BcKind,
    pub xhi: BcKind,
    pub ylo: BcKind,
    pub yhi: BcKind,
    pub odd_reflect: OddReflectAxis,
}

impl BcSet {
    pub fn new(xlo: BcKind, xhi: BcKind, ylo: BcKind, yhi: BcKind) -> Self {
        BcSet {
            xlo,
            xhi,
            ylo,
            yhi,
            odd_reflect: OddReflectAxis::None,
        }
    }

    pub fn with_odd_reflect(mut self, axis: OddReflectAxis) -> Self {
        self.odd_reflect = axis;
        self
    }

    /// Derive the `BcSet` for the velocity component normal to `axis`:
    /// any plain `reflect` edge on that axis becomes `ReflectOdd` (a solid
    /// wall reflects the normal component with a sign flip, spec.md §4.2),
    /// while the orthogonal axis keeps even reflection. Grounded in
    /// `original_source/incompressible/simulation.py`'s separate
    /// `bc_xodd`/`bc_yodd` construction for `u`/`v` respectively.
    pub fn normal_component(&self, axis: OddReflectAxis) -> BcSet {
        let mut out = *self;
        out.odd_reflect = axis;
        match axis {
            OddReflectAxis::X => {
                if out.xlo == BcKind::ReflectEven {
                    out.xlo = BcKind::ReflectOdd;
                }
                if out.xhi == BcKind::ReflectEven {
                    out.xhi = BcKind::ReflectOdd;
                }
            }
            OddReflectAxis::Y => {
                if out.ylo == BcKind::ReflectEven {
                    out.ylo = BcKind::ReflectOdd;
                }
                if out.yhi == BcKind::ReflectEven {
                    out.yhi = BcKind::ReflectOdd;
                }
            }
            OddReflectAxis::None => {}
        }
        out
    }

    /// All four edges periodic, no odd reflection — the BCs the Projector
    /// always uses for phi/phi_MAC regardless of the flow grid's actual
    /// velocity BCs (spec.md §4.8, §9 open question).
    pub fn all_periodic() -> Self {
        BcSet::new(
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
            BcKind::Periodic,
        )
    }

    /// Validates spec.md §4.2's rule: periodic must be declared on both
    /// edges of an axis or neither.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let x_periodic = (self.xlo == BcKind::Periodic, self.xhi == BcKind::Periodic);
        if x_periodic.0 != x_periodic.1 {
            return Err(ConfigError::AsymmetricPeriodicBc { axis: "x" });
        }
        let y_periodic = (self.ylo == BcKind::Periodic, self.yhi == BcKind::Periodic);
        if y_periodic.0 != y_periodic.1 {
            return Err(ConfigError::AsymmetricPeriodicBc { axis: "y" });
        }
        Ok(())
    }
}

/// Populate `ng` ghost layers on all four edges of `field`, per spec.md
/// §4.2's rules. `reflect-odd` is only meaningful on the axis named by
/// `bc.odd_reflect`; the orthogonal axis (and scalar fields with
/// `odd_reflect = None`) use even reflection even if the edge kind is
/// `ReflectEven`/`Neumann` (the two are identical, spec.md §4.2).
pub fn fill(field: &mut CellArray, grid: &Grid2D, bc: &BcSet) {
    let ng = grid.ng;
    let (ilo, ihi, jlo, jhi) = (grid.ilo(), grid.ihi(), grid.jlo(), grid.jhi());

    // x-direction edges.
    let x_odd = bc.odd_reflect == OddReflectAxis::X;
    fill_x_edge(field, ilo, ihi, jlo, jhi, ng, bc.xlo, Edge::Lo, x_odd, field.qx());
    fill_x_edge(field, ilo, ihi, jlo, jhi, ng, bc.xhi, Edge::Hi, x_odd, field.qx());

    // y-direction edges.
    let y_odd = bc.odd_reflect == OddReflectAxis::Y;
    fill_y_edge(field, ilo, ihi, jlo, jhi, ng, bc.ylo, Edge::Lo, y_odd);
    fill_y_edge(field, ilo, ihi, jlo, jhi, ng, bc.yhi, Edge::Hi, y_odd);
}

#[derive(Clone, Copy)]
enum Edge {
    Lo,
    Hi,
}

#[allow(clippy::too_many_arguments)]
fn fill_x_edge(
    field: &mut CellArray,
    ilo: usize,
    ihi: usize,
    jlo: usize,
    jhi: usize,
    ng: usize,
    kind: BcKind,
    edge: Edge,
    odd: bool,
    _qx: usize,
) {
    for j in jlo..=jhi {
        for k in 0..ng {
            match edge {
                Edge::Lo => {
                    let ghost = ilo - 1 - k;
                    let value = match kind {
                        BcKind::Periodic => field.get(ihi - k, j),
                        BcKind::ReflectEven | BcKind::Neumann => field.get(ilo + k, j),
                        BcKind::ReflectOdd => {
                            let sign = if odd { -1.0 } else { 1.0 };
                            sign * field.get(ilo + k, j)
                        }
                        BcKind::Dirichlet => -field.get(ilo + k, j),
                        BcKind::Outflow => field.get(ilo, j),
                    };
                    field.set(ghost, j, value);
                }
                Edge::Hi => {
                    let ghost = ihi + 1 + k;
                    let value = match kind {
                        BcKind::Periodic => field.get(ilo + k, j),
                        BcKind::ReflectEven | BcKind::Neumann => field.get(ihi - k, j),
                        BcKind::ReflectOdd => {
                            let sign = if odd { -1.0 } else { 1.0 };
                            sign * field.get(ihi - k, j)
                        }
                        BcKind::Dirichlet => -field.get(ihi - k, j),
                        BcKind::Outflow => field.get(ihi, j),
                    };
                    field.set(ghost, j, value);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_y_edge(
    field: &mut CellArray,
    ilo: usize,
    ihi: usize,
    jlo: usize,
    jhi: usize,
    ng: usize,
    kind: BcKind,
    edge: Edge,
    odd: bool,
) {
    for i in ilo..=ihi {
        for k in 0..ng {
            match edge {
                Edge::Lo => {
                    let ghost = jlo - 1 - k;
                    let value = match kind {
                        BcKind::Periodic => field.get(i, jhi - k),
                        BcKind::ReflectEven | BcKind::Neumann => field.get(i, jlo + k),
                        BcKind::ReflectOdd => {
                            let sign = if odd { -1.0 } else { 1.0 };
                            sign * field.get(i, jlo + k)
                        }
                        BcKind::Dirichlet => -field.get(i, jlo + k),
                        BcKind::Outflow => field.get(i, jlo),
                    };
                    field.set(i, ghost, value);
                }
                Edge::Hi => {
                    let ghost = jhi + 1 + k;
                    let value = match kind {
                        BcKind::Periodic => field.get(i, jlo + k),
                        BcKind::ReflectEven | BcKind::Neumann => field.get(i, jhi - k),
                        BcKind::ReflectOdd => {
                            let sign = if odd { -1.0 } else { 1.0 };
                            sign * field.get(i, jhi - k)
                        }
                        BcKind::Dirichlet => -field.get(i, jhi - k),
                        BcKind::Outflow => field.get(i, jhi),
                    };
                    field.set(i, ghost, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid2D {
        Grid2D::new(4, 4, 2, 0.0, 1.0, 0.0, 1.0)
    }

    #[test]
    fn periodic_copies_opposite_edge() {
        let grid = grid();
        let mut f = grid.scratch_array();
        for idx in grid.interior_indices() {
            f.set_idx(idx, idx.x as f64);
        }
        let bc = BcSet::all_periodic();
        fill(&mut f, &grid, &bc);
        assert_eq!(f.get(grid.ilo() - 1, grid.jlo()), f.get(grid.ihi(), grid.jlo()));
        assert_eq!(f.get(grid.ihi() + 1, grid.jlo()), f.get(grid.ilo(), grid.jlo()));
    }

    #[test]
    fn odd_reflect_flips_sign() {
        let grid = grid();
        let mut f = grid.scratch_array();
        for idx in grid.interior_indices() {
            f.set_idx(idx, 3.0);
        }
        let bc = BcSet::new(
            BcKind::ReflectOdd,
            BcKind::ReflectOdd,
            BcKind::ReflectEven,
            BcKind::ReflectEven,
        )
        .with_odd_reflect(OddReflectAxis::X);
        fill(&mut f, &grid, &bc);
        assert_eq!(f.get(grid.ilo() - 1, grid.jlo()), -3.0);
        assert_eq!(f.get(grid.jlo(), grid.jlo() - 1), 3.0);
    }

    #[test]
    fn filling_twice_is_idempotent() {
        // spec.md P6: filling ghosts twice in succession is identical to
        // filling once.
        let grid = grid();
        let mut f = grid.scratch_array();
        for idx in grid.interior_indices() {
            f.set_idx(idx, (idx.x as f64) * 1.7 - (idx.y as f64));
        }
        let bc = BcSet::all_periodic();
        fill(&mut f, &grid, &bc);
        let once = f.clone();
        fill(&mut f, &grid, &bc);
        assert_eq!(f, once);
    }

    #[test]
    fn normal_component_turns_reflect_into_odd_on_matching_axis_only() {
        let bc = BcSet::new(BcKind::ReflectEven, BcKind::ReflectEven, BcKind::ReflectEven, BcKind::ReflectEven);
        let bc_u = bc.normal_component(OddReflectAxis::X);
        assert_eq!(bc_u.xlo, BcKind::ReflectOdd);
        assert_eq!(bc_u.xhi, BcKind::ReflectOdd);
        assert_eq!(bc_u.ylo, BcKind::ReflectEven);
        assert_eq!(bc_u.yhi, BcKind::ReflectEven);

        let grid = grid();
        let mut f = grid.scratch_array();
        for idx in grid.interior_indices() {
            f.set_idx(idx, 3.0);
        }
        fill(&mut f, &grid, &bc_u);
        assert_eq!(f.get(grid.ilo() - 1, grid.jlo()), -3.0);
        assert_eq!(f.get(grid.ilo(), grid.jlo() - 1), 3.0);
    }

    #[test]
    fn asymmetric_periodic_is_rejected() {
        let bc = BcSet::new(
            BcKind::Periodic,
            BcKind::Outflow,
            BcKind::Outflow,
            BcKind::Outflow,
        );
        assert!(bc.validate().is_err());
    }
}
