//! Advector collaborator (spec.md §4.9, §6): MAC velocity prediction and
//! final upwind edge states. spec.md explicitly scopes `mac_vels`/`states`
//! as "black-box transverse-predictor kernels" supplied externally, and
//! `original_source/` ships only the caller
//! (`incompressible/simulation.py`) and the multigrid module, not the
//! Fortran/C kernels themselves or the `reconstruction_f` slope module.
//! `UpwindGodunovAdvector` is a from-scratch but standard piecewise-linear
//! Godunov reconstruction (trace to the face, upwind by the normal
//! velocity's sign) built to match the call sites in
//! `original_source/incompressible/simulation.py` exactly, so
//! `TimeStepper` has a real collaborator to drive scenarios S3-S6.

use crate::config::LimiterKind;
use crate::grid::{CellArray, Grid2D};
use crate::types::Scalar;

/// Edge-direction for slope computation (spec.md §4.9: "dir=1 x, dir=2 y").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    X,
    Y,
}

/// Limited slope of `field` in direction `dir`, selected by
/// `incompressible.limiter` (spec.md §4.9, §6). Requires `grid.ng >= 4` so
/// the widest (fourth-order) stencil stays in bounds one cell past the
/// interior on each side; this is exactly the flow grid's ghost width
/// (spec.md §3).
pub fn limited_slope(field: &CellArray, grid: &Grid2D, dir: Dir, limiter: LimiterKind) -> CellArray {
    let mut out = grid.scratch_array();
    match dir {
        Dir::X => {
            for j in grid.jlo()..=grid.jhi() {
                for i in (grid.ilo() - 1)..=(grid.ihi() + 1) {
                    let slope = slope_1d(|k: i64| field.get((i as i64 + k) as usize, j), limiter);
                    out.set(i, j, slope);
                }
            }
        }
        Dir::Y => {
            for i in grid.ilo()..=grid.ihi() {
                for j in (grid.jlo() - 1)..=(grid.jhi() + 1) {
                    let slope = slope_1d(|k: i64| field.get(i, (j as i64 + k) as usize), limiter);
                    out.set(i, j, slope);
                }
            }
        }
    }
    out
}

/// Shared 1D limiter core: `get(k)` returns the field value `k` cells away
/// from the point being reconstructed (`k` in `-2..=2`).
fn slope_1d(get: impl Fn(i64) -> Scalar, limiter: LimiterKind) -> Scalar {
    let fm1 = get(-1);
    let f0 = get(0);
    let fp1 = get(1);

    match limiter {
        LimiterKind::NoLimit => 0.5 * (fp1 - fm1),
        LimiterKind::SecondOrder => minmod_central(fm1, f0, fp1),
        LimiterKind::FourthOrder => {
            let fm2 = get(-2);
            let fp2 = get(2);
            let slope4 = (2.0 / 3.0) * (fp1 - fm1) - (1.0 / 12.0) * (fp2 - fm2);
            let dl = f0 - fm1;
            let dr = fp1 - f0;
            if dl * dr <= 0.0 {
                0.0
            } else {
                slope4.signum() * slope4.abs().min(2.0 * dl.abs()).min(2.0 * dr.abs())
            }
        }
    }
}

fn minmod_central(fm1: Scalar, f0: Scalar, fp1: Scalar) -> Scalar {
    let dl = f0 - fm1;
    let dr = fp1 - f0;
    if dl * dr <= 0.0 {
        0.0
    } else {
        let dc = 0.5 * (dl + dr);
        dc.signum() * dc.abs().min(2.0 * dl.abs()).min(2.0 * dr.abs())
    }
}

/// Left/right trace of a scalar to a face, plus a source term contribution
/// (pressure gradient or transverse advection), and the upwind pick given
/// a normal velocity. This is the Bell-Colella-Glaz trace-and-upwind step
/// spec.md §2 names, applied to one face at a time.
fn trace_and_upwind(left: Scalar, right: Scalar, normal_vel: Scalar) -> Scalar {
    if normal_vel > 0.0 {
        left
    } else if normal_vel < 0.0 {
        right
    } else {
        0.5 * (left + right)
    }
}

/// The two black-box kernels of spec.md §4.9.
pub trait Advector {
    #[allow(clippy::too_many_arguments)]
    fn mac_vels(
        &self,
        grid: &Grid2D,
        dt: Scalar,
        u: &CellArray,
        v: &CellArray,
        ldelta_ux: &CellArray,
        ldelta_uy: &CellArray,
        ldelta_vx: &CellArray,
        ldelta_vy: &CellArray,
        gradp_x: &CellArray,
        gradp_y: &CellArray,
    ) -> (CellArray, CellArray);

    #[allow(clippy::too_many_arguments)]
    fn states(
        &self,
        grid: &Grid2D,
        dt: Scalar,
        u: &CellArray,
        v: &CellArray,
        ldelta_ux: &CellArray,
        ldelta_uy: &CellArray,
        ldelta_vx: &CellArray,
        ldelta_vy: &CellArray,
        gradp_x: &CellArray,
        gradp_y: &CellArray,
        u_mac: &CellArray,
        v_mac: &CellArray,
    ) -> (CellArray, CellArray, CellArray, CellArray);
}

/// Single concrete `Advector`: unsplit piecewise-linear Godunov tracing
/// with a transverse correction, upwinding on the normal velocity's sign.
pub struct UpwindGodunovAdvector;

impl Advector for UpwindGodunovAdvector {
    fn mac_vels(
        &self,
        grid: &Grid2D,
        dt: Scalar,
        u: &CellArray,
        v: &CellArray,
        ldelta_ux: &CellArray,
        ldelta_uy: &CellArray,
        ldelta_vx: &CellArray,
        ldelta_vy: &CellArray,
        gradp_x: &CellArray,
        gradp_y: &CellArray,
    ) -> (CellArray, CellArray) {
        let mut u_mac = grid.scratch_array();
        let mut v_mac = grid.scratch_array();
        let dtdx = dt / grid.dx;
        let dtdy = dt / grid.dy;

        // u on x-faces i-1/2 .. i+1/2 for each interior cell.
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=(grid.ihi() + 1) {
                let left = u.get(i - 1, j) + 0.5 * (1.0 - dtdx * u.get(i - 1, j)) * ldelta_ux.get(i - 1, j)
                    - 0.5 * dt * gradp_x.get(i - 1, j);
                let right = u.get(i, j) - 0.5 * (1.0 + dtdx * u.get(i, j)) * ldelta_ux.get(i, j)
                    - 0.5 * dt * gradp_x.get(i, j);
                let value = trace_and_upwind(left, right, 0.5 * (left + right));
                u_mac.set(i, j, value);
            }
        }

        // v on y-faces j-1/2 .. j+1/2 for each interior cell.
        for i in grid.ilo()..=grid.ihi() {
            for j in grid.jlo()..=(grid.jhi() + 1) {
                let left = v.get(i, j - 1) + 0.5 * (1.0 - dtdy * v.get(i, j - 1)) * ldelta_vy.get(i, j - 1)
                    - 0.5 * dt * gradp_y.get(i, j - 1);
                let right = v.get(i, j) - 0.5 * (1.0 + dtdy * v.get(i, j)) * ldelta_vy.get(i, j)
                    - 0.5 * dt * gradp_y.get(i, j);
                let value = trace_and_upwind(left, right, 0.5 * (left + right));
                v_mac.set(i, j, value);
            }
        }

        let _ = (ldelta_uy, ldelta_vx);
        (u_mac, v_mac)
    }

    fn states(
        &self,
        grid: &Grid2D,
        dt: Scalar,
        u: &CellArray,
        v: &CellArray,
        ldelta_ux: &CellArray,
        ldelta_uy: &CellArray,
        ldelta_vx: &CellArray,
        ldelta_vy: &CellArray,
        gradp_x: &CellArray,
        gradp_y: &CellArray,
        u_mac: &CellArray,
        v_mac: &CellArray,
    ) -> (CellArray, CellArray, CellArray, CellArray) {
        let mut u_xint = grid.scratch_array();
        let mut v_xint = grid.scratch_array();
        let mut u_yint = grid.scratch_array();
        let mut v_yint = grid.scratch_array();

        let dtdx = dt / grid.dx;
        let dtdy = dt / grid.dy;

        // x-faces: u (normal component) and v (transverse component).
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=(grid.ihi() + 1) {
                let v_avg_m = 0.5 * (v_mac.get(i - 1, j) + v_mac.get(i - 1, j + 1));
                let v_avg_p = 0.5 * (v_mac.get(i, j) + v_mac.get(i, j + 1));

                let u_left = u.get(i - 1, j)
                    + 0.5 * (1.0 - dtdx * u.get(i - 1, j)) * ldelta_ux.get(i - 1, j)
                    - 0.5 * dtdy * v_avg_m * ldelta_uy.get(i - 1, j)
                    - 0.5 * dt * gradp_x.get(i - 1, j);
                let u_right = u.get(i, j)
                    - 0.5 * (1.0 + dtdx * u.get(i, j)) * ldelta_ux.get(i, j)
                    - 0.5 * dtdy * v_avg_p * ldelta_uy.get(i, j)
                    - 0.5 * dt * gradp_x.get(i, j);
                u_xint.set(i, j, trace_and_upwind(u_left, u_right, u_mac.get(i, j)));

                let v_left = v.get(i - 1, j) + 0.5 * (1.0 - dtdx * u.get(i - 1, j)) * ldelta_vx.get(i - 1, j);
                let v_right = v.get(i, j) - 0.5 * (1.0 + dtdx * u.get(i, j)) * ldelta_vx.get(i, j);
                v_xint.set(i, j, trace_and_upwind(v_left, v_right, u_mac.get(i, j)));
            }
        }

        // y-faces: v (normal component) and u (transverse component).
        for i in grid.ilo()..=grid.ihi() {
            for j in grid.jlo()..=(grid.jhi() + 1) {
                let u_avg_m = 0.5 * (u_mac.get(i, j - 1) + u_mac.get(i + 1, j - 1));
                let u_avg_p = 0.5 * (u_mac.get(i, j) + u_mac.get(i + 1, j));

                let v_left = v.get(i, j - 1)
                    + 0.5 * (1.0 - dtdy * v.get(i, j - 1)) * ldelta_vy.get(i, j - 1)
                    - 0.5 * dtdx * u_avg_m * ldelta_vx.get(i, j - 1)
                    - 0.5 * dt * gradp_y.get(i, j - 1);
                let v_right = v.get(i, j)
                    - 0.5 * (1.0 + dtdy * v.get(i, j)) * ldelta_vy.get(i, j)
                    - 0.5 * dtdx * u_avg_p * ldelta_vx.get(i, j)
                    - 0.5 * dt * gradp_y.get(i, j);
                v_yint.set(i, j, trace_and_upwind(v_left, v_right, v_mac.get(i, j)));

                let u_left = u.get(i, j - 1) + 0.5 * (1.0 - dtdy * v.get(i, j - 1)) * ldelta_uy.get(i, j - 1);
                let u_right = u.get(i, j) - 0.5 * (1.0 + dtdy * v.get(i, j)) * ldelta_uy.get(i, j);
                u_yint.set(i, j, trace_and_upwind(u_left, u_right, v_mac.get(i, j)));
            }
        }

        (u_xint, v_xint, u_yint, v_yint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::bc::{fill, BcSet};

    #[test]
    fn nolimit_slope_is_centered_difference() {
        let grid = Grid2D::new(4, 4, 2, 0.0, 1.0, 0.0, 1.0);
        let mut f = grid.scratch_array();
        for idx in grid.interior_indices() {
            f.set_idx(idx, idx.x as f64 * 2.0);
        }
        fill(&mut f, &grid, &BcSet::all_periodic());
        let slopes = limited_slope(&f, &grid, Dir::X, LimiterKind::NoLimit);
        assert!((slopes.get(grid.ilo() + 1, grid.jlo()) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn minmod_zero_at_local_extremum() {
        let grid = Grid2D::new(4, 4, 2, 0.0, 1.0, 0.0, 1.0);
        let mut f = grid.scratch_array();
        let ilo = grid.ilo();
        for j in grid.jlo()..=grid.jhi() {
            f.set(ilo, j, 0.0);
            f.set(ilo + 1, j, 5.0);
            f.set(ilo + 2, j, 0.0);
            f.set(ilo + 3, j, 0.0);
        }
        fill(&mut f, &grid, &BcSet::all_periodic());
        let slopes = limited_slope(&f, &grid, Dir::X, LimiterKind::SecondOrder);
        assert_eq!(slopes.get(ilo + 1, grid.jlo()), 0.0);
    }
}
