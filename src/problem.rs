//! Problem initializers (spec.md §6, §9's note on replacing
//! `original_source/incompressible/simulation.py`'s string-dispatched
//! `problem_name` with static types). Each `Problem` only ever writes
//! interior cells of the flow state; `TimeStepper::initialize` fills
//! ghosts afterward.

use crate::config::ConfigSource;
use crate::error::SolverError;
use crate::grid::Grid2D;
use crate::timestepper::FlowState;
use crate::types::Scalar;

pub trait Problem {
    fn init_data(&self, flow: &mut FlowState, grid: &Grid2D, cfg: &dyn ConfigSource) -> Result<(), SolverError>;

    /// Hook for a problem to report closing diagnostics (spec.md §6); most
    /// problems have nothing to say.
    fn finalize(&self) {}
}

/// spec.md S3: `u = sin(2*pi*y)`, `v = 0` -- already solenoidal, so
/// `preevolve`'s initial projection should be close to a no-op.
pub struct SolenoidalShear;

impl Problem for SolenoidalShear {
    fn init_data(&self, flow: &mut FlowState, grid: &Grid2D, _cfg: &dyn ConfigSource) -> Result<(), SolverError> {
        for j in grid.jlo()..=grid.jhi() {
            let y = grid.y(j);
            let u = (2.0 * std::f64::consts::PI * y).sin();
            for i in grid.ilo()..=grid.ihi() {
                flow.u.set(i, j, u);
                flow.v.set(i, j, 0.0);
            }
        }
        Ok(())
    }
}

/// spec.md S4: the Taylor-Green vortex, `u = -cos(pi x) sin(pi y)`,
/// `v = sin(pi x) cos(pi y)`, a classical decaying-vortex manufactured
/// solution used to bound energy drift and divergence growth.
pub struct TaylorGreen;

impl Problem for TaylorGreen {
    fn init_data(&self, flow: &mut FlowState, grid: &Grid2D, _cfg: &dyn ConfigSource) -> Result<(), SolverError> {
        for j in grid.jlo()..=grid.jhi() {
            let y = grid.y(j);
            for i in grid.ilo()..=grid.ihi() {
                let x = grid.x(i);
                let u = -(std::f64::consts::PI * x).cos() * (std::f64::consts::PI * y).sin();
                let v = (std::f64::consts::PI * x).sin() * (std::f64::consts::PI * y).cos();
                flow.u.set(i, j, u);
                flow.v.set(i, j, v);
            }
        }
        Ok(())
    }
}

/// spec.md S5: `u = tanh(30*(1/4 - |y - 1/2|))`, `v = 0.05*sin(2*pi*x)` on
/// nx=64, doubly periodic -- a thin shear layer with a small transverse
/// perturbation, used to check the solver keeps the layer stable over a
/// short horizon rather than blowing up.
pub struct ShearLayer;

impl Problem for ShearLayer {
    fn init_data(&self, flow: &mut FlowState, grid: &Grid2D, _cfg: &dyn ConfigSource) -> Result<(), SolverError> {
        for j in grid.jlo()..=grid.jhi() {
            let y = grid.y(j);
            let u = (30.0 * (0.25 - (y - 0.5).abs())).tanh();
            for i in grid.ilo()..=grid.ihi() {
                let x = grid.x(i);
                let v = 0.05 * (2.0 * std::f64::consts::PI * x).sin();
                flow.u.set(i, j, u);
                flow.v.set(i, j, v);
            }
        }
        Ok(())
    }
}

/// spec.md S6: `u = sin(pi*x)*sin(pi*y)`, `v = 0` on a 16x16 x-reflect /
/// y-periodic grid -- checks that one evolve step preserves the
/// odd-reflection of `u` (the normal component) at the x walls.
pub struct SolidWallReflection;

impl Problem for SolidWallReflection {
    fn init_data(&self, flow: &mut FlowState, grid: &Grid2D, _cfg: &dyn ConfigSource) -> Result<(), SolverError> {
        for j in grid.jlo()..=grid.jhi() {
            let y = grid.y(j);
            for i in grid.ilo()..=grid.ihi() {
                let x = grid.x(i);
                let u = (std::f64::consts::PI * x).sin() * (std::f64::consts::PI * y).sin();
                flow.u.set(i, j, u);
                flow.v.set(i, j, 0.0);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn taylor_green_is_divergence_free_at_init() {
        let grid = Grid2D::new(16, 16, 4, 0.0, 2.0, 0.0, 2.0);
        let mut flow = FlowState {
            u: grid.scratch_array(),
            v: grid.scratch_array(),
            phi: grid.scratch_array(),
            phi_mac: grid.scratch_array(),
            gradp_x: grid.scratch_array(),
            gradp_y: grid.scratch_array(),
            t: 0.0,
            n: 0,
        };
        let cfg = MapConfig::new();
        TaylorGreen.init_data(&mut flow, &grid, &cfg).unwrap();

        crate::grid::bc::fill(&mut flow.u, &grid, &crate::grid::bc::BcSet::all_periodic());
        crate::grid::bc::fill(&mut flow.v, &grid, &crate::grid::bc::BcSet::all_periodic());

        let mut max_div: Scalar = 0.0;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let d = 0.5 * (flow.u.get(i + 1, j) - flow.u.get(i - 1, j)) / grid.dx
                    + 0.5 * (flow.v.get(i, j + 1) - flow.v.get(i, j - 1)) / grid.dy;
                max_div = max_div.max(d.abs());
            }
        }
        assert!(max_div < 1e-1, "max div {max_div} unexpectedly large for a smooth field");
    }
}
