//! `TimeStepper`: the projection-method orchestrator (spec.md §4.10),
//! grounded in `original_source/incompressible/simulation.py`'s
//! `Simulation` class (`initialize`/`timestep`/`preevolve`/`evolve`).

use crate::advect::{limited_slope, Advector, Dir};
use crate::config::{ConfigSource, LimiterKind, ProjType};
use crate::error::SolverError;
use crate::grid::bc::{fill, BcKind, BcSet, OddReflectAxis};
use crate::grid::{CellArray, Grid2D};
use crate::log::{debug, info, Logger};
use crate::problem::Problem;
use crate::projector::{final_projection, mac_projection};
use crate::types::Scalar;

/// The owned flow state (spec.md §3): velocity components, the two
/// pressure-like potentials, the persisted pressure gradient, and time.
pub struct FlowState {
    pub u: CellArray,
    pub v: CellArray,
    pub phi: CellArray,
    pub phi_mac: CellArray,
    pub gradp_x: CellArray,
    pub gradp_y: CellArray,
    pub t: Scalar,
    pub n: u64,
}

impl FlowState {
    fn zeros(grid: &Grid2D) -> Self {
        FlowState {
            u: grid.scratch_array(),
            v: grid.scratch_array(),
            phi: grid.scratch_array(),
            phi_mac: grid.scratch_array(),
            gradp_x: grid.scratch_array(),
            gradp_y: grid.scratch_array(),
            t: 0.0,
            n: 0,
        }
    }

    /// Deep copy of every owned field (spec.md §9: "no shared mutable
    /// aliasing"), used by `preevolve` to snapshot/restore around the
    /// throwaway evolve step.
    fn clone_deep(&self) -> Self {
        FlowState {
            u: self.u.clone(),
            v: self.v.clone(),
            phi: self.phi.clone(),
            phi_mac: self.phi_mac.clone(),
            gradp_x: self.gradp_x.clone(),
            gradp_y: self.gradp_y.clone(),
            t: self.t,
            n: self.n,
        }
    }
}

/// spec.md §4.10's state machine: `initialized -> pre-evolved -> evolving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Initialized,
    PreEvolved,
    Evolving,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Uninitialized => "uninitialized",
            State::Initialized => "initialized",
            State::PreEvolved => "pre-evolved",
            State::Evolving => "evolving",
        }
    }
}

pub struct TimeStepper<A: Advector> {
    state: State,
    grid: Option<Grid2D>,
    bc_u: BcSet,
    bc_v: BcSet,
    bc_scalar: BcSet,
    flow: Option<FlowState>,
    cfl: Scalar,
    limiter: LimiterKind,
    dt_initial: Option<Scalar>,
    advector: A,
}

impl<A: Advector> TimeStepper<A> {
    pub fn new(advector: A) -> Self {
        TimeStepper {
            state: State::Uninitialized,
            grid: None,
            bc_u: BcSet::all_periodic(),
            bc_v: BcSet::all_periodic(),
            bc_scalar: BcSet::all_periodic(),
            flow: None,
            cfl: 0.5,
            limiter: LimiterKind::SecondOrder,
            dt_initial: None,
            advector,
        }
    }

    fn require_state(&self, expected: State) -> Result<(), SolverError> {
        if self.state != expected {
            return Err(SolverError::WrongState {
                expected: expected.name(),
                actual: self.state.name(),
            });
        }
        Ok(())
    }

    fn require_state_at_least_preevolved(&self) -> Result<(), SolverError> {
        if self.state != State::PreEvolved && self.state != State::Evolving {
            return Err(SolverError::WrongState {
                expected: "pre-evolved or evolving",
                actual: self.state.name(),
            });
        }
        Ok(())
    }

    /// Build the grid, allocate flow state, register per-field BCs
    /// (velocities get odd reflection normal to the wall; phi/phi_mac/
    /// gradp get even reflection), and run the problem's `init_data`
    /// (spec.md §4.10's `initialize`).
    pub fn initialize(
        &mut self,
        cfg: &dyn ConfigSource,
        problem: &dyn Problem,
    ) -> Result<(), SolverError> {
        let nx = cfg.get_usize("mesh.nx")?;
        let ny = cfg.get_usize("mesh.ny")?;
        let xmin = cfg.get_real("mesh.xmin")?;
        let xmax = cfg.get_real("mesh.xmax")?;
        let ymin = cfg.get_real("mesh.ymin")?;
        let ymax = cfg.get_real("mesh.ymax")?;
        let grid = Grid2D::new(nx, ny, 4, xmin, xmax, ymin, ymax);

        let xl = cfg.get_bc_kind("mesh.xlboundary")?;
        let xr = cfg.get_bc_kind("mesh.xrboundary")?;
        let yl = cfg.get_bc_kind("mesh.ylboundary")?;
        let yr = cfg.get_bc_kind("mesh.yrboundary")?;

        let bc_scalar = BcSet::new(xl, xr, yl, yr);
        bc_scalar.validate()?;
        let bc_u = bc_scalar.normal_component(OddReflectAxis::X);
        let bc_v = bc_scalar.normal_component(OddReflectAxis::Y);

        self.cfl = cfg.get_real_or("driver.cfl", 0.5);
        self.limiter = LimiterKind::from_config(cfg)?;
        self.dt_initial = cfg.get_real("driver.dt_initial").ok();

        let mut flow = FlowState::zeros(&grid);
        problem.init_data(&mut flow, &grid, cfg)?;

        self.grid = Some(grid);
        self.bc_u = bc_u;
        self.bc_v = bc_v;
        self.bc_scalar = bc_scalar;
        self.flow = Some(flow);
        self.state = State::Initialized;
        Ok(())
    }

    pub fn grid(&self) -> &Grid2D {
        self.grid.as_ref().expect("grid set once initialized")
    }

    pub fn flow(&self) -> &FlowState {
        self.flow.as_ref().expect("flow set once initialized")
    }

    fn fill_velocity_ghosts(&mut self) {
        let grid = *self.grid.as_ref().unwrap();
        let flow = self.flow.as_mut().unwrap();
        fill(&mut flow.u, &grid, &self.bc_u);
        fill(&mut flow.v, &grid, &self.bc_v);
    }

    /// CFL-limited timestep (spec.md §4.10): `dt = cfl * min(min(dx/|u|),
    /// min(dy/|v|))` over interior. Falls back to `driver.dt_initial` if a
    /// component is identically zero; otherwise the hazard is surfaced as
    /// an error rather than silently returning infinity (spec.md §7).
    pub fn timestep(&self) -> Result<Scalar, SolverError> {
        let grid = self.grid.as_ref().ok_or(SolverError::NotInitialized("TimeStepper::timestep"))?;
        let flow = self.flow.as_ref().unwrap();

        let mut min_x = Scalar::INFINITY;
        let mut min_y = Scalar::INFINITY;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let au = flow.u.get(i, j).abs();
                let av = flow.v.get(i, j).abs();
                if au > 0.0 {
                    min_x = min_x.min(grid.dx / au);
                }
                if av > 0.0 {
                    min_y = min_y.min(grid.dy / av);
                }
            }
        }

        let bound = min_x.min(min_y);
        if bound.is_finite() {
            Ok(self.cfl * bound)
        } else if let Some(dt0) = self.dt_initial {
            Ok(dt0)
        } else {
            Err(SolverError::ZeroVelocityTimestep)
        }
    }

    /// spec.md §4.10's `preevolve`: one initial projection to enforce
    /// `div U = 0`, then a throwaway full `evolve` to approximate
    /// `grad p` at `t^{-1/2}`, restoring everything else.
    pub fn preevolve(&mut self, log: &Logger) -> Result<(), SolverError> {
        self.require_state(State::Initialized)?;
        info!(log, "preevolve: initial projection");

        self.fill_velocity_ghosts();

        let grid = *self.grid.as_ref().unwrap();
        let (ilo, ihi, jlo, jhi) = (grid.ilo(), grid.ihi(), grid.jlo(), grid.jhi());

        let mut div_u = grid.scratch_array();
        {
            let flow = self.flow.as_ref().unwrap();
            for j in jlo..=jhi {
                for i in ilo..=ihi {
                    let d = 0.5 * (flow.u.get(i + 1, j) - flow.u.get(i - 1, j)) / grid.dx
                        + 0.5 * (flow.v.get(i, j + 1) - flow.v.get(i, j - 1)) / grid.dy;
                    div_u.set(i, j, d);
                }
            }
        }

        let hierarchy = crate::mg::MgHierarchy::new(
            grid.nx, grid.ny, grid.xmin, grid.xmax, grid.ymin, grid.ymax, BcSet::all_periodic(),
        )?;
        let mut solver = crate::mg::MgSolver::new(hierarchy, 0.0, -1.0);
        solver.init_zeros();
        solver.init_rhs(&div_u);
        solver.solve(log, 1e-10)?;
        let solution = solver.get_solution();

        let flow = self.flow.as_mut().unwrap();
        for j in (jlo - 1)..=(jhi + 1) {
            for i in (ilo - 1)..=(ihi + 1) {
                let si = i - ilo + 1;
                let sj = j - jlo + 1;
                flow.phi.set(i, j, solution.get(si, sj));
            }
        }

        let mut gradp_x = grid.scratch_array();
        let mut gradp_y = grid.scratch_array();
        for j in jlo..=jhi {
            for i in ilo..=ihi {
                gradp_x.set(i, j, 0.5 * (flow.phi.get(i + 1, j) - flow.phi.get(i - 1, j)) / grid.dx);
                gradp_y.set(i, j, 0.5 * (flow.phi.get(i, j + 1) - flow.phi.get(i, j - 1)) / grid.dy);
            }
        }
        for j in jlo..=jhi {
            for i in ilo..=ihi {
                flow.u.add_assign(i, j, -gradp_x.get(i, j));
                flow.v.add_assign(i, j, -gradp_y.get(i, j));
            }
        }

        self.fill_velocity_ghosts();

        // Snapshot, take one throwaway evolve at proj_type=1, then restore
        // everything except gradp_x/gradp_y (spec.md §4.10 step 4).
        let snapshot = self.flow.as_ref().unwrap().clone_deep();

        let dt = self.timestep()?;
        self.state = State::PreEvolved;
        self.evolve(log, dt, ProjType::Approximate)?;

        let evolved_gradp_x = self.flow.as_ref().unwrap().gradp_x.clone();
        let evolved_gradp_y = self.flow.as_ref().unwrap().gradp_y.clone();

        let mut restored = snapshot;
        restored.gradp_x = evolved_gradp_x;
        restored.gradp_y = evolved_gradp_y;
        self.flow = Some(restored);
        self.state = State::PreEvolved;

        info!(log, "preevolve complete");
        Ok(())
    }

    /// spec.md §4.10's `evolve`: one full projection-method timestep.
    pub fn evolve(&mut self, log: &Logger, dt: Scalar, proj_type: ProjType) -> Result<(), SolverError> {
        self.require_state_at_least_preevolved()?;
        debug!(log, "evolve"; "dt" => dt);

        self.fill_velocity_ghosts();

        let grid = *self.grid.as_ref().unwrap();
        let (ilo, ihi, jlo, jhi) = (grid.ilo(), grid.ihi(), grid.jlo(), grid.jhi());

        let (ldelta_ux, ldelta_uy, ldelta_vx, ldelta_vy) = {
            let flow = self.flow.as_ref().unwrap();
            (
                limited_slope(&flow.u, &grid, Dir::X, self.limiter),
                limited_slope(&flow.u, &grid, Dir::Y, self.limiter),
                limited_slope(&flow.v, &grid, Dir::X, self.limiter),
                limited_slope(&flow.v, &grid, Dir::Y, self.limiter),
            )
        };

        let (mut u_mac, mut v_mac) = {
            let flow = self.flow.as_ref().unwrap();
            self.advector.mac_vels(
                &grid,
                dt,
                &flow.u,
                &flow.v,
                &ldelta_ux,
                &ldelta_uy,
                &ldelta_vx,
                &ldelta_vy,
                &flow.gradp_x,
                &flow.gradp_y,
            )
        };

        {
            let flow = self.flow.as_mut().unwrap();
            mac_projection(log, &grid, &self.bc_scalar, &mut u_mac, &mut v_mac, &mut flow.phi_mac)?;
        }

        let (u_xint, v_xint, u_yint, v_yint) = {
            let flow = self.flow.as_ref().unwrap();
            self.advector.states(
                &grid,
                dt,
                &flow.u,
                &flow.v,
                &ldelta_ux,
                &ldelta_uy,
                &ldelta_vx,
                &ldelta_vy,
                &flow.gradp_x,
                &flow.gradp_y,
                &u_mac,
                &v_mac,
            )
        };

        let mut advect_x = grid.scratch_array();
        let mut advect_y = grid.scratch_array();
        for j in jlo..=jhi {
            for i in ilo..=ihi {
                let u_face_avg = 0.5 * (u_mac.get(i, j) + u_mac.get(i + 1, j));
                let v_face_avg = 0.5 * (v_mac.get(i, j) + v_mac.get(i, j + 1));
                let ax = u_face_avg * (u_xint.get(i + 1, j) - u_xint.get(i, j)) / grid.dx
                    + v_face_avg * (u_yint.get(i, j + 1) - u_yint.get(i, j)) / grid.dy;
                let ay = u_face_avg * (v_xint.get(i + 1, j) - v_xint.get(i, j)) / grid.dx
                    + v_face_avg * (v_yint.get(i, j + 1) - v_yint.get(i, j)) / grid.dy;
                advect_x.set(i, j, ax);
                advect_y.set(i, j, ay);
            }
        }

        {
            let flow = self.flow.as_mut().unwrap();
            for j in jlo..=jhi {
                for i in ilo..=ihi {
                    match proj_type {
                        ProjType::Approximate => {
                            flow.u.add_assign(i, j, -dt * (advect_x.get(i, j) + flow.gradp_x.get(i, j)));
                            flow.v.add_assign(i, j, -dt * (advect_y.get(i, j) + flow.gradp_y.get(i, j)));
                        }
                        ProjType::PressureFreePredictor => {
                            flow.u.add_assign(i, j, -dt * advect_x.get(i, j));
                            flow.v.add_assign(i, j, -dt * advect_y.get(i, j));
                        }
                    }
                }
            }
        }

        self.fill_velocity_ghosts();

        let (gradphi_x, gradphi_y) = {
            let flow = self.flow.as_mut().unwrap();
            final_projection(log, &grid, &self.bc_scalar, dt, &mut flow.u, &mut flow.v, &mut flow.phi)?
        };

        {
            let flow = self.flow.as_mut().unwrap();
            match proj_type {
                ProjType::Approximate => {
                    flow.gradp_x.add_in_place(&gradphi_x);
                    flow.gradp_y.add_in_place(&gradphi_y);
                }
                ProjType::PressureFreePredictor => {
                    flow.gradp_x.clone_from_array(&gradphi_x);
                    flow.gradp_y.clone_from_array(&gradphi_y);
                }
            }
            flow.t += dt;
            flow.n += 1;
        }

        self.fill_velocity_ghosts();
        self.state = State::Evolving;
        Ok(())
    }

    /// Centered divergence of U (spec.md §4.8 step 1 / visualization
    /// collaborator, spec.md §6), exposed so it isn't recomputed ad hoc by
    /// every caller that wants it.
    pub fn divergence(&self) -> CellArray {
        let grid = self.grid();
        let flow = self.flow();
        let mut out = grid.scratch_array();
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let d = 0.5 * (flow.u.get(i + 1, j) - flow.u.get(i - 1, j)) / grid.dx
                    + 0.5 * (flow.v.get(i, j + 1) - flow.v.get(i, j - 1)) / grid.dy;
                out.set(i, j, d);
            }
        }
        out
    }

    /// `dv/dx - du/dy`, centered differences (spec.md §6's visualization
    /// collaborator contract).
    pub fn vorticity(&self) -> CellArray {
        let grid = self.grid();
        let flow = self.flow();
        let mut out = grid.scratch_array();
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let w = 0.5 * (flow.v.get(i + 1, j) - flow.v.get(i - 1, j)) / grid.dx
                    - 0.5 * (flow.u.get(i, j + 1) - flow.u.get(i, j - 1)) / grid.dy;
                out.set(i, j, w);
            }
        }
        out
    }

    /// `0.5 * sum(u^2 + v^2) * dx * dy` over interior, needed by spec.md
    /// S4's "energy drifts by < 2%" scenario assertion.
    pub fn kinetic_energy(&self) -> Scalar {
        let grid = self.grid();
        let flow = self.flow();
        let mut acc = 0.0;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let u = flow.u.get(i, j);
                let v = flow.v.get(i, j);
                acc += u * u + v * v;
            }
        }
        0.5 * acc * grid.dx * grid.dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advect::UpwindGodunovAdvector;
    use crate::config::MapConfig;
    use crate::log::discard_logger;
    use crate::problem::SolenoidalShear;

    fn config(nx: usize) -> MapConfig {
        let mut cfg = MapConfig::new();
        cfg.set_int("mesh.nx", nx as i64)
            .set_int("mesh.ny", nx as i64)
            .set_real("mesh.xmin", 0.0)
            .set_real("mesh.xmax", 1.0)
            .set_real("mesh.ymin", 0.0)
            .set_real("mesh.ymax", 1.0)
            .set_str("mesh.xlboundary", "periodic")
            .set_str("mesh.xrboundary", "periodic")
            .set_str("mesh.ylboundary", "periodic")
            .set_str("mesh.yrboundary", "periodic")
            .set_real("driver.cfl", 0.5)
            .set_int("incompressible.limiter", 1)
            .set_int("incompressible.proj_type", 1);
        cfg
    }

    #[test]
    fn preevolve_is_identity_on_solenoidal_field() {
        // spec.md S3.
        let cfg = config(32);
        let log = discard_logger();
        let mut ts = TimeStepper::new(UpwindGodunovAdvector);
        ts.initialize(&cfg, &SolenoidalShear).unwrap();
        ts.preevolve(&log).unwrap();

        let grid = ts.grid().clone();
        let flow = ts.flow();
        let mut max_u_err: Scalar = 0.0;
        let mut max_v: Scalar = 0.0;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let expected_u = (2.0 * std::f64::consts::PI * grid.y(j)).sin();
                max_u_err = max_u_err.max((flow.u.get(i, j) - expected_u).abs());
                max_v = max_v.max(flow.v.get(i, j).abs());
            }
        }
        assert!(max_u_err < 1e-6, "max u error {max_u_err}");
        assert!(max_v < 1e-6, "max v {max_v}");
    }

    #[test]
    fn methods_reject_wrong_state() {
        let cfg = config(16);
        let log = discard_logger();
        let mut ts = TimeStepper::new(UpwindGodunovAdvector);
        assert!(ts.evolve(&log, 0.01, ProjType::Approximate).is_err());
        ts.initialize(&cfg, &SolenoidalShear).unwrap();
        assert!(ts.evolve(&log, 0.01, ProjType::Approximate).is_err());
    }
}
