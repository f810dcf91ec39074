//! Geometric-multigrid Helmholtz solver and approximate-projection
//! incompressible Navier-Stokes time integrator, grounded in
//! `original_source/`'s `multigrid` and `incompressible` modules
//! (Bell-Colella-Glaz).

pub mod advect;
pub mod config;
pub mod error;
pub mod grid;
pub mod log;
pub mod mg;
pub mod problem;
pub mod projector;
pub mod timestepper;
pub mod types;
pub mod viz;

pub use config::{ConfigSource, MapConfig};
pub use error::{ConfigError, MgDiagnostics, MgOutcome, SolverError};
pub use grid::bc::{BcKind, BcSet};
pub use grid::{CellArray, Grid2D};
pub use mg::{MgHierarchy, MgSolver};
pub use problem::Problem;
pub use timestepper::{FlowState, TimeStepper};
pub use viz::Visualization;
