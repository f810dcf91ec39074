//! Error kinds per spec.md §7. Configuration and initialization-order errors
//! abort the enclosing operation; convergence is never an error (it is
//! reported as data via `MgOutcome`).

use std::fmt;

/// Faults in the problem configuration, fatal at construction/initialize
/// time (spec.md §7).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Multigrid requires `nx == ny`.
    NonSquareResolution { nx: usize, ny: usize },
    /// Multigrid requires a square physical domain.
    NonSquareDomain { width: f64, height: f64 },
    /// Multigrid requires `nx` to be a power of two.
    NotPowerOfTwo { nx: usize },
    /// An edge boundary-condition string did not match a known kind.
    UnknownBcKind { value: String },
    /// Periodic must be declared on both edges of an axis or neither.
    AsymmetricPeriodicBc { axis: &'static str },
    /// `incompressible.limiter` or `incompressible.proj_type` out of range.
    InvalidEnumValue { key: &'static str, value: i64 },
    /// A config key was absent or had the wrong type.
    MissingOrMistyped { key: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonSquareResolution { nx, ny } => {
                write!(f, "multigrid requires nx == ny, got nx={nx}, ny={ny}")
            }
            ConfigError::NonSquareDomain { width, height } => write!(
                f,
                "multigrid requires a square domain, got width={width}, height={height}"
            ),
            ConfigError::NotPowerOfTwo { nx } => {
                write!(f, "multigrid requires nx to be a power of two, got {nx}")
            }
            ConfigError::UnknownBcKind { value } => {
                write!(f, "unknown boundary condition kind: {value:?}")
            }
            ConfigError::AsymmetricPeriodicBc { axis } => write!(
                f,
                "periodic must be declared on both edges of the {axis} axis or neither"
            ),
            ConfigError::InvalidEnumValue { key, value } => {
                write!(f, "invalid value {value} for {key}")
            }
            ConfigError::MissingOrMistyped { key } => {
                write!(f, "config key {key:?} is missing or has the wrong type")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level error type surfaced by the solver's public API.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    Config(ConfigError),
    /// `MGSolver::solve` was called without both `init_solution`/`init_zeros`
    /// and `init_rhs` since construction (spec.md §4.7, §7).
    NotInitialized(&'static str),
    /// A `TimeStepper` method was called out of order (spec.md §4.10's state
    /// machine, generalized error handling per spec.md §7).
    WrongState {
        expected: &'static str,
        actual: &'static str,
    },
    /// The CFL timestep would be infinite because a velocity component is
    /// identically zero everywhere and no `driver.dt_initial` fallback was
    /// configured (spec.md §4.10, §7: "numerical hazard, caller's
    /// responsibility").
    ZeroVelocityTimestep,
    Io(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Config(e) => write!(f, "configuration error: {e}"),
            SolverError::NotInitialized(what) => {
                write!(f, "{what} used before being initialized")
            }
            SolverError::WrongState { expected, actual } => write!(
                f,
                "expected time stepper state {expected}, found {actual}"
            ),
            SolverError::ZeroVelocityTimestep => write!(
                f,
                "CFL timestep is infinite: a velocity component is identically zero and no driver.dt_initial was configured"
            ),
            SolverError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for SolverError {}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        SolverError::Config(e)
    }
}

/// Diagnostics returned by a V-cycle solve, per spec.md §4.7/§7: convergence
/// failure is reported, not fatal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MgDiagnostics {
    pub cycles_taken: u32,
    pub residual_error: f64,
    pub relative_error: f64,
}

/// Outcome of `MGSolver::solve`. Hitting the cycle cap is a warning carried
/// as data, never an `Err`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MgOutcome {
    Converged(MgDiagnostics),
    MaxCyclesReached(MgDiagnostics),
}

impl MgOutcome {
    pub fn diagnostics(&self) -> MgDiagnostics {
        match self {
            MgOutcome::Converged(d) | MgOutcome::MaxCyclesReached(d) => *d,
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, MgOutcome::Converged(_))
    }
}
