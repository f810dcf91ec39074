//! Thin wrapper around `slog` so every module logs through one `Logger` type
//! instead of reaching for a global. Mirrors the shape the teacher crate's
//! `crate::log` module is imported under (`crate::log::{debug, warn,
//! Logger}`).

pub use slog::{crit, debug, error, info, o, trace, warn, Logger};

use slog::Drain;

/// Build the default terminal logger used by the CLI driver and by tests
/// that want real output. Async so logging never blocks a V-cycle.
pub fn term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!("crate" => "incompressible2d"))
}

/// A logger that discards everything, for unit tests that don't care about
/// log output but still need a `&Logger` to pass around.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}
