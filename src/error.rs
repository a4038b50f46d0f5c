//! Top-level error type and its mapping onto the process exit code contract.

use std::fmt;
use std::path::PathBuf;

/// Errors that can terminate a run before or during traversal.
///
/// Each variant carries the exit code it maps to in `exit_code()`, matching the
/// contract in SPEC_FULL.md §6/§7.
#[derive(Debug)]
pub enum AppError {
    /// Root path missing, malformed flag value, unrecognized flag, or similar fatal
    /// input problem (including `clap`'s own ordinary usage errors).
    Input(String),
    /// `lstat` failed on a `-X` exclude target during startup.
    ExcludeSetup { path: PathBuf, source: std::io::Error },
    /// The coordinator's rollup Owner Aggregator overflowed while merging the root
    /// and every subdirectory's packed results (more than `G` distinct owners
    /// across the whole run).
    AggregatorOverflow { path: PathBuf },
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) | AppError::ExcludeSetup { .. } => 1,
            AppError::AggregatorOverflow { .. } => 2,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(msg) => write!(f, "{msg}"),
            AppError::ExcludeSetup { path, source } => {
                write!(f, "{}: {source}", path.display())
            }
            AppError::AggregatorOverflow { path } => {
                write!(f, "{}: owner table overflowed", path.display())
            }
        }
    }
}

impl std::error::Error for AppError {}
