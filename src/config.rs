//! Immutable run configuration.
//!
//! Built once by the CLI layer and shared (via `Arc`) into the coordinator and every
//! worker. There is no global mutable state anywhere in this crate — every component
//! that needs to know the size mode, owner mode, or verbosity is handed a `RunConfig`
//! directly instead of reading a process-wide flag.

use std::path::PathBuf;

/// Whether byte counts report apparent size or occupied (on-disk) size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    /// `st_size`.
    Apparent,
    /// `st_blocks * 512`.
    Occupied,
}

/// Which identifier files are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerMode {
    Gid,
    Uid,
}

/// Which adapter renders the final result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    PlainText,
    Json,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    pub size_mode: SizeMode,
    pub owner_mode: OwnerMode,
    pub output_format: OutputFormat,
    pub resolve_names: bool,
    pub human_readable: bool,
    pub verbose: bool,
    pub max_errors: u16,
    pub num_threads: u8,
    pub exclude_paths: Vec<PathBuf>,
}
