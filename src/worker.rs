//! Subtree Worker: traverses one immediate subdirectory end-to-end.
//!
//! Each worker owns an [`Aggregator`] and a [`Deduper`] for the lifetime of its
//! traversal; both are dropped when the worker returns (ordinary RAII -- no manual
//! free pass like the reference C implementation's `free_inode_table`). The packed
//! result is handed to the coordinator by value.

use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::aggregator::{Aggregator, Full};
use crate::cancellation::Cancellation;
use crate::config::{OwnerMode, RunConfig, SizeMode};
use crate::dedupe::{Deduper, Insertion};
use crate::error_sink::{ErrorSink, RecordOutcome};
use crate::exclude::ExcludeSet;
use crate::result_tree::ResultEntry;

/// How a worker's traversal ended. The coordinator folds this into the global exit
/// status rather than branching on it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Completed,
    Cancelled,
    AggregatorOverflow { path: PathBuf },
    OpenFailed { path: PathBuf },
}

pub struct WorkerResult {
    pub entry: ResultEntry,
    pub outcome: WorkerOutcome,
}

/// Run one worker's traversal synchronously. Spawned onto a pool thread by
/// [`crate::pool::WorkerPool`].
pub fn run(
    path: PathBuf,
    root_dev: u64,
    config: Arc<RunConfig>,
    exclude: Arc<ExcludeSet>,
    errors: Arc<ErrorSink>,
    cancellation: Arc<Cancellation>,
) -> WorkerResult {
    let mut aggregator = Aggregator::new();
    let mut deduper = Deduper::new();

    let path_str = path.to_string_lossy().into_owned();

    let walker = WalkDir::new(&path).follow_links(false).contents_first(false);
    let mut it = walker.into_iter();

    loop {
        if cancellation.is_cancelled() {
            return WorkerResult {
                entry: ResultEntry::new(path_str, aggregator.pack()),
                outcome: WorkerOutcome::Cancelled,
            };
        }

        let dent = match it.next() {
            None => break,
            Some(Ok(d)) => d,
            Some(Err(e)) => {
                let bad_path = e.path().map(|p| p.to_string_lossy().into_owned()).unwrap_or_else(|| path_str.clone());
                if e.depth() == 0 {
                    // The subtree's own root couldn't be opened; there is nothing
                    // else this worker can walk.
                    record_error(&errors, &cancellation, &bad_path, &e.to_string());
                    return WorkerResult {
                        entry: ResultEntry::new(path_str, aggregator.pack()),
                        outcome: WorkerOutcome::OpenFailed { path: path.clone() },
                    };
                }
                if record_error(&errors, &cancellation, &bad_path, &e.to_string()) {
                    return WorkerResult {
                        entry: ResultEntry::new(path_str, aggregator.pack()),
                        outcome: WorkerOutcome::Cancelled,
                    };
                }
                continue;
            }
        };

        let entry_path = dent.path();
        let is_dir = dent.file_type().is_dir();

        let meta = match std::fs::symlink_metadata(entry_path) {
            Ok(m) => m,
            Err(e) => {
                let entry_path_str = entry_path.to_string_lossy().into_owned();
                if record_error(&errors, &cancellation, &entry_path_str, &e.to_string()) {
                    return WorkerResult {
                        entry: ResultEntry::new(path_str, aggregator.pack()),
                        outcome: WorkerOutcome::Cancelled,
                    };
                }
                if is_dir {
                    it.skip_current_dir();
                }
                continue;
            }
        };

        if is_dir && meta.dev() != root_dev {
            // Crossed a device boundary (a mount point nested inside the subtree).
            it.skip_current_dir();
            continue;
        }

        let inode = meta.ino();
        if exclude.contains(inode) {
            if is_dir {
                it.skip_current_dir();
            }
            continue;
        }

        if meta.nlink() > 1 && deduper.insert(inode) == Insertion::Existing {
            continue;
        }

        if config.verbose {
            print_trace(entry_path, &meta);
        }

        // Directories are traversed (and, above, pruned/deduped/excluded like any
        // other entry) but never contribute bytes themselves -- only the regular
        // files, symlinks, and other non-directory entries beneath them do.
        if is_dir {
            continue;
        }

        let size = size_for(&meta, config.size_mode);
        let owner_id = owner_for(&meta, config.owner_mode);

        match aggregator.upsert(owner_id, size) {
            Ok(()) => {}
            Err(Full) => {
                let entry_path_str = entry_path.to_string_lossy().into_owned();
                record_error(&errors, &cancellation, &entry_path_str, "owner table overflowed");
                cancellation.trigger(2);
                return WorkerResult {
                    entry: ResultEntry::new(path_str, aggregator.pack()),
                    outcome: WorkerOutcome::AggregatorOverflow { path: entry_path.to_path_buf() },
                };
            }
        }
    }

    WorkerResult {
        entry: ResultEntry::new(path_str, aggregator.pack()),
        outcome: WorkerOutcome::Completed,
    }
}

/// Record an entry-local error. Returns `true` if the sink overflowed, in which case
/// cancellation (exit status 3) has already been triggered and the caller should stop.
fn record_error(errors: &ErrorSink, cancellation: &Cancellation, path: &str, message: &str) -> bool {
    match errors.record(path, message) {
        RecordOutcome::Ok => false,
        RecordOutcome::Overflow => {
            cancellation.trigger(3);
            true
        }
    }
}

/// Shared with the coordinator's root-level enumeration so both scopes size
/// entries identically.
pub(crate) fn size_for(meta: &std::fs::Metadata, mode: SizeMode) -> u64 {
    match mode {
        SizeMode::Apparent => meta.len(),
        SizeMode::Occupied => (meta.blocks() as u64) * 512,
    }
}

/// Shared with the coordinator's root-level enumeration so both scopes key
/// entries identically.
pub(crate) fn owner_for(meta: &std::fs::Metadata, mode: OwnerMode) -> u32 {
    match mode {
        OwnerMode::Gid => meta.gid(),
        OwnerMode::Uid => meta.uid(),
    }
}

fn print_trace(path: &Path, meta: &std::fs::Metadata) {
    let kind = if meta.file_type().is_symlink() {
        "symlink"
    } else if meta.is_dir() {
        "directory"
    } else if meta.is_file() {
        "file"
    } else {
        "other"
    };
    println!("+{kind:<9} {} ({})", path.display(), meta.len());
}
