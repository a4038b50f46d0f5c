//! Coordinator: enumerates the root directory one level deep and dispatches a
//! Subtree Worker per immediate subdirectory, then rolls every result up into a
//! final [`ResultTree`].
//!
//! Grounded on the reference C implementation's `walk()` (one-level `opendir`/
//! `readdir` loop, `get_n_subdirs`, direct dispatch, `pack_result`/`add_summary`),
//! reshaped around owned Rust values and an explicit [`RunState`] instead of the
//! reference's implicit control flow.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::aggregator::{Aggregator, Full};
use crate::cancellation::Cancellation;
use crate::config::RunConfig;
use crate::dedupe::{Deduper, Insertion};
use crate::error::AppError;
use crate::error_sink::{ErrorSink, RecordOutcome};
use crate::exclude::ExcludeSet;
use crate::pool::WorkerPool;
use crate::result_tree::{ResultEntry, ResultTree};
use crate::worker::{self, WorkerOutcome};

/// Internal tracing-only state machine; does not drive control flow beyond what
/// [`run`] already does step by step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    EnumeratingRoot,
    WorkersRunning,
    RollingUp,
    Emitting,
    Failed,
    Done,
}

/// Everything the output adapters need: the assembled tree (when successful) and
/// whatever errors accumulated along the way.
pub struct RunOutcome {
    pub tree: Option<ResultTree>,
    pub errors: Vec<String>,
    pub exit_status: u8,
}

pub fn run(config: Arc<RunConfig>) -> Result<RunOutcome, AppError> {
    let mut state = RunState::Init;
    log::debug!("state: {state:?}");

    let root = canonicalize_root(&config.root)?;
    let root_meta = fs::symlink_metadata(&root)
        .map_err(|e| AppError::Input(format!("{}: {e}", root.display())))?;
    let root_dev = root_meta.dev();

    let exclude = Arc::new(ExcludeSet::build(&config.exclude_paths)?);
    let errors = Arc::new(ErrorSink::new(config.max_errors));
    let cancellation = Arc::new(Cancellation::new());

    state = RunState::EnumeratingRoot;
    log::debug!("state: {state:?}");

    let mut root_aggregator = Aggregator::new();
    let mut root_deduper = Deduper::new();
    let mut subdir_paths = Vec::new();

    let read_dir = match fs::read_dir(&root) {
        Ok(rd) => rd,
        Err(e) => return Err(AppError::Input(format!("{}: {e}", root.display()))),
    };

    for dent in read_dir {
        if cancellation.is_cancelled() {
            break;
        }

        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                record_or_fail(&errors, &cancellation, &root.to_string_lossy(), &e.to_string());
                continue;
            }
        };

        let name = dent.file_name();
        if name == "." || name == ".." {
            // read_dir never yields these, but keep the check explicit to mirror
            // the reference's readdir-based loop and its documented dot handling.
            continue;
        }

        let entry_path = dent.path();
        let meta = match fs::symlink_metadata(&entry_path) {
            Ok(m) => m,
            Err(e) => {
                record_or_fail(&errors, &cancellation, &entry_path.to_string_lossy(), &e.to_string());
                continue;
            }
        };

        let is_dir = meta.is_dir();

        if is_dir {
            if meta.dev() != root_dev {
                continue;
            }
            let inode = meta.ino();
            if exclude.contains(inode) {
                continue;
            }
            subdir_paths.push(entry_path);
            continue;
        }

        let inode = meta.ino();
        if exclude.contains(inode) {
            continue;
        }
        if meta.nlink() > 1 && root_deduper.insert(inode) == Insertion::Existing {
            continue;
        }

        let size = worker::size_for(&meta, config.size_mode);
        let owner_id = worker::owner_for(&meta, config.owner_mode);
        if let Err(Full) = root_aggregator.upsert(owner_id, size) {
            record_or_fail(&errors, &cancellation, &entry_path.to_string_lossy(), "owner table overflowed");
            cancellation.trigger(2);
        }
    }

    // The root directory itself (like every directory) contributes no bytes of
    // its own; only the non-directory entries enumerated above do. `..` is never
    // visited since `read_dir` is rooted at `root` itself, and `.` is not yielded
    // by `read_dir` either -- both match the reference's dot-entry handling.

    state = RunState::WorkersRunning;
    log::debug!("state: {state:?}");

    let subdir_results = dispatch_workers(
        subdir_paths,
        root_dev,
        Arc::clone(&config),
        Arc::clone(&exclude),
        Arc::clone(&errors),
        Arc::clone(&cancellation),
    );

    let mut subdir_entries = Vec::with_capacity(subdir_results.len());
    for result in subdir_results {
        match &result.outcome {
            WorkerOutcome::Completed | WorkerOutcome::Cancelled => {}
            WorkerOutcome::AggregatorOverflow { .. } => cancellation.trigger(2),
            WorkerOutcome::OpenFailed { .. } => {
                // The worker already recorded this failure with the specific OS
                // error text before returning; recording it again here would
                // double-count it against the Error Sink's budget.
            }
        }
        subdir_entries.push(result.entry);
    }

    if cancellation.is_cancelled() {
        state = RunState::Failed;
        log::debug!("state: {state:?}");
        return Ok(RunOutcome {
            tree: None,
            errors: errors.drain(),
            exit_status: cancellation.exit_status(),
        });
    }

    state = RunState::RollingUp;
    log::debug!("state: {state:?}");

    let root_entry = ResultEntry::new(root.to_string_lossy().into_owned(), root_aggregator.pack());
    let tree = match ResultTree::build(root_entry, subdir_entries) {
        Ok(t) => t,
        Err(Full) => return Err(AppError::AggregatorOverflow { path: root.clone() }),
    };

    state = RunState::Emitting;
    log::debug!("state: {state:?}");

    let outcome = RunOutcome {
        tree: Some(tree),
        errors: errors.drain(),
        exit_status: 0,
    };

    state = RunState::Done;
    log::debug!("state: {state:?}");

    Ok(outcome)
}

/// Record an entry-local error during root enumeration; escalate to cancellation
/// (exit status 3) on Error Sink overflow.
fn record_or_fail(errors: &ErrorSink, cancellation: &Cancellation, path: &str, message: &str) {
    if let RecordOutcome::Overflow = errors.record(path, message) {
        cancellation.trigger(3);
    }
}

/// Run every subdirectory to completion, either through the bounded pool or, for
/// `-t 0`, fully sequentially in the calling thread (no thread is ever spawned).
fn dispatch_workers(
    subdir_paths: Vec<PathBuf>,
    root_dev: u64,
    config: Arc<RunConfig>,
    exclude: Arc<ExcludeSet>,
    errors: Arc<ErrorSink>,
    cancellation: Arc<Cancellation>,
) -> Vec<worker::WorkerResult> {
    if config.num_threads == 0 {
        return subdir_paths
            .into_iter()
            .map(|path| {
                worker::run(
                    path,
                    root_dev,
                    Arc::clone(&config),
                    Arc::clone(&exclude),
                    Arc::clone(&errors),
                    Arc::clone(&cancellation),
                )
            })
            .collect();
    }

    let mut pool = WorkerPool::new(config.num_threads as usize);
    for (index, path) in subdir_paths.into_iter().enumerate() {
        let config = Arc::clone(&config);
        let exclude = Arc::clone(&exclude);
        let errors = Arc::clone(&errors);
        let cancellation = Arc::clone(&cancellation);
        pool.admit(index, move || {
            worker::run(path, root_dev, config, exclude, errors, cancellation)
        });
    }

    let mut indexed = pool.finalize();
    indexed.sort_by_key(|r| r.index);
    indexed.into_iter().map(|r| r.result).collect()
}

/// Ensure the root path ends with a trailing `/`, string-level, matching the
/// reference implementation's concatenation convention rather than
/// `Path::canonicalize` (which would also resolve symlinks).
fn canonicalize_root(root: &Path) -> Result<PathBuf, AppError> {
    let s = root.to_string_lossy();
    if s.is_empty() {
        return Err(AppError::Input("root path must not be empty".into()));
    }
    if s.ends_with('/') {
        Ok(root.to_path_buf())
    } else {
        Ok(PathBuf::from(format!("{s}/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, OwnerMode, SizeMode};
    use std::fs;

    fn config_for(root: PathBuf, num_threads: u8) -> Arc<RunConfig> {
        Arc::new(RunConfig {
            root,
            size_mode: SizeMode::Apparent,
            owner_mode: OwnerMode::Gid,
            output_format: OutputFormat::Json,
            resolve_names: false,
            human_readable: false,
            verbose: false,
            max_errors: 128,
            num_threads,
            exclude_paths: vec![],
        })
    }

    #[test]
    fn empty_directory_produces_zero_total() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(config_for(dir.path().to_path_buf(), 1)).unwrap();
        let tree = outcome.tree.unwrap();
        assert_eq!(tree.total(), 0);
        assert!(tree.subdirs.is_empty());
        assert!(tree.summary.pairs.is_empty());
    }

    #[test]
    fn sequential_and_threaded_modes_agree_on_total() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            let sub = dir.path().join(format!("sub{i}"));
            fs::create_dir(&sub).unwrap();
            fs::write(sub.join("f"), vec![0u8; 1000]).unwrap();
        }
        let sequential = run(config_for(dir.path().to_path_buf(), 0)).unwrap();
        let threaded = run(config_for(dir.path().to_path_buf(), 2)).unwrap();
        assert_eq!(
            sequential.tree.unwrap().total(),
            threaded.tree.unwrap().total()
        );
    }

    #[test]
    fn subdirectories_are_reported_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut names: Vec<String> = (0..5).map(|i| format!("d{i}")).collect();
        for n in &names {
            fs::create_dir(dir.path().join(n)).unwrap();
        }
        let outcome = run(config_for(dir.path().to_path_buf(), 4)).unwrap();
        let tree = outcome.tree.unwrap();
        let mut seen: Vec<String> = tree
            .subdirs
            .iter()
            .map(|e| PathBuf::from(&e.path).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        seen.sort();
        assert_eq!(seen, names);
    }
}
