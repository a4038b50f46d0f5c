//! Crate-level integration tests: each builds a real temp-directory tree and
//! runs the coordinator end-to-end, matching the six scenarios this system is
//! expected to handle correctly.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use groupdisk_lib::config::{OutputFormat, OwnerMode, RunConfig, SizeMode};
use groupdisk_lib::coordinator;

fn config(root: PathBuf, num_threads: u8, exclude_paths: Vec<PathBuf>) -> Arc<RunConfig> {
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
        exclude_paths,
    })
}

fn gid_of(path: &std::path::Path) -> u32 {
    use std::os::unix::fs::MetadataExt;
    fs::symlink_metadata(path).unwrap().gid()
}

#[test]
fn empty_directory_has_zero_total_and_empty_sections() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = coordinator::run(config(dir.path().to_path_buf(), 1, vec![])).unwrap();
    assert_eq!(outcome.exit_status, 0);
    let tree = outcome.tree.unwrap();
    assert!(tree.subdirs.is_empty());
    assert!(tree.summary.pairs.is_empty());
    assert_eq!(tree.total(), 0);
}

#[test]
fn single_file_apparent_and_occupied_modes_agree_on_block_multiples() {
    let dir = tempfile::tempdir().unwrap();
    // 8 blocks * 512 bytes = 4096, an exact block multiple so both modes coincide.
    let a_path = dir.path().join("a");
    fs::write(&a_path, vec![0u8; 4096]).unwrap();
    let gid = gid_of(&a_path);

    let base = (*config(dir.path().to_path_buf(), 1, vec![])).clone();
    let apparent = Arc::new(RunConfig { size_mode: SizeMode::Apparent, ..base.clone() });
    let occupied = Arc::new(RunConfig { size_mode: SizeMode::Occupied, ..base });

    let apparent_total: u64 = coordinator::run(apparent)
        .unwrap()
        .tree
        .unwrap()
        .summary
        .pairs
        .into_iter()
        .filter(|&(g, _)| g == gid)
        .map(|(_, b)| b)
        .sum();
    let occupied_total: u64 = coordinator::run(occupied)
        .unwrap()
        .tree
        .unwrap()
        .summary
        .pairs
        .into_iter()
        .filter(|&(g, _)| g == gid)
        .map(|(_, b)| b)
        .sum();

    assert_eq!(apparent_total, 4096);
    assert_eq!(occupied_total, 4096);
}

#[test]
fn hardlink_pair_is_counted_once() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("x");
    let b = dir.path().join("y");
    fs::write(&a, vec![0u8; 1024]).unwrap();
    fs::hard_link(&a, &b).unwrap();
    let gid = gid_of(&a);

    let outcome = coordinator::run(config(dir.path().to_path_buf(), 1, vec![])).unwrap();
    let tree = outcome.tree.unwrap();
    let total: u64 = tree.summary.pairs.iter().filter(|&&(g, _)| g == gid).map(|&(_, b)| b).sum();
    assert_eq!(total, 1024);
}

#[test]
fn two_subdirectories_with_two_workers_produce_the_expected_rollup() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    let fa = a.join("f");
    let fb = b.join("f");
    fs::write(&fa, vec![0u8; 1000]).unwrap();
    fs::write(&fb, vec![0u8; 2000]).unwrap();
    let gid = gid_of(&fa);
    assert_eq!(gid, gid_of(&fb));

    let outcome = coordinator::run(config(dir.path().to_path_buf(), 2, vec![])).unwrap();
    let tree = outcome.tree.unwrap();
    assert_eq!(tree.subdirs.len(), 2);

    let total: u64 = tree.summary.pairs.iter().filter(|&&(g, _)| g == gid).map(|&(_, b)| b).sum();
    assert_eq!(total, 3000);
    assert_eq!(tree.total(), 3000);
}

#[test]
fn excluding_a_subdirectory_removes_it_from_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    let fa = a.join("f");
    let fb = b.join("f");
    fs::write(&fa, vec![0u8; 1000]).unwrap();
    fs::write(&fb, vec![0u8; 2000]).unwrap();
    let gid = gid_of(&fb);

    let outcome = coordinator::run(config(dir.path().to_path_buf(), 2, vec![a.clone()])).unwrap();
    let tree = outcome.tree.unwrap();
    assert_eq!(tree.subdirs.len(), 1);
    assert!(tree.subdirs[0].path.ends_with("/b"));

    let total: u64 = tree.summary.pairs.iter().filter(|&&(g, _)| g == gid).map(|&(_, b)| b).sum();
    assert_eq!(total, 2000);
}

#[test]
fn many_files_under_one_real_gid_do_not_overflow_the_owner_table() {
    // The full 200-distinct-gid overflow scenario needs `chown` privileges this
    // test process doesn't have, so the Aggregator::Full mechanics themselves
    // are covered directly in aggregator.rs's `upsert_overflows_past_capacity`.
    // This test instead confirms overflow is keyed by distinct owner count, not
    // entry count: 200 files sharing one real gid must not trip it.
    let dir = tempfile::tempdir().unwrap();
    for i in 0..200 {
        fs::write(dir.path().join(format!("f{i}")), b"x").unwrap();
    }
    let outcome = coordinator::run(config(dir.path().to_path_buf(), 1, vec![])).unwrap();
    assert_eq!(outcome.exit_status, 0);
    assert!(outcome.tree.is_some());
}
