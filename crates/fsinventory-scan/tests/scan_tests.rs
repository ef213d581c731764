use fsinventory_scan::{
    DigestEngine, DigestKind, FileRecord, FileWalker, InventoryScanner, RunConfig, WorkerPool,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hello").unwrap();
    fs::write(temp.path().join("b.bin"), "").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub/c.txt"), "x").unwrap();
    temp
}

fn config(root: &std::path::Path, recurse: bool, concurrency: usize) -> RunConfig {
    RunConfig::builder()
        .start_dir(root)
        .recurse(recurse)
        .concurrency(concurrency)
        .build()
        .unwrap()
}

#[test]
fn test_recursive_inventory() {
    let temp = sample_tree();
    let root = temp.path().canonicalize().unwrap();
    let outcome = InventoryScanner::new()
        .scan(&config(temp.path(), true, 2))
        .unwrap();

    assert_eq!(outcome.records.len(), 3);

    let by_name: BTreeMap<String, _> = outcome
        .records
        .iter()
        .map(|r| (r.name.to_string(), r))
        .collect();

    let a = by_name["a.txt"];
    assert_eq!(a.path, root.join("a.txt"));
    assert_eq!(a.extension, "txt");
    assert_eq!(a.size, 5);
    assert_eq!(
        a.digests.hex(DigestKind::Md5),
        Some("5d41402abc4b2a76b9719d911017c592")
    );

    let b = by_name["b.bin"];
    assert_eq!(b.size, 0);
    assert_eq!(
        b.digests.hex(DigestKind::Md5),
        Some("d41d8cd98f00b204e9800998ecf8427e")
    );
    assert_eq!(
        b.digests.hex(DigestKind::Sha1),
        Some("da39a3ee5e6b4b0d3255bfef95601890afd80709")
    );

    let c = by_name["c.txt"];
    assert_eq!(c.path, root.join("sub").join("c.txt"));
    assert!(!c.is_dir);
}

#[test]
fn test_non_recursive_inventory() {
    let temp = sample_tree();
    let outcome = InventoryScanner::new()
        .scan(&config(temp.path(), false, 2))
        .unwrap();

    let names: BTreeSet<String> = outcome.records.iter().map(|r| r.name.to_string()).collect();
    assert_eq!(
        names,
        BTreeSet::from(["a.txt".to_string(), "b.bin".to_string()])
    );
}

#[test]
fn test_every_file_recorded_once() {
    let temp = TempDir::new().unwrap();
    let mut expected = BTreeSet::new();
    for d in 0..4 {
        let dir = temp.path().join(format!("d{d}"));
        fs::create_dir(&dir).unwrap();
        for f in 0..50 {
            let path = dir.join(format!("f{f}.dat"));
            fs::write(&path, format!("{d}-{f}")).unwrap();
            expected.insert(path.canonicalize().unwrap());
        }
    }

    let outcome = InventoryScanner::new()
        .scan(&config(temp.path(), true, 8))
        .unwrap();

    let seen: Vec<PathBuf> = outcome.records.iter().map(|r| r.path.clone()).collect();
    let unique: BTreeSet<PathBuf> = seen.iter().cloned().collect();
    assert_eq!(seen.len(), unique.len());
    assert_eq!(unique, expected);
    assert_eq!(outcome.summary.total_files, 200);
    assert_eq!(outcome.summary.duplicates_rejected, 0);
    assert!(outcome.records.iter().all(|r| !r.has_digest_failures()));
}

#[test]
fn test_digests_independent_of_concurrency() {
    let temp = sample_tree();

    let collect = |concurrency| {
        InventoryScanner::new()
            .scan(&config(temp.path(), true, concurrency))
            .unwrap()
            .records
            .into_iter()
            .map(|r| (r.path, r.digests))
            .collect::<BTreeMap<_, _>>()
    };

    assert_eq!(collect(1), collect(16));
}

#[test]
fn test_missing_start_dir_is_run_error() {
    let temp = TempDir::new().unwrap();
    let result = InventoryScanner::new().scan(&config(&temp.path().join("gone"), true, 2));
    assert!(result.is_err());
}

#[test]
fn test_selected_digest_kinds_only() {
    let temp = sample_tree();
    let config = RunConfig::builder()
        .start_dir(temp.path())
        .digests(vec![DigestKind::Sha256, DigestKind::Blake3])
        .build()
        .unwrap();

    let outcome = InventoryScanner::new().scan(&config).unwrap();
    for record in &outcome.records {
        let kinds: Vec<_> = record.digests.kinds().collect();
        assert_eq!(kinds, vec![DigestKind::Sha256, DigestKind::Blake3]);
    }
}

#[cfg(unix)]
#[test]
fn test_scan_finishes_with_fifo_in_tree() {
    let temp = sample_tree();
    let status = std::process::Command::new("mkfifo")
        .arg(temp.path().join("sub/pipe"))
        .status()
        .unwrap();
    assert!(status.success());

    let outcome = InventoryScanner::new()
        .scan(&config(temp.path(), true, 2))
        .unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert!(outcome.records.iter().all(|r| r.name != "pipe"));
    assert_eq!(outcome.summary.digest_failures, 0);
}

#[test]
fn test_vanished_file_is_recorded_as_failed() {
    let temp = sample_tree();
    let descriptors: Vec<FileRecord> = FileWalker::new(temp.path(), true)
        .walk()
        .unwrap()
        .collect();
    assert_eq!(descriptors.len(), 3);

    // Removed between discovery and digesting.
    let gone = descriptors
        .iter()
        .find(|r| r.name == "a.txt")
        .unwrap()
        .path
        .clone();
    fs::remove_file(&gone).unwrap();

    let outcome = WorkerPool::new(2)
        .unwrap()
        .run(descriptors, &DigestEngine::default())
        .unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.summary.digest_failures, 1);
    let failed = outcome.records.iter().find(|r| r.path == gone).unwrap();
    assert!(failed.has_digest_failures());
    assert_eq!(failed.digests.hex(DigestKind::Md5), None);
}
