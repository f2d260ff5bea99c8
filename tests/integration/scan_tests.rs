use finddupes::duplicates::{
    find_duplicates, find_duplicates_concurrently, DuplicateFinder, FinderConfig,
};
use finddupes::scanner::{find_files, FingerprintAlgorithm, WalkerConfig};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_find_files_empty_directory() {
    let dir = tempdir().unwrap();

    let files = find_files(&[dir.path()]).unwrap();

    assert!(files.is_empty());
}

#[test]
fn test_find_files_two_levels() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();

    write(&dir.path().join("a.txt"), b"a");
    write(&dir.path().join("b.txt"), b"b");
    write(&sub.join("c.txt"), b"c");
    write(&sub.join("d.txt"), b"d");

    let files = find_files(&[dir.path()]).unwrap();

    assert_eq!(files.len(), 4);
    assert!(files.iter().all(|f| f.starts_with(dir.path())));
    let unique: BTreeSet<&PathBuf> = files.iter().collect();
    assert_eq!(unique.len(), 4);
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.duplicate_group_count(), 0);
    assert_eq!(groups.group_count(), 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.unique_files, 3);
}

#[test]
fn test_one_pair_among_many() {
    let dir = tempdir().unwrap();
    let n = 25;
    for i in 0..n {
        write(&dir.path().join(format!("f{i:02}")), format!("body {i}").as_bytes());
    }
    write(&dir.path().join("f07"), b"shared");
    write(&dir.path().join("f19"), b"shared");

    let files = find_files(&[dir.path()]).unwrap();
    let groups = find_duplicates_concurrently(&files).unwrap();

    let sizes: Vec<usize> = groups.iter().map(|(_, paths)| paths.len()).collect();
    assert_eq!(sizes.iter().filter(|&&s| s == 2).count(), 1);
    assert_eq!(sizes.iter().filter(|&&s| s == 1).count(), n - 2);

    let (_, pair) = groups.duplicates().next().unwrap();
    let pair: BTreeSet<PathBuf> = pair.iter().cloned().collect();
    let expected: BTreeSet<PathBuf> = [dir.path().join("f07"), dir.path().join("f19")]
        .into_iter()
        .collect();
    assert_eq!(pair, expected);
}

#[test]
fn test_scan_nested_duplicates() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("a/b/c");
    fs::create_dir_all(&deep).unwrap();

    write(&dir.path().join("top.bin"), b"same bytes");
    write(&deep.join("bottom.bin"), b"same bytes");
    write(&dir.path().join("a/middle.bin"), b"other bytes");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(
        groups.fingerprint_of(&dir.path().join("top.bin")),
        groups.fingerprint_of(&deep.join("bottom.bin"))
    );
}

#[test]
fn test_empty_files_group_together() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");
    write(&dir.path().join("full"), b"x");

    let files = find_files(&[dir.path()]).unwrap();
    let groups = find_duplicates(&files).unwrap();

    let (_, empties) = groups.duplicates().next().unwrap();
    assert_eq!(empties.len(), 2);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(&dir.path().join(format!("f{i}")), &[(i % 4) as u8; 64]);
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
    let (first, _) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    let (second, _) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(first.membership(), second.membership());
    assert_eq!(first.duplicate_group_count(), 4);
}

#[test]
fn test_concurrent_matches_sequential_for_every_algorithm() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let content = vec![(i % 5) as u8; 1000 + (i % 2) * 10];
        write(&dir.path().join(format!("file{i}")), &content);
    }

    for algorithm in [
        FingerprintAlgorithm::Fnv1a,
        FingerprintAlgorithm::Xxh3,
        FingerprintAlgorithm::Blake3,
    ] {
        let base = FinderConfig::default()
            .with_algorithm(algorithm)
            .with_buffer_size(100);
        let concurrent = DuplicateFinder::new(base.clone().with_workers(8));
        let sequential = DuplicateFinder::new(base.with_sequential(true));

        let (a, _) = concurrent
            .find_duplicates_in_paths(&[dir.path().to_path_buf()])
            .unwrap();
        let (b, summary) = sequential
            .find_duplicates_in_paths(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(a.membership(), b.membership(), "{algorithm}");
        assert_eq!(summary.workers, 1);
    }
}

#[test]
fn test_filters_apply_during_scan() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".cache")).unwrap();
    fs::create_dir(dir.path().join("build")).unwrap();

    write(&dir.path().join("keep.txt"), b"dup");
    write(&dir.path().join(".cache/hidden.txt"), b"dup");
    write(&dir.path().join("build/out.txt"), b"dup");
    write(&dir.path().join("notes.tmp"), b"dup");

    let walker_config = WalkerConfig::new(
        true,
        false,
        vec!["build".to_string(), "*.tmp".to_string()],
    );
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(groups.duplicate_group_count(), 0);
}
