use finddupes::duplicates::{DuplicateFinder, FinderConfig};
use finddupes::scanner::{find_files, WalkerConfig};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_disjoint_roots_union() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    fs::write(dir1.path().join("a.txt"), "one").unwrap();
    fs::create_dir(dir1.path().join("sub")).unwrap();
    fs::write(dir1.path().join("sub/b.txt"), "two").unwrap();
    fs::write(dir2.path().join("c.txt"), "three").unwrap();

    let files = find_files(&[dir1.path(), dir2.path()]).unwrap();

    let found: BTreeSet<PathBuf> = files.iter().cloned().collect();
    let expected: BTreeSet<PathBuf> = [
        dir1.path().join("a.txt"),
        dir1.path().join("sub/b.txt"),
        dir2.path().join("c.txt"),
    ]
    .into_iter()
    .collect();

    assert_eq!(files.len(), 3);
    assert_eq!(found, expected);
}

#[test]
fn test_duplicates_across_roots() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    fs::write(dir1.path().join("photo.jpg"), "same pixels").unwrap();
    fs::write(dir2.path().join("photo copy.jpg"), "same pixels").unwrap();
    fs::write(dir2.path().join("other.jpg"), "other pixels").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.roots, 2);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 1);

    let (_, paths) = groups.duplicates().next().unwrap();
    assert!(paths.contains(&dir1.path().join("photo.jpg")));
    assert!(paths.contains(&dir2.path().join("photo copy.jpg")));
}

#[test]
fn test_same_root_twice_reports_no_self_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), "alone").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(groups.duplicate_group_count(), 0);
}

#[test]
fn test_nested_root_is_not_walked_twice() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("file.txt"), "content").unwrap();
    fs::write(dir.path().join("top.txt"), "different").unwrap();

    let files = find_files(&[nested.clone(), dir.path().to_path_buf()]).unwrap();

    assert_eq!(files.len(), 2);
    let unique: BTreeSet<&PathBuf> = files.iter().collect();
    assert_eq!(unique.len(), 2);
}

#[test]
fn test_missing_root_fails_whole_walk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();

    let result = find_files(&[dir.path().to_path_buf(), dir.path().join("does-not-exist")]);

    assert!(result.is_err());
}

#[test]
fn test_filters_never_hide_a_named_root() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join(".cache");
    let build = dir.path().join("build");
    fs::create_dir(&cache).unwrap();
    fs::create_dir(&build).unwrap();
    fs::write(dir.path().join("keep.txt"), "same").unwrap();
    fs::write(cache.join("copy.txt"), "same").unwrap();
    fs::write(build.join("copy.txt"), "same").unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(
        true,
        false,
        vec!["build".to_string()],
    ));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates_in_paths(&[dir.path().to_path_buf(), cache.clone(), build.clone()])
        .unwrap();

    assert_eq!(summary.total_files, 3);
    let (_, paths) = groups.duplicates().next().unwrap();
    assert_eq!(paths.len(), 3);
}
