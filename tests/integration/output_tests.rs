use finddupes::cli::OutputFormat;
use finddupes::duplicates::{DuplicateFinder, FinderConfig};
use finddupes::error::ExitCode;
use finddupes::output::write_report;
use std::fs;
use tempfile::tempdir;

fn scan_fixture() -> (tempfile::TempDir, Vec<u8>, Vec<u8>) {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("b.txt"), "pair").unwrap();
    fs::write(dir.path().join("a.txt"), "pair").unwrap();
    fs::write(dir.path().join("sub/x.txt"), "triple").unwrap();
    fs::write(dir.path().join("sub/y.txt"), "triple").unwrap();
    fs::write(dir.path().join("c.txt"), "triple").unwrap();
    fs::write(dir.path().join("lonely.txt"), "single").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(3));
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    let exit_code = ExitCode::for_duplicate_groups(summary.duplicate_groups);

    let mut text = Vec::new();
    write_report(&mut text, OutputFormat::Text, &groups, &summary, exit_code).unwrap();
    let mut json = Vec::new();
    write_report(&mut json, OutputFormat::Json, &groups, &summary, exit_code).unwrap();

    (dir, text, json)
}

#[test]
fn test_text_report() {
    let (dir, text, _) = scan_fixture();
    let text = String::from_utf8(text).unwrap();
    let root = dir.path();

    let expected = format!(
        "{}\t{}\n{}\t{}\t{}\n",
        root.join("a.txt").display(),
        root.join("b.txt").display(),
        root.join("c.txt").display(),
        root.join("sub/x.txt").display(),
        root.join("sub/y.txt").display(),
    );
    assert_eq!(text, expected);
}

#[test]
fn test_json_report() {
    let (dir, _, json) = scan_fixture();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();

    let groups = value["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(groups[1]["files"].as_array().unwrap().len(), 3);
    assert_eq!(
        groups[0]["files"][0],
        dir.path().join("a.txt").to_string_lossy().into_owned()
    );
    assert_eq!(groups[0]["fingerprint"].as_str().unwrap().len(), 16);

    let summary = &value["summary"];
    assert_eq!(summary["total_files"], 6);
    assert_eq!(summary["unique_files"], 1);
    assert_eq!(summary["duplicate_groups"], 2);
    assert_eq!(summary["duplicate_files"], 3);
    assert_eq!(summary["workers"], 3);
    assert_eq!(summary["exit_code"], 0);
}

#[test]
fn test_no_duplicates_report() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), "1").unwrap();
    fs::write(dir.path().join("two"), "2").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    let exit_code = ExitCode::for_duplicate_groups(summary.duplicate_groups);
    assert_eq!(exit_code, ExitCode::NoDuplicates);

    let mut text = Vec::new();
    write_report(&mut text, OutputFormat::Text, &groups, &summary, exit_code).unwrap();
    assert!(text.is_empty());
}
