use assert_cmd::Command;
use predicates::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("test_resources")
        .join("CRNX")
        .join(name)
}

/// Private copy of a fixture, in a dedicated directory
fn workspace_copy(test: &str, name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let dir = std::env::temp_dir().join(format!("crx2rnx-{}-{}", test, nanos));
    fs::create_dir_all(&dir).unwrap();
    let target = dir.join(Path::new(name).file_name().unwrap());
    fs::copy(resource(name), &target).unwrap();
    target
}

fn assert_same_lines(path: &Path, model: &str) {
    let content = fs::read_to_string(path).unwrap();
    let model = fs::read_to_string(resource(model)).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        model.lines().collect::<Vec<_>>()
    );
}

#[test]
fn single_file_custom_output() {
    let input = workspace_copy("custom", "V1/demo0010.21d");
    let output = input.with_file_name("custom.21o");
    Command::cargo_bin("crx2rnx")
        .unwrap()
        .arg("-f")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert_same_lines(&output, "V1/demo0010.21o");
    assert!(input.exists());
}

#[test]
fn several_files_in_parallel() {
    let v1 = workspace_copy("parallel", "V1/demo0010.21d");
    let v3 = workspace_copy("parallel", "V3/DEMO00FRA_R_20220630000_01H_30S_MO.crx");
    Command::cargo_bin("crx2rnx")
        .unwrap()
        .args(["-j", "2", "--delete"])
        .arg("-f")
        .arg(&v1)
        .arg("-f")
        .arg(&v3)
        .assert()
        .success();

    assert_same_lines(&v1.with_extension("21o"), "V1/demo0010.21o");
    assert_same_lines(
        &v3.with_extension("rnx"),
        "V3/DEMO00FRA_R_20220630000_01H_30S_MO.rnx",
    );
    assert!(!v1.exists());
    assert!(!v3.exists());
}

#[test]
fn custom_output_needs_single_input() {
    let output = std::env::temp_dir().join("crx2rnx-ambiguous.rnx");
    Command::cargo_bin("crx2rnx")
        .unwrap()
        .arg("-f")
        .arg(resource("V1/demo0010.21d"))
        .arg("-f")
        .arg(resource("V1/corr0010.21d"))
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("AmbiguousOutput"));
    assert!(!output.exists());
}

#[test]
fn failures_are_reported() {
    let good = workspace_copy("failures", "V1/demo0010.21d");
    let missing = good.with_file_name("missing0010.21d");
    Command::cargo_bin("crx2rnx")
        .unwrap()
        .args(["--delete", "-j", "4"])
        .arg("-f")
        .arg(&good)
        .arg("-f")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failures(1)"));
    // others are still processed
    assert!(good.with_extension("21o").exists());
    assert!(!good.exists());
}

#[test]
fn strict_truncation() {
    let input = workspace_copy("strict", "V1/demo0010.21d");
    let content = fs::read_to_string(&input).unwrap();
    let lines = content.lines().collect::<Vec<_>>();
    fs::write(&input, lines[..lines.len() - 1].join("\n")).unwrap();

    Command::cargo_bin("crx2rnx")
        .unwrap()
        .arg("-f")
        .arg(&input)
        .assert()
        .success();
    assert!(input.with_extension("21o").exists());

    Command::cargo_bin("crx2rnx")
        .unwrap()
        .arg("--strict")
        .arg("--delete")
        .arg("-f")
        .arg(&input)
        .assert()
        .failure();
    assert!(!input.with_extension("21o").exists());
    assert!(input.exists());
}

#[test]
fn max_order_limit() {
    let input = workspace_copy("order", "V1/demo0010.21d");
    Command::cargo_bin("crx2rnx")
        .unwrap()
        .args(["--max-order", "1"])
        .arg("-f")
        .arg(&input)
        .assert()
        .failure();
}
