use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn data_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "x1;x2;target").unwrap();
    for i in 0..40 {
        let class = if i < 20 { 0 } else { 1 };
        writeln!(file, "{};{};{}", i, (i * 7) % 5, class).unwrap();
    }
    file
}

#[test]
fn run_prints_report_and_dumps_predictions() {
    let data = data_file();
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("pred.tsv");

    let output = Command::new(env!("CARGO_BIN_EXE_boostline"))
        .args(["run", "--data"])
        .arg(data.path())
        .args(["--separator", ";", "--seed", "1", "--cv-folds", "3"])
        .args(["--classifier-param", "n_estimators=10"])
        .arg("--dump-file")
        .arg(&dump)
        .args(["--dump-format", "tsv"])
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rows=40, features=2, classes=2, train=30, test=10"));
    assert!(stdout.contains("cv_acc="));

    let dumped = std::fs::read_to_string(&dump).unwrap();
    assert_eq!(dumped.lines().next(), Some("row\tpredicted\tactual"));
    assert_eq!(dumped.lines().count(), 11);
}

#[test]
fn missing_target_column_fails() {
    let data = data_file();
    let output = Command::new(env!("CARGO_BIN_EXE_boostline"))
        .args(["run", "--data"])
        .arg(data.path())
        .args(["--separator", ";", "--target", "label"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("label"), "stderr: {stderr}");
}
