use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "\
Seller: ACME TRADING LIMITED
Seller PIN: P051234567Q
Invoice No: KRASRN000314580
Date: 17/12/2025
Buyer PIN: A014019184W
Total Amount: KES 60,000.00
";

fn etims(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("etims").unwrap();
    // Never pick up a real user config.
    cmd.arg("--config").arg(dir.path().join("config.json"));
    cmd
}

fn init_config(dir: &TempDir) {
    etims(dir).args(["config", "init"]).assert().success();
}

#[test]
fn test_extract_json() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = dir.path().join("invoice.txt");
    fs::write(&input, INVOICE).unwrap();

    let output = etims(&dir).arg("extract").arg(&input).output().unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["invoice_number"], "KRASRN000314580");
    assert_eq!(record["invoice_amount"], "60000.00");
    assert_eq!(record["invoice_date"], "2025-12-17");
    assert_eq!(record["supplier_kra_pin"], "P051234567Q");
    assert_eq!(record["buyer_kra_pin"], "A014019184W");
    assert_eq!(record["seller_details"]["name"], "ACME TRADING LIMITED");
    assert_eq!(record["extraction_success"], true);
}

#[test]
fn test_extract_from_stdin_with_user_values() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let user_values = dir.path().join("user.json");
    fs::write(&user_values, r#"{"due_date": "2026-02-14"}"#).unwrap();

    etims(&dir)
        .args(["extract", "-"])
        .arg("--user-values")
        .arg(&user_values)
        .write_stdin(INVOICE)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"due_date\": \"2026-02-14\""))
        .stdout(predicate::str::contains("\"extraction_success\": true"));
}

#[test]
fn test_extract_text_format_with_confidence() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = dir.path().join("invoice.txt");
    fs::write(&input, INVOICE).unwrap();

    etims(&dir)
        .arg("extract")
        .arg(&input)
        .args(["-f", "text", "--show-confidence"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: complete"))
        .stdout(predicate::str::contains("supplier_kra_pin"));
}

#[test]
fn test_extract_missing_file() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);

    etims(&dir)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_extract_empty_input() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);

    etims(&dir)
        .args(["extract", "-"])
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn test_batch_with_summary() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let inputs = dir.path().join("inputs");
    let outputs = dir.path().join("outputs");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), INVOICE).unwrap();
    fs::write(inputs.join("b.txt"), "Thank you for your business").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());
    etims(&dir)
        .args(["batch", &pattern, "--summary", "-j", "2"])
        .arg("-o")
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 incomplete, 0 failed"));

    assert!(outputs.join("a.json").exists());
    assert!(outputs.join("b.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("a.txt,success,KRASRN000314580,60000.00"));
    assert!(lines[2].starts_with("b.txt,incomplete,"));
}

#[test]
fn test_batch_no_matches() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let pattern = format!("{}/*.txt", dir.path().join("empty").display());

    etims(&dir)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_config_get_and_set() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);

    etims(&dir)
        .args(["config", "get", "extraction.review_threshold"])
        .assert()
        .success()
        .stdout("0.7\n");

    etims(&dir)
        .args(["config", "set", "extraction.include_raw_text", "true"])
        .assert()
        .success();

    etims(&dir)
        .args(["config", "get", "extraction.include_raw_text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    etims(&dir)
        .args(["config", "set", "scoring.rank_step", "0.02"])
        .assert()
        .success();

    etims(&dir)
        .args(["config", "get", "scoring.rank_step"])
        .assert()
        .success()
        .stdout("0.02\n");

    // Would let a corrected identifier outscore an exact one.
    etims(&dir)
        .args(["config", "set", "scoring.rank_step", "0.05"])
        .assert()
        .failure();

    etims(&dir)
        .args(["config", "set", "scoring.no_such_weight", "1"])
        .assert()
        .failure();

    etims(&dir)
        .args(["config", "set", "extraction.review_threshold", "3"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);

    etims(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    etims(&dir).args(["config", "init", "--force"]).assert().success();
}
