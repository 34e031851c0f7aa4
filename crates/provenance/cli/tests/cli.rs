use assert_cmd::Command;
use predicates::prelude::*;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/demo.json");

fn provenance() -> Command {
    let mut cmd = Command::cargo_bin("provenance").unwrap();
    cmd.env_remove("PROVENANCE_CONFIG")
        .env_remove("RUST_LOG")
        .args(["--fixture", FIXTURE]);
    cmd
}

#[test]
fn timeline_json_lists_lifecycle_in_order() {
    let output = provenance()
        .args(["--json", "timeline", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let timeline: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let types: Vec<&str> = timeline["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec!["manufacture", "transfer", "warranty_claim", "service"]
    );
    assert_eq!(timeline["events"][2]["status"], "approved");
}

#[test]
fn roles_for_manufacturer() {
    provenance()
        .args(["--json", "roles", "0x1111111111111111111111111111111111111111"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"manufacturer\": true"))
        .stdout(predicate::str::contains("\"admin\": false"));
}

#[test]
fn verify_by_serial_finds_product() {
    provenance()
        .args(["verify", "PX-0002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Product #2 is registered"));
}

#[test]
fn verify_unknown_serial() {
    provenance()
        .args(["verify", "PX-9999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No product matches"));
}

#[test]
fn claims_listing() {
    provenance()
        .args(["--json", "claims"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Screen flickers"));
}

#[test]
fn malformed_address_fails() {
    provenance()
        .args(["holdings", "0x1234"])
        .assert()
        .failure();
}
