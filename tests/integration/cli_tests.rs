//! Integration tests for the CLI binary.
//!
//! Drives the `claims` binary end to end against a throwaway `$HOME`.
//!
//! This test is registered as a [[test]] in the attested-claims-cli crate
//! so that CARGO_BIN_EXE_claims is available.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use attested_claims::{
    Attestation, AttestedClaim, CType, CTypeSchema, Claim, Compress, Identity, PropertyType,
    RequestBuilder, RequestForAttestation,
};
use serde_json::json;

const PASSPHRASE: &str = "correct horse battery staple";

/// Get a Command pointing to the `claims` binary.
fn claims_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_claims"))
}

/// A command isolated under `home` with the passphrase supplied via env.
fn claims_in(home: &Path) -> Command {
    let mut cmd = claims_binary();
    cmd.env("HOME", home).env("CLAIMS_PASSPHRASE", PASSPHRASE);
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn person_schema() -> CTypeSchema {
    CTypeSchema::new("Person")
        .property("name", PropertyType::String)
        .property("age", PropertyType::Integer)
}

fn write_schema(dir: &Path) -> PathBuf {
    let path = dir.join("person.json");
    std::fs::write(&path, serde_json::to_string_pretty(&person_schema()).unwrap()).unwrap();
    path
}

fn write_credential(dir: &Path) -> (PathBuf, AttestedClaim) {
    let claimer = Identity::from_uri("//Alice").unwrap();
    let attester = Identity::from_uri("//Attester").unwrap();
    let ctype = CType::from_schema(person_schema(), None).unwrap();
    let claim =
        Claim::from_value(&ctype, json!({"name": "Alice", "age": 29}), claimer.address()).unwrap();
    let request = RequestBuilder::new(claim).sign(&claimer).unwrap();
    let attestation = Attestation::issue(&request, &attester, None);
    let credential = AttestedClaim::new(request, attestation).unwrap();

    let path = dir.join("credential.json");
    std::fs::write(&path, serde_json::to_string(&credential).unwrap()).unwrap();
    (path, credential)
}

#[test]
fn cli_responds_to_help() {
    let output = claims_binary()
        .arg("--help")
        .output()
        .expect("failed to execute claims --help");

    assert_success(&output, "claims --help");
    let stdout = stdout(&output);
    assert!(
        stdout.contains("claims") || stdout.contains("Usage"),
        "claims --help output should contain usage information, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = claims_binary()
        .arg("--version")
        .output()
        .expect("failed to execute claims --version");

    assert_success(&output, "claims --version");
    let stdout = stdout(&output);
    assert!(
        stdout.contains("0.3"),
        "claims --version should contain version info, got: {stdout}"
    );
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = claims_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute claims");

    assert!(
        !output.status.success(),
        "claims --nonexistent-flag should exit with failure"
    );
}

#[test]
fn ctype_hash_matches_library() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path());

    let output = claims_in(dir.path())
        .args(["ctype", "hash"])
        .arg(&schema)
        .output()
        .expect("failed to execute claims ctype hash");

    assert_success(&output, "claims ctype hash");
    let expected = CType::from_schema(person_schema(), None).unwrap().hash;
    assert_eq!(stdout(&output).trim(), expected.to_string());
}

#[test]
fn ctype_hash_rejects_bad_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"title": "x"}"#).unwrap();

    let output = claims_in(dir.path())
        .args(["ctype", "hash"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn ctype_hash_rejects_keywords_outside_meta_schema() {
    let dir = tempfile::tempdir().unwrap();
    let mut schema = serde_json::to_value(person_schema()).unwrap();
    schema["required"] = json!(["name"]);
    let path = dir.path().join("strict.json");
    std::fs::write(&path, schema.to_string()).unwrap();

    let output = claims_in(dir.path())
        .args(["ctype", "hash"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid CType schema"));
}

#[test]
fn identity_new_then_show() {
    let dir = tempfile::tempdir().unwrap();

    let created = claims_in(dir.path())
        .args(["--identity", "alice", "identity", "new", "--name", "Alice"])
        .output()
        .unwrap();
    assert_success(&created, "claims identity new");
    assert!(dir
        .path()
        .join(".attested-claims/keystore/alice.json")
        .exists());

    let shown = claims_in(dir.path())
        .args(["--identity", "alice", "identity", "show"])
        .output()
        .unwrap();
    assert_success(&shown, "claims identity show");
    let public: serde_json::Value = serde_json::from_str(&stdout(&shown)).unwrap();
    assert!(public["address"].as_str().is_some());

    let again = claims_in(dir.path())
        .args(["--identity", "alice", "identity", "new"])
        .output()
        .unwrap();
    assert!(!again.status.success(), "existing identity must not be overwritten");
}

#[test]
fn request_build_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path());
    let request_path = dir.path().join("request.json");

    assert_success(
        &claims_in(dir.path()).args(["identity", "new"]).output().unwrap(),
        "claims identity new",
    );

    let built = claims_in(dir.path())
        .args(["request", "build", "--ctype"])
        .arg(&schema)
        .args(["--contents", r#"{"name": "Bob", "age": 40}"#, "--output"])
        .arg(&request_path)
        .output()
        .unwrap();
    assert_success(&built, "claims request build");

    let request: RequestForAttestation =
        serde_json::from_str(&std::fs::read_to_string(&request_path).unwrap()).unwrap();
    assert!(request.verify_data().unwrap());
    assert_eq!(request.claim.contents["name"], "Bob");

    let verified = claims_in(dir.path())
        .args(["request", "verify"])
        .arg(&request_path)
        .output()
        .unwrap();
    assert_success(&verified, "claims request verify");
    assert!(stdout(&verified).contains("Result: VALID"));
}

#[test]
fn request_build_rejects_contents_outside_ctype() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path());
    assert_success(
        &claims_in(dir.path()).args(["identity", "new"]).output().unwrap(),
        "claims identity new",
    );

    let output = claims_in(dir.path())
        .args(["request", "build", "--ctype"])
        .arg(&schema)
        .args(["--contents", r#"{"name": "Bob", "age": "forty"}"#])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn request_build_with_wrong_passphrase_fails() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path());
    assert_success(
        &claims_in(dir.path()).args(["identity", "new"]).output().unwrap(),
        "claims identity new",
    );

    let output = claims_in(dir.path())
        .env("CLAIMS_PASSPHRASE", "wrong")
        .args(["request", "build", "--ctype"])
        .arg(&schema)
        .args(["--contents", r#"{"name": "Bob"}"#])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn tampered_request_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let (_, credential) = write_credential(dir.path());
    let mut request = credential.request.clone();
    request.claim.contents.insert("age".into(), json!(30));
    let path = dir.path().join("tampered.json");
    std::fs::write(&path, serde_json::to_string(&request).unwrap()).unwrap();

    let output = claims_in(dir.path())
        .args(["request", "verify"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn presentation_hides_attributes_and_still_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let (credential_path, credential) = write_credential(dir.path());
    let presentation_path = dir.path().join("presentation.json");

    let created = claims_in(dir.path())
        .args(["presentation", "create"])
        .arg(&credential_path)
        .args(["--exclude", "age", "--compress", "--output"])
        .arg(&presentation_path)
        .output()
        .unwrap();
    assert_success(&created, "claims presentation create");

    let packed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&presentation_path).unwrap()).unwrap();
    let presentation = AttestedClaim::decompress(&packed).unwrap();
    assert!(presentation.request.claim.contents.get("age").is_none());
    assert_eq!(presentation.request.root_hash, credential.request.root_hash);

    let verified = claims_in(dir.path())
        .args(["credential", "verify-data"])
        .arg(&presentation_path)
        .output()
        .unwrap();
    assert_success(&verified, "claims credential verify-data");
    assert!(stdout(&verified).contains("Result: VALID"));
}

#[test]
fn presentation_without_owner_is_unverifiable() {
    let dir = tempfile::tempdir().unwrap();
    let (credential_path, _) = write_credential(dir.path());
    let presentation_path = dir.path().join("anonymous.json");

    let created = claims_in(dir.path())
        .args(["presentation", "create"])
        .arg(&credential_path)
        .args(["--exclude-owner", "--output"])
        .arg(&presentation_path)
        .output()
        .unwrap();
    assert_success(&created, "claims presentation create --exclude-owner");

    let presentation: AttestedClaim =
        serde_json::from_str(&std::fs::read_to_string(&presentation_path).unwrap()).unwrap();
    assert!(presentation.request.claim.owner.is_none());

    let verified = claims_in(dir.path())
        .args(["credential", "verify-data"])
        .arg(&presentation_path)
        .output()
        .unwrap();
    assert!(!verified.status.success());
    assert!(stdout(&verified).contains("Result: INVALID"));
}

#[test]
fn presentation_of_unknown_attribute_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (credential_path, _) = write_credential(dir.path());

    let output = claims_in(dir.path())
        .args(["presentation", "create"])
        .arg(&credential_path)
        .args(["--exclude", "email"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
