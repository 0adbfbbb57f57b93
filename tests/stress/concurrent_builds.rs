//! Concurrency test: parallel request building, redaction and verification.
//!
//! Requests are immutable once signed, so shared copies can be redacted and
//! verified from many threads without coordination.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use attested_claims::{
    Attestation, AttestedClaim, CType, CTypeSchema, Claim, Identity, PropertyType, RequestBuilder,
};
use serde_json::json;

fn ctype() -> CType {
    CType::from_schema(
        CTypeSchema::new("Sensor reading")
            .property("device", PropertyType::String)
            .property("value", PropertyType::Number)
            .property("ok", PropertyType::Boolean),
        None,
    )
    .unwrap()
}

#[test]
fn stress_32_threads_build_and_sign() {
    let ctype = Arc::new(ctype());
    let claimer = Arc::new(Identity::from_uri("//Sensor").unwrap());
    let roots = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for thread_id in 0..32 {
        let ctype = Arc::clone(&ctype);
        let claimer = Arc::clone(&claimer);
        let roots = Arc::clone(&roots);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let claim = Claim::from_value(
                    ctype.as_ref(),
                    json!({"device": format!("dev-{thread_id}"), "value": i as f64 * 0.5, "ok": true}),
                    claimer.address(),
                )
                .expect("contents match the ctype");
                let request = RequestBuilder::new(claim)
                    .sign(&claimer)
                    .expect("signing should succeed");
                assert!(request.verify_data().unwrap());
                roots.lock().unwrap().push(request.root_hash);
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    let roots = roots.lock().unwrap();
    assert_eq!(roots.len(), 800);
    // Fresh nonces make every root unique, even for equal contents.
    let unique: HashSet<_> = roots.iter().collect();
    assert_eq!(unique.len(), 800);
}

#[test]
fn stress_identical_claims_get_distinct_roots() {
    let ctype = ctype();
    let claimer = Identity::from_uri("//Sensor").unwrap();
    let mut seen = HashSet::new();

    for _ in 0..200 {
        let claim = Claim::from_value(
            &ctype,
            json!({"device": "dev", "value": 1.0, "ok": false}),
            claimer.address(),
        )
        .unwrap();
        let request = RequestBuilder::new(claim).sign(&claimer).unwrap();
        assert!(seen.insert(request.root_hash), "root hashes must not repeat");
    }
}

#[test]
fn stress_shared_credential_redacted_concurrently() {
    let claimer = Identity::from_uri("//Sensor").unwrap();
    let attester = Identity::from_uri("//Lab").unwrap();
    let claim = Claim::from_value(
        &ctype(),
        json!({"device": "dev-1", "value": 21.5, "ok": true}),
        claimer.address(),
    )
    .unwrap();
    let request = RequestBuilder::new(claim).sign(&claimer).unwrap();
    let attestation = Attestation::issue(&request, &attester, None);
    let credential = Arc::new(AttestedClaim::new(request, attestation).unwrap());

    let subsets: [&[&str]; 4] = [&[], &["device"], &["value", "ok"], &["device", "value", "ok"]];

    let mut handles = Vec::new();
    for thread_id in 0..16 {
        let credential = Arc::clone(&credential);
        let hidden: Vec<String> = subsets[thread_id % subsets.len()]
            .iter()
            .map(|s| s.to_string())
            .collect();
        handles.push(thread::spawn(move || {
            for _ in 0..20 {
                let presentation = credential
                    .create_presentation(&hidden, false)
                    .expect("hidden attributes are disclosed on the original");
                assert!(presentation.verify_data().unwrap());
                assert_eq!(
                    presentation.request.claim.contents.len(),
                    3 - hidden.len()
                );
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    // The shared original was never touched.
    assert_eq!(credential.request.claim.contents.len(), 3);
    assert!(credential.verify_data().unwrap());
}
