//! Concurrency test: many attesters and revokers sharing one ledger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use attested_claims::{
    Attestation, CType, CTypeSchema, Claim, ClaimsError, ClientConfig, ConnectionCache,
    DelegationNode, H256, Identity, InMemoryLedger, Ledger, Permissions, PropertyType,
    RequestBuilder, RequestForAttestation,
};
use serde_json::json;

fn registered_ctype(ledger: &dyn Ledger, owner: &Identity) -> CType {
    let mut ctype = CType::from_schema(
        CTypeSchema::new("Ticket").property("seat", PropertyType::Integer),
        None,
    )
    .unwrap();
    ctype.store(owner, ledger).unwrap();
    ctype
}

fn request(ctype: &CType, claimer: &Identity, seat: i64) -> RequestForAttestation {
    let claim = Claim::from_value(ctype, json!({"seat": seat}), claimer.address()).unwrap();
    RequestBuilder::new(claim).sign(claimer).unwrap()
}

#[test]
fn stress_16_attesters_share_a_ledger() {
    let ledger = Arc::new(InMemoryLedger::new());
    let venue = Identity::from_uri("//Venue").unwrap();
    let ctype = Arc::new(registered_ctype(ledger.as_ref(), &venue));

    let mut handles = Vec::new();
    for thread_id in 0..16 {
        let ledger = Arc::clone(&ledger);
        let ctype = Arc::clone(&ctype);
        handles.push(thread::spawn(move || {
            let attester = Identity::from_uri(&format!("//Box office {thread_id}")).unwrap();
            let claimer = Identity::from_uri(&format!("//Guest {thread_id}")).unwrap();
            for seat in 0..25 {
                let request = request(&ctype, &claimer, seat);
                let attestation = Attestation::issue(&request, &attester, None);
                attestation
                    .store(&attester, ledger.as_ref())
                    .expect("distinct roots never collide");
                assert!(attestation.verify(ledger.as_ref(), None).unwrap());
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(ledger.attestation_count(), 400);
}

#[test]
fn stress_racing_duplicate_attestations_one_wins() {
    let ledger = Arc::new(InMemoryLedger::new());
    let attester = Arc::new(Identity::from_uri("//Venue").unwrap());
    let ctype = registered_ctype(ledger.as_ref(), &attester);
    let claimer = Identity::from_uri("//Guest").unwrap();
    let attestation = Arc::new(Attestation::issue(
        &request(&ctype, &claimer, 7),
        &attester,
        None,
    ));

    let accepted = Arc::new(AtomicUsize::new(0));
    let duplicates = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let ledger = Arc::clone(&ledger);
        let attester = Arc::clone(&attester);
        let attestation = Arc::clone(&attestation);
        let accepted = Arc::clone(&accepted);
        let duplicates = Arc::clone(&duplicates);
        handles.push(thread::spawn(move || {
            match attestation.store(&attester, ledger.as_ref()) {
                Ok(()) => accepted.fetch_add(1, Ordering::SeqCst),
                Err(ClaimsError::DuplicateAttestation(_)) => duplicates.fetch_add(1, Ordering::SeqCst),
                Err(e) => panic!("unexpected error: {e}"),
            };
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(duplicates.load(Ordering::SeqCst), 31);
    assert_eq!(ledger.attestation_count(), 1);
}

#[test]
fn stress_racing_revocations_one_wins() {
    let ledger = Arc::new(InMemoryLedger::new());
    let attester = Arc::new(Identity::from_uri("//Venue").unwrap());
    let ctype = registered_ctype(ledger.as_ref(), &attester);
    let claimer = Identity::from_uri("//Guest").unwrap();
    let attestation = Attestation::issue(&request(&ctype, &claimer, 1), &attester, None);
    attestation.store(&attester, ledger.as_ref()).unwrap();

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    for _ in 0..16 {
        let ledger = Arc::clone(&ledger);
        let attester = Arc::clone(&attester);
        let mut attestation = attestation.clone();
        let outcomes = Arc::clone(&outcomes);
        handles.push(thread::spawn(move || {
            let outcome = attestation.revoke(&attester, ledger.as_ref());
            outcomes.lock().unwrap().push(outcome.is_ok());
            if let Err(e) = outcome {
                assert!(matches!(e, ClaimsError::AlreadyRevoked(_)), "got {e}");
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert!(!attestation.verify(ledger.as_ref(), None).unwrap());
}

#[test]
fn stress_wide_delegation_fanout() {
    let ledger = Arc::new(InMemoryLedger::new());
    let owner = Arc::new(Identity::from_uri("//Venue").unwrap());
    let ctype = registered_ctype(ledger.as_ref(), &owner);
    let root = DelegationNode::new_root(H256::random(), ctype.hash, owner.address());
    root.store(&owner, None, ledger.as_ref()).unwrap();
    let root_id = root.id;

    let mut handles = Vec::new();
    for thread_id in 0..8 {
        let ledger = Arc::clone(&ledger);
        let owner = Arc::clone(&owner);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                let delegate = Identity::from_uri(&format!("//Usher {thread_id}/{i}")).unwrap();
                let node = DelegationNode::new_child(
                    H256::random(),
                    root_id,
                    None,
                    delegate.address(),
                    Permissions::ATTEST,
                );
                let consent = node.sign_invitation(&delegate);
                node.store(&owner, Some(&consent), ledger.as_ref()).unwrap();
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(root.get_children(ledger.as_ref()).unwrap().len(), 80);
    assert_eq!(ledger.delegation_count(), 81);

    root.revoke(&owner, ledger.as_ref()).unwrap();
    for child in root.get_children(ledger.as_ref()).unwrap() {
        assert!(child.revoked);
    }
}

#[test]
fn stress_connection_cache_shared_across_threads() {
    let cache = Arc::new(ConnectionCache::in_memory());
    let config = Arc::new(ClientConfig {
        ledger_endpoint: "ws://ledger-a".into(),
        ..ClientConfig::default()
    });
    let venue = Identity::from_uri("//Venue").unwrap();
    let ctype = registered_ctype(cache.connect_configured(&config).unwrap().as_ref(), &venue);
    let ctype = Arc::new(ctype);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let config = Arc::clone(&config);
        let ctype = Arc::clone(&ctype);
        handles.push(thread::spawn(move || {
            let ledger = cache.connect_configured(&config).unwrap();
            assert!(ctype.verify_stored(ledger.as_ref()).unwrap());
            let same = cache.connect("ws://ledger-a").unwrap();
            assert!(Arc::ptr_eq(&ledger, &same));
            let other = cache.connect("ws://ledger-b").unwrap();
            assert!(!ctype.verify_stored(other.as_ref()).unwrap());
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert!(cache.is_connected(&config.ledger_endpoint));
    assert!(cache.disconnect("ws://ledger-b").unwrap());
    assert!(!cache.is_connected("ws://ledger-b"));
}
