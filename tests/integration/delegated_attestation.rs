//! Integration test: attesting under a delegation hierarchy.
//!
//! An authority owns a root for a CType and delegates to a regional
//! office, which delegates attest rights to a clerk. The clerk's
//! attestations are only accepted while the chain above it stands, and
//! any owner along the chain may revoke below itself.

use attested_claims::{
    Attestation, AttestedClaim, CType, CTypeSchema, Claim, ClaimsError, DelegationNode, H256,
    Identity, InMemoryLedger, Permissions, PropertyType, RequestBuilder,
};
use serde_json::json;

struct Hierarchy {
    ledger: InMemoryLedger,
    ctype: CType,
    authority: Identity,
    office: Identity,
    clerk: Identity,
    root: DelegationNode,
    office_node: DelegationNode,
    clerk_node: DelegationNode,
}

fn hierarchy() -> Hierarchy {
    let ledger = InMemoryLedger::new();
    let authority = Identity::from_uri("//Authority").unwrap();
    let office = Identity::from_uri("//Office").unwrap();
    let clerk = Identity::from_uri("//Clerk").unwrap();

    let mut ctype = CType::from_schema(
        CTypeSchema::new("Residence permit")
            .property("name", PropertyType::String)
            .property("city", PropertyType::String),
        None,
    )
    .unwrap();
    ctype.store(&authority, &ledger).unwrap();

    let root = DelegationNode::new_root(H256::random(), ctype.hash, authority.address());
    root.store(&authority, None, &ledger).unwrap();

    let office_node = DelegationNode::new_child(
        H256::random(),
        root.id,
        None,
        office.address(),
        Permissions::ATTEST | Permissions::DELEGATE,
    );
    let consent = office_node.sign_invitation(&office);
    office_node
        .store(&authority, Some(&consent), &ledger)
        .expect("authority owns the root");

    let clerk_node = DelegationNode::new_child(
        H256::random(),
        root.id,
        Some(office_node.id),
        clerk.address(),
        Permissions::ATTEST,
    );
    let consent = clerk_node.sign_invitation(&clerk);
    clerk_node
        .store(&office, Some(&consent), &ledger)
        .expect("office may delegate");

    Hierarchy {
        ledger,
        ctype,
        authority,
        office,
        clerk,
        root,
        office_node,
        clerk_node,
    }
}

fn attest_as_clerk(h: &Hierarchy, name: &str) -> AttestedClaim {
    let claimer = Identity::from_uri(&format!("//{name}")).unwrap();
    let claim = Claim::from_value(
        &h.ctype,
        json!({"name": name, "city": "Berlin"}),
        claimer.address(),
    )
    .unwrap();
    let request = RequestBuilder::new(claim)
        .delegation(h.clerk_node.id)
        .sign(&claimer)
        .unwrap();
    let attestation = Attestation::issue(&request, &h.clerk, None);
    assert_eq!(attestation.delegation_id, Some(h.clerk_node.id));
    attestation
        .store(&h.clerk, &h.ledger)
        .expect("clerk holds the attest permission");
    AttestedClaim::new(request, attestation).unwrap()
}

#[test]
fn hierarchy_is_navigable() {
    let h = hierarchy();
    assert!(h.root.verify(&h.ledger).unwrap());
    assert!(h.clerk_node.verify(&h.ledger).unwrap());

    let parent = h.clerk_node.get_parent(&h.ledger).unwrap().unwrap();
    assert_eq!(parent.id, h.office_node.id);
    assert_eq!(h.clerk_node.get_root(&h.ledger).unwrap().id, h.root.id);
    assert_eq!(h.root.subtree_node_count(&h.ledger).unwrap(), 2);

    let children = h.root.get_children(&h.ledger).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, h.office_node.id);

    let (steps, owner) = h
        .clerk_node
        .find_ancestor_owned_by(&h.authority.address(), &h.ledger)
        .unwrap()
        .unwrap();
    assert_eq!(steps, 2);
    assert_eq!(owner.id, h.root.id);

    let found = DelegationNode::query(&h.ledger, &h.root.id).unwrap().unwrap();
    assert!(found.is_root());
}

#[test]
fn delegated_attestation_verifies() {
    let h = hierarchy();
    let credential = attest_as_clerk(&h, "Alice");
    assert!(credential.verify(&h.ledger).unwrap());
    assert_eq!(h.ledger.attestation_count(), 1);
}

#[test]
fn clerk_cannot_delegate_further() {
    let h = hierarchy();
    let intern = Identity::from_uri("//Intern").unwrap();
    let node = DelegationNode::new_child(
        H256::random(),
        h.root.id,
        Some(h.clerk_node.id),
        intern.address(),
        Permissions::ATTEST,
    );
    let consent = node.sign_invitation(&intern);
    assert!(matches!(
        node.store(&h.clerk, Some(&consent), &h.ledger),
        Err(ClaimsError::NotPermitted(_))
    ));
}

#[test]
fn forged_consent_rejected() {
    let h = hierarchy();
    let intern = Identity::from_uri("//Intern").unwrap();
    let node = DelegationNode::new_child(
        H256::random(),
        h.root.id,
        Some(h.office_node.id),
        intern.address(),
        Permissions::ATTEST,
    );
    // Signed by the office instead of the delegate.
    let consent = node.sign_invitation(&h.office);
    assert!(node.store(&h.office, Some(&consent), &h.ledger).is_err());
    assert!(node.store(&h.office, None, &h.ledger).is_err());
}

#[test]
fn delegation_for_other_ctype_rejected() {
    let h = hierarchy();
    let claimer = Identity::from_uri("//Alice").unwrap();
    let mut other = CType::from_schema(
        CTypeSchema::new("Library card").property("name", PropertyType::String),
        None,
    )
    .unwrap();
    other.store(&h.authority, &h.ledger).unwrap();

    let claim = Claim::from_value(&other, json!({"name": "Alice"}), claimer.address()).unwrap();
    let request = RequestBuilder::new(claim).sign(&claimer).unwrap();
    let attestation = Attestation::issue(&request, &h.clerk, Some(h.clerk_node.id));
    assert!(matches!(
        attestation.store(&h.clerk, &h.ledger),
        Err(ClaimsError::NotPermitted(_))
    ));
}

#[test]
fn ancestor_may_revoke_delegated_attestation() {
    let h = hierarchy();
    let credential = attest_as_clerk(&h, "Alice");

    let mut attestation = credential.attestation.clone();
    attestation
        .revoke(&h.authority, &h.ledger)
        .expect("root owner is an ancestor of the clerk");
    assert!(!credential.verify(&h.ledger).unwrap());
}

#[test]
fn unrelated_identity_may_not_revoke() {
    let h = hierarchy();
    let credential = attest_as_clerk(&h, "Alice");
    let stranger = Identity::from_uri("//Stranger").unwrap();

    let mut attestation = credential.attestation.clone();
    assert!(matches!(
        attestation.revoke(&stranger, &h.ledger),
        Err(ClaimsError::NotPermitted(_))
    ));
    assert!(credential.verify(&h.ledger).unwrap());
}

#[test]
fn revoking_a_node_revokes_its_subtree() {
    let h = hierarchy();
    let before = attest_as_clerk(&h, "Alice");

    h.office_node
        .revoke(&h.authority, &h.ledger)
        .expect("authority owns the root above the office");
    assert!(!h.office_node.verify(&h.ledger).unwrap());
    assert!(!h.clerk_node.verify(&h.ledger).unwrap());
    assert!(h.root.verify(&h.ledger).unwrap());

    // Existing attestations stand; new ones under the revoked node do not.
    assert!(before.verify(&h.ledger).unwrap());
    let claimer = Identity::from_uri("//Bob").unwrap();
    let claim = Claim::from_value(&h.ctype, json!({"name": "Bob"}), claimer.address()).unwrap();
    let request = RequestBuilder::new(claim)
        .delegation(h.clerk_node.id)
        .sign(&claimer)
        .unwrap();
    let attestation = Attestation::issue(&request, &h.clerk, None);
    assert!(matches!(
        attestation.store(&h.clerk, &h.ledger),
        Err(ClaimsError::DelegationRevoked(_))
    ));
}

#[test]
fn clerk_cannot_revoke_office() {
    let h = hierarchy();
    assert!(matches!(
        h.office_node.revoke(&h.clerk, &h.ledger),
        Err(ClaimsError::NotPermitted(_))
    ));
    assert!(h.office_node.verify(&h.ledger).unwrap());
}

#[test]
fn revoking_root_revokes_everything() {
    let h = hierarchy();
    h.root.revoke(&h.authority, &h.ledger).unwrap();
    assert!(!h.root.verify(&h.ledger).unwrap());
    assert!(!h.office_node.verify(&h.ledger).unwrap());
    assert!(!h.clerk_node.verify(&h.ledger).unwrap());

    assert!(matches!(
        h.root.revoke(&h.office, &h.ledger),
        Err(ClaimsError::NotPermitted(_))
    ));
}
