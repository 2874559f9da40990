//! End-to-end status list flows over the in-memory repository: issuance,
//! status changes, rendering, and verification of the rendered documents.

use std::collections::HashSet;
use std::sync::{Arc, Once};

use chrono::Utc;
use serde_json::json;

use credstatus_codec::{decode, read_status};
use credstatus_core::{CredentialId, IssuerId, StatusPurpose, StatusSize};
use credstatus_list::check_status;
use credstatus_service::{CredentialStatusService, StatusConfig, MAX_ALLOCATION_ATTEMPTS};
use credstatus_store::InMemoryStatusListRepository;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn engine() -> (CredentialStatusService, InMemoryStatusListRepository) {
    engine_with(StatusConfig::default())
}

fn engine_with(config: StatusConfig) -> (CredentialStatusService, InMemoryStatusListRepository) {
    init_tracing();
    let repo = InMemoryStatusListRepository::new();
    let config = config.with_base_url("https://badges.example.edu").unwrap();
    (
        CredentialStatusService::new(Arc::new(repo.clone()), config),
        repo,
    )
}

fn issuer() -> IssuerId {
    IssuerId::new("did:web:badges.example.edu").unwrap()
}

fn cred(n: u64) -> CredentialId {
    CredentialId::new(format!("urn:uuid:badge-{n}")).unwrap()
}

#[tokio::test]
async fn sequential_issuance_fills_one_list_in_order() {
    let (svc, repo) = engine();
    let mut list_ids = HashSet::new();
    for n in 0..50 {
        let entry = svc
            .assign_status(&cred(n), &issuer(), StatusPurpose::Revocation, None)
            .await
            .unwrap();
        assert_eq!(entry.status_list_index, n);
        assert_eq!(entry.current_status, 0);
        list_ids.insert(entry.status_list_id);
    }
    assert_eq!(list_ids.len(), 1);
    assert_eq!(repo.list_count(), 1);
    assert_eq!(repo.entry_count(), 50);

    let list_id = list_ids.into_iter().next().unwrap();
    let list = svc
        .status_list_service()
        .get_status_list(list_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(list.used_entries(), 50);
}

#[tokio::test]
async fn a_full_list_rolls_over_to_a_new_one() {
    let (svc, repo) = engine();
    let total = 131_072u64;

    let mut first_list = None;
    for n in 0..total {
        let entry = svc
            .assign_status(&cred(n), &issuer(), StatusPurpose::Suspension, None)
            .await
            .unwrap();
        first_list.get_or_insert(entry.status_list_id);
        assert_eq!(Some(entry.status_list_id), first_list);
    }

    let overflow = svc
        .assign_status(&cred(total), &issuer(), StatusPurpose::Suspension, None)
        .await
        .unwrap();
    assert_ne!(Some(overflow.status_list_id), first_list);
    assert_eq!(overflow.status_list_index, 0);
    assert_eq!(repo.list_count(), 2);
}

#[tokio::test]
async fn revoking_one_credential_leaves_its_neighbours_alone() {
    let (svc, _repo) = engine();
    let a = svc
        .assign_status(&cred(1), &issuer(), StatusPurpose::Revocation, None)
        .await
        .unwrap();
    let b = svc
        .assign_status(&cred(2), &issuer(), StatusPurpose::Revocation, None)
        .await
        .unwrap();
    let c = svc
        .assign_status(&cred(3), &issuer(), StatusPurpose::Revocation, None)
        .await
        .unwrap();
    let lists = svc.status_list_service();
    let before = lists.get_status_list(b.status_list_id).await.unwrap().unwrap();
    let claim_a = svc.create_bitstring_status_list_entry(&a);
    let claim_c = svc.create_bitstring_status_list_entry(&c);

    let result = svc
        .update_status(&cred(2), 1, StatusPurpose::Revocation, Some("issued in error".into()))
        .await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.status_entry.unwrap().current_status, 1);

    let after = lists.get_status_list(b.status_list_id).await.unwrap().unwrap();
    assert_ne!(after.encoded_list(), before.encoded_list());
    let bits = decode(after.encoded_list()).unwrap();
    assert_eq!(read_status(&bits, a.status_list_index, StatusSize::One).unwrap(), 0);
    assert_eq!(read_status(&bits, b.status_list_index, StatusSize::One).unwrap(), 1);
    assert_eq!(read_status(&bits, c.status_list_index, StatusSize::One).unwrap(), 0);

    for (credential, expected) in [(cred(1), 0), (cred(2), 1), (cred(3), 0)] {
        let entry = svc
            .get_status(&credential, StatusPurpose::Revocation)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.current_status, expected);
    }
    assert_eq!(svc.create_bitstring_status_list_entry(&a), claim_a);
    assert_eq!(svc.create_bitstring_status_list_entry(&c), claim_c);
}

#[tokio::test]
async fn rendered_credential_carries_the_current_bitstring() {
    let (svc, _repo) = engine();
    let entry = svc
        .assign_status(&cred(1), &issuer(), StatusPurpose::Revocation, None)
        .await
        .unwrap();
    svc.update_status(&cred(1), 1, StatusPurpose::Revocation, None)
        .await;

    let list = svc
        .status_list_service()
        .get_status_list(entry.status_list_id)
        .await
        .unwrap()
        .unwrap();
    let vc = svc
        .status_list_credential(entry.status_list_id, "did:web:badges.example.edu")
        .await
        .unwrap()
        .unwrap();
    let doc = serde_json::to_value(&vc).unwrap();

    let url = format!("https://badges.example.edu/status-lists/{}", entry.status_list_id);
    assert_eq!(doc["id"], url);
    assert_eq!(
        doc["type"],
        json!(["VerifiableCredential", "BitstringStatusListCredential"])
    );
    assert_eq!(doc["credentialSubject"]["type"], "BitstringStatusList");
    assert_eq!(doc["credentialSubject"]["encodedList"], list.encoded_list());
    assert!(doc.get("validUntil").is_none());
    assert!(doc["credentialSubject"].get("statusSize").is_none());
}

#[tokio::test]
async fn ttl_yields_valid_until() {
    let config = StatusConfig::default().with_default_ttl_ms(Some(86_400_000));
    let (svc, _repo) = engine_with(config);
    let entry = svc
        .assign_status(&cred(1), &issuer(), StatusPurpose::Refresh, None)
        .await
        .unwrap();
    let vc = svc
        .status_list_credential(entry.status_list_id, "did:web:badges.example.edu")
        .await
        .unwrap()
        .unwrap();
    let valid_from = vc.valid_from.unwrap();
    assert_eq!(vc.valid_until, Some(valid_from + chrono::Duration::days(1)));
}

#[tokio::test]
async fn multi_bit_lists_publish_their_message_table() {
    let (svc, _repo) = engine();
    let entry = svc
        .assign_status(&cred(1), &issuer(), StatusPurpose::Revocation, Some(2))
        .await
        .unwrap();
    let vc = svc
        .status_list_credential(entry.status_list_id, "did:web:badges.example.edu")
        .await
        .unwrap()
        .unwrap();
    let doc = serde_json::to_value(&vc).unwrap();
    assert_eq!(doc["credentialSubject"]["statusSize"], 2);
    assert_eq!(
        doc["credentialSubject"]["statusMessages"],
        json!([
            {"status": "0x0", "message": "not_revoked"},
            {"status": "0x1", "message": "revoked"},
            {"status": "0x2", "message": "revoked"},
            {"status": "0x3", "message": "revoked"}
        ])
    );
}

#[tokio::test]
async fn verifier_reads_what_the_issuer_wrote() {
    let (svc, _repo) = engine();
    let held = svc
        .assign_status(&cred(1), &issuer(), StatusPurpose::Message, Some(4))
        .await
        .unwrap();
    let other = svc
        .assign_status(&cred(2), &issuer(), StatusPurpose::Message, Some(4))
        .await
        .unwrap();
    let result = svc
        .update_status(&cred(1), 0xA, StatusPurpose::Message, None)
        .await;
    assert!(result.success);

    let vc = svc
        .status_list_credential(held.status_list_id, "did:web:badges.example.edu")
        .await
        .unwrap()
        .unwrap();

    let check = check_status(&svc.create_bitstring_status_list_entry(&held), &vc, Utc::now())
        .unwrap();
    assert_eq!(check.status, 0xA);
    assert_eq!(check.message, "message_10");

    let check = check_status(&svc.create_bitstring_status_list_entry(&other), &vc, Utc::now())
        .unwrap();
    assert!(!check.is_set());
    assert_eq!(check.message, "no_message");
}

#[tokio::test]
async fn out_of_range_status_is_a_failed_result() {
    let (svc, _repo) = engine();
    svc.assign_status(&cred(1), &issuer(), StatusPurpose::Suspension, None)
        .await
        .unwrap();
    let result = svc
        .update_status(&cred(1), 2, StatusPurpose::Suspension, None)
        .await;
    assert!(!result.success);
    assert!(!result.is_not_found());
    assert!(result.error.unwrap().contains("does not fit"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_issuance_never_shares_a_slot() {
    let (svc, repo) = engine();
    let tasks = u64::from(MAX_ALLOCATION_ATTEMPTS) * 4;
    let mut handles = Vec::new();
    for n in 0..tasks {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.assign_status(&cred(n), &issuer(), StatusPurpose::Revocation, None)
                .await
                .unwrap()
        }));
    }

    let mut slots = HashSet::new();
    for handle in handles {
        let entry = handle.await.unwrap();
        assert!(
            slots.insert((entry.status_list_id, entry.status_list_index)),
            "slot handed out twice"
        );
    }
    assert_eq!(slots.len() as u64, tasks);
    assert_eq!(repo.entry_count() as u64, tasks);

    // Racing creators may have opened more than one list; slots within
    // each list are still dense from 0.
    for list_id in slots.iter().map(|(id, _)| *id).collect::<HashSet<_>>() {
        let mut indices: Vec<u64> = slots
            .iter()
            .filter(|(id, _)| *id == list_id)
            .map(|(_, index)| *index)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..indices.len() as u64).collect::<Vec<_>>());
    }
}
