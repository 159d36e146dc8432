//! Approval-workflow integration tests: request transitions, the
//! account-first write ordering, and the reconciliation probe.
//! These exercise positive and negative paths against the in-memory store.

use serde_json::{json, Value};

use petrodesk::error::LifecycleError;
use petrodesk::lifecycle::RequestLifecycle;
use petrodesk::model::AccountStatus;
use petrodesk::roles::RoleSet;
use petrodesk::store::{DocumentStore, MemoryStore, StoreError, USERS, USER_REQUESTS};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn roles(raw: &str) -> RoleSet {
    RoleSet::parse(raw).unwrap()
}

fn request_doc(name: &str, user_id: Option<&str>, status: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "phone": "555-0100",
        "roles": null,
        "status": status,
        "createdAt": "2026-01-05T08:30:00Z",
        "lastUpdated": "2026-01-05T08:30:00Z",
        "userId": user_id,
        "message": "Requesting console access"
    })
}

async fn raw(store: &MemoryStore, collection: &str, id: &str) -> Option<Value> {
    store
        .get(collection, id)
        .await
        .unwrap()
        .map(|doc| doc.data)
}

#[tokio::test]
async fn approving_a_pending_request_provisions_the_account() {
    init_tracing();
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r1", request_doc("Huda", Some("u1"), "pending"));

    let lifecycle = RequestLifecycle::new(&store);
    lifecycle
        .approve("r1", "u1", &roles("accountant"))
        .await
        .unwrap();

    let request = raw(&store, USER_REQUESTS, "r1").await.unwrap();
    assert_eq!(request["status"], json!("approved"));
    assert_eq!(request["roles"], json!("accountant"));

    let account = raw(&store, USERS, "u1").await.unwrap();
    assert_eq!(account["status"], json!("approved"));
    assert_eq!(account["roles"], json!("accountant"));
    assert_eq!(account["name"], json!("Huda"));
    assert_eq!(account["email"], json!("huda@example.com"));
    assert!(account.get("createdAt").is_some(), "first provisioning stamps createdAt");
}

#[tokio::test]
async fn approving_updates_an_existing_account_in_place() {
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r1", request_doc("Samir", Some("u1"), "pending"));
    store.seed(
        USERS,
        "u1",
        json!({
            "name": "Old Name",
            "email": "old@example.com",
            "phone": "555-0000",
            "roles": "",
            "status": "pending",
            "createdAt": "2025-11-01T00:00:00Z",
            "lastUpdated": "2025-11-01T00:00:00Z"
        }),
    );

    let lifecycle = RequestLifecycle::new(&store);
    lifecycle.approve("r1", "u1", &roles("admin")).await.unwrap();

    let account = raw(&store, USERS, "u1").await.unwrap();
    assert_eq!(account["name"], json!("Samir"));
    assert_eq!(account["roles"], json!("admin"));
    assert_eq!(account["status"], json!("approved"));
    // Partial merge keeps the original creation stamp.
    assert_eq!(account["createdAt"], json!("2025-11-01T00:00:00Z"));
}

#[tokio::test]
async fn approval_requires_a_non_empty_selection() {
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r1", request_doc("Huda", Some("u1"), "pending"));

    let lifecycle = RequestLifecycle::new(&store);
    let err = lifecycle
        .approve("r1", "u1", &RoleSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::EmptySelection(_)));

    // Nothing was written.
    let request = raw(&store, USER_REQUESTS, "r1").await.unwrap();
    assert_eq!(request["status"], json!("pending"));
}

#[tokio::test]
async fn terminal_requests_are_immutable_and_untouched() {
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r1", request_doc("Huda", Some("u1"), "rejected"));
    let before = raw(&store, USER_REQUESTS, "r1").await.unwrap();

    let lifecycle = RequestLifecycle::new(&store);
    for attempt in [
        lifecycle.approve("r1", "u1", &roles("admin")).await,
        lifecycle.reject("r1").await,
    ] {
        assert_eq!(
            attempt.unwrap_err(),
            LifecycleError::AlreadyTerminal {
                id: "r1".to_string(),
                status: AccountStatus::Rejected,
            }
        );
    }

    assert_eq!(raw(&store, USER_REQUESTS, "r1").await.unwrap(), before);
    assert!(raw(&store, USERS, "u1").await.is_none());
}

#[tokio::test]
async fn rejecting_never_touches_accounts() {
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r1", request_doc("Huda", Some("u1"), "pending"));

    let lifecycle = RequestLifecycle::new(&store);
    lifecycle.reject("r1").await.unwrap();

    let request = raw(&store, USER_REQUESTS, "r1").await.unwrap();
    assert_eq!(request["status"], json!("rejected"));
    assert!(raw(&store, USERS, "u1").await.is_none());
}

#[tokio::test]
async fn missing_requests_report_not_found() {
    let store = MemoryStore::new();
    let lifecycle = RequestLifecycle::new(&store);
    assert_eq!(
        lifecycle.reject("ghost").await.unwrap_err(),
        LifecycleError::NotFound("ghost".to_string())
    );
}

#[tokio::test]
async fn approval_is_retryable_after_a_half_landed_write() {
    init_tracing();
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r1", request_doc("Huda", Some("u1"), "pending"));

    // The account write lands, then the terminal request write fails.
    store.set_write_outage(USER_REQUESTS, true);
    let lifecycle = RequestLifecycle::new(&store);
    let err = lifecycle
        .approve("r1", "u1", &roles("accountant"))
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable(_))));

    // The request is still pending, so the transition can simply be retried.
    let request = raw(&store, USER_REQUESTS, "r1").await.unwrap();
    assert_eq!(request["status"], json!("pending"));

    store.set_write_outage(USER_REQUESTS, false);
    lifecycle
        .approve("r1", "u1", &roles("accountant"))
        .await
        .unwrap();

    let request = raw(&store, USER_REQUESTS, "r1").await.unwrap();
    assert_eq!(request["status"], json!("approved"));
    let account = raw(&store, USERS, "u1").await.unwrap();
    assert_eq!(account["status"], json!("approved"));
}

#[tokio::test]
async fn reconcile_heals_a_request_approved_without_an_account() {
    let store = MemoryStore::new();
    let mut doc = request_doc("Huda", Some("u2"), "approved");
    doc["roles"] = json!("accountant");
    store.seed(USER_REQUESTS, "r2", doc);

    let lifecycle = RequestLifecycle::new(&store);
    assert!(lifecycle.reconcile("r2").await.unwrap());

    let account = raw(&store, USERS, "u2").await.unwrap();
    assert_eq!(account["status"], json!("approved"));
    assert_eq!(account["roles"], json!("accountant"));

    // A healthy pair needs no further repair.
    assert!(!lifecycle.reconcile("r2").await.unwrap());
}

#[tokio::test]
async fn reconcile_ignores_pending_requests_and_later_role_edits() {
    let store = MemoryStore::new();
    store.seed(USER_REQUESTS, "r3", request_doc("Huda", Some("u3"), "pending"));

    let lifecycle = RequestLifecycle::new(&store);
    assert!(!lifecycle.reconcile("r3").await.unwrap());

    // Approved pair where an admin later edited the account roles: the
    // account stays as edited.
    let mut doc = request_doc("Samir", Some("u4"), "approved");
    doc["roles"] = json!("accountant");
    store.seed(USER_REQUESTS, "r4", doc);
    store.seed(
        USERS,
        "u4",
        json!({
            "name": "Samir",
            "email": "samir@example.com",
            "phone": "555-0100",
            "roles": "admin",
            "status": "approved",
            "createdAt": "2026-01-05T08:30:00Z",
            "lastUpdated": "2026-02-01T08:30:00Z"
        }),
    );
    assert!(!lifecycle.reconcile("r4").await.unwrap());
    let account = raw(&store, USERS, "u4").await.unwrap();
    assert_eq!(account["roles"], json!("admin"));
}
