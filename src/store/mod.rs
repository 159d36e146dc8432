//! Narrow contract over the hosted document database. The rest of the
//! crate depends only on these four operation shapes: get-by-id,
//! list-all, partial-merge update, and insert.

mod memory;

pub use memory::MemoryStore;

use serde_json::Value;
use thiserror::Error;

/// Collection holding account documents, keyed by identity reference.
pub const USERS: &str = "users";
/// Collection holding access-request documents.
pub const USER_REQUESTS: &str = "user_requests";

/// Transport and addressing failures. `Unavailable` is retryable and must
/// never be conflated with an access denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// A raw document: id plus its JSON body. Typed decoding happens above
/// this boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document; `Ok(None)` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// All documents in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Shallow partial field merge into an existing document.
    /// `NotFound` when the id does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// Write a new document. With `id = None` the store mints an id;
    /// with an explicit id the document is created (or replaced) at
    /// that address, matching hosted-store set semantics.
    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Value,
    ) -> Result<String, StoreError>;
}
