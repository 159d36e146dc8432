//! Typed reads and writes over the `users` and `user_requests`
//! collections for the list and editor screens. Individual documents
//! that fail to decode are skipped with a warning so one bad record
//! cannot blank an entire listing.

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::error::LifecycleError;
use crate::model::{AccessRequest, AccountStatus, User};
use crate::roles::{selection, RoleSet};
use crate::store::{Document, DocumentStore, StoreError, USERS, USER_REQUESTS};

pub struct Directory<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> Directory<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn users(&self) -> Result<Vec<User>, StoreError> {
        let docs = self.store.list(USERS).await?;
        Ok(docs.into_iter().filter_map(decode_user).collect())
    }

    pub async fn user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.store.get(USERS, id).await?.and_then(decode_user))
    }

    /// Commit a role edit made through the selection validator. The only
    /// commit-time rule is the non-empty one; coherence was enforced
    /// toggle by toggle.
    pub async fn update_user_roles(
        &self,
        user_id: &str,
        roles: &RoleSet,
    ) -> Result<(), LifecycleError> {
        let roles = selection::finalize(roles)?;
        self.store
            .update(
                USERS,
                user_id,
                json!({
                    "roles": &roles,
                    "lastUpdated": Utc::now(),
                }),
            )
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => LifecycleError::NotFound(user_id.to_string()),
                other => LifecycleError::Store(other),
            })
    }

    pub async fn requests(&self) -> Result<Vec<AccessRequest>, StoreError> {
        let docs = self.store.list(USER_REQUESTS).await?;
        Ok(docs.into_iter().filter_map(decode_request).collect())
    }

    pub async fn requests_by_status(
        &self,
        status: AccountStatus,
    ) -> Result<Vec<AccessRequest>, StoreError> {
        let mut requests = self.requests().await?;
        requests.retain(|r| r.status == status);
        Ok(requests)
    }
}

fn decode_user(doc: Document) -> Option<User> {
    let id = doc.id;
    match serde_json::from_value::<User>(doc.data) {
        Ok(user) => Some(User {
            id: Some(id),
            ..user
        }),
        Err(err) => {
            warn!(document = %id, error = %err, "skipping undecodable account document");
            None
        }
    }
}

fn decode_request(doc: Document) -> Option<AccessRequest> {
    let id = doc.id;
    match serde_json::from_value::<AccessRequest>(doc.data) {
        Ok(request) => Some(AccessRequest {
            id: Some(id),
            ..request
        }),
        Err(err) => {
            warn!(document = %id, error = %err, "skipping undecodable request document");
            None
        }
    }
}
