//! Drives an access request out of `pending`. Approval provisions the
//! account document before the request flips to its terminal state, so a
//! failure between the two writes leaves the request pending and the
//! whole operation safely retryable.

use std::collections::HashSet;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tracing::info;

use crate::error::LifecycleError;
use crate::model::{AccessRequest, AccountStatus, User};
use crate::roles::{selection, RoleSet};
use crate::store::{DocumentStore, StoreError, USERS, USER_REQUESTS};

pub struct RequestLifecycle<'a, S> {
    store: &'a S,
    in_flight: Mutex<HashSet<String>>,
}

/// Releases the per-request submission slot when a transition finishes,
/// on success and failure alike.
struct FlightSlot<'l> {
    slots: &'l Mutex<HashSet<String>>,
    request_id: String,
}

impl Drop for FlightSlot<'_> {
    fn drop(&mut self) {
        self.slots.lock().remove(&self.request_id);
    }
}

impl<'a, S: DocumentStore> RequestLifecycle<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Reject a pending request. Touches no account document.
    pub async fn reject(&self, request_id: &str) -> Result<(), LifecycleError> {
        let _slot = self.claim(request_id)?;
        self.load_pending(request_id).await?;

        self.store
            .update(
                USER_REQUESTS,
                request_id,
                json!({
                    "status": AccountStatus::Rejected,
                    "lastUpdated": Utc::now(),
                }),
            )
            .await?;
        info!(request = %request_id, "access request rejected");
        Ok(())
    }

    /// Approve a pending request, granting `roles` and provisioning the
    /// account at `user_id` from the request's contact details.
    pub async fn approve(
        &self,
        request_id: &str,
        user_id: &str,
        roles: &RoleSet,
    ) -> Result<(), LifecycleError> {
        let roles = selection::finalize(roles)?;
        let _slot = self.claim(request_id)?;
        let request = self.load_pending(request_id).await?;

        // Account first, request second. If the terminal write below is
        // lost, the request stays pending and a retry re-runs the
        // idempotent provisioning.
        self.provision_account(user_id, &request, &roles).await?;

        self.store
            .update(
                USER_REQUESTS,
                request_id,
                json!({
                    "status": AccountStatus::Approved,
                    "roles": &roles,
                    "lastUpdated": Utc::now(),
                }),
            )
            .await?;
        info!(request = %request_id, user = %user_id, roles = %roles, "access request approved");
        Ok(())
    }

    /// Heal the inconsistency a half-landed legacy approval leaves
    /// behind: request approved, account missing or not approved.
    /// Returns whether a repair was written. Role edits made after the
    /// approval are deliberately left alone; only a missing or
    /// unapproved account is repaired.
    pub async fn reconcile(&self, request_id: &str) -> Result<bool, LifecycleError> {
        let _slot = self.claim(request_id)?;
        let request = self.load(request_id).await?;
        if request.status != AccountStatus::Approved {
            return Ok(false);
        }
        let (Some(user_id), Some(roles)) = (request.user_id.clone(), request.roles.clone()) else {
            return Ok(false);
        };
        if roles.is_empty() {
            return Ok(false);
        }

        let account: Option<User> = match self.store.get(USERS, &user_id).await? {
            Some(doc) => serde_json::from_value(doc.data).ok(),
            None => None,
        };
        let healthy = account
            .map(|u| u.status == AccountStatus::Approved)
            .unwrap_or(false);
        if healthy {
            return Ok(false);
        }

        self.provision_account(&user_id, &request, &roles).await?;
        info!(request = %request_id, user = %user_id, "healed half-approved request");
        Ok(true)
    }

    /// At-most-once submission guard: a second transition for the same
    /// request while one is outstanding is refused outright instead of
    /// racing the terminal-status check.
    fn claim(&self, request_id: &str) -> Result<FlightSlot<'_>, LifecycleError> {
        let mut slots = self.in_flight.lock();
        if !slots.insert(request_id.to_string()) {
            return Err(LifecycleError::SubmissionInFlight(request_id.to_string()));
        }
        Ok(FlightSlot {
            slots: &self.in_flight,
            request_id: request_id.to_string(),
        })
    }

    async fn load(&self, request_id: &str) -> Result<AccessRequest, LifecycleError> {
        let Some(doc) = self.store.get(USER_REQUESTS, request_id).await? else {
            return Err(LifecycleError::NotFound(request_id.to_string()));
        };
        let request: AccessRequest = serde_json::from_value(doc.data).map_err(|err| {
            StoreError::Unavailable(format!("undecodable request document {request_id}: {err}"))
        })?;
        Ok(AccessRequest {
            id: Some(doc.id),
            ..request
        })
    }

    async fn load_pending(&self, request_id: &str) -> Result<AccessRequest, LifecycleError> {
        let request = self.load(request_id).await?;
        if request.status.is_terminal() {
            return Err(LifecycleError::AlreadyTerminal {
                id: request_id.to_string(),
                status: request.status,
            });
        }
        Ok(request)
    }

    async fn provision_account(
        &self,
        user_id: &str,
        request: &AccessRequest,
        roles: &RoleSet,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let fields = json!({
            "name": request.name,
            "email": request.email,
            "phone": request.phone,
            "roles": roles,
            "status": AccountStatus::Approved,
            "lastUpdated": now,
        });
        match self.store.update(USERS, user_id, fields.clone()).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                // First provisioning for this identity; the insert also
                // carries the creation stamp.
                let mut data = fields;
                data["createdAt"] = json!(now);
                self.store.insert(USERS, Some(user_id), data).await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
