use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tracing::{info, warn};

use crate::model::{AccountStatus, User};
use crate::roles::Role;
use crate::store::{DocumentStore, StoreError, USERS};

use super::provider::IdentityProvider;
use super::session::{DenialReason, Session};

/// Only these roles may sign in to this console; operator roles belong to
/// the field-reporting surface and are never eligible here.
pub const ELIGIBLE_ROLES: [Role; 2] = [Role::Admin, Role::Accountant];

/// Where the resolver currently stands for this browser/session lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unresolved,
    Resolving,
    Authenticated(Session),
    Denied(DenialReason),
    /// Transport failure; retryable, never a denial.
    Failed(String),
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Authenticated(Session),
    Denied(DenialReason),
    /// A resolution for this lifetime is already underway; the re-entrant
    /// assertion event was ignored.
    InProgress,
}

/// Turns an identity assertion into a `Session` or a denial, applying the
/// eligibility rules against the account record. One resolver instance
/// per session lifetime; overlapping assertion events collapse into the
/// resolution already in flight.
pub struct Resolver<'a, S, P> {
    store: &'a S,
    provider: &'a P,
    state: Mutex<AuthState>,
}

impl<'a, S, P> Resolver<'a, S, P>
where
    S: DocumentStore,
    P: IdentityProvider,
{
    pub fn new(store: &'a S, provider: &'a P) -> Self {
        Self {
            store,
            provider,
            state: Mutex::new(AuthState::Unresolved),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.lock().clone()
    }

    /// Resolve one identity assertion. Transport failures surface as
    /// `Err(StoreError::Unavailable)` so the caller can offer a retry;
    /// everything else is a definitive `Resolution`.
    pub async fn resolve(&self, identity_ref: &str) -> Result<Resolution, StoreError> {
        {
            let mut state = self.state.lock();
            if matches!(*state, AuthState::Resolving) {
                return Ok(Resolution::InProgress);
            }
            *state = AuthState::Resolving;
        }

        match self.resolve_account(identity_ref).await {
            Ok(Resolution::Authenticated(session)) => {
                info!(identity = %identity_ref, roles = %session.user.roles, "sign-in resolved");
                *self.state.lock() = AuthState::Authenticated(session.clone());
                Ok(Resolution::Authenticated(session))
            }
            Ok(Resolution::Denied(reason)) => {
                // Terminate the assertion immediately so a refused
                // principal cannot linger half-authenticated across
                // reloads.
                info!(identity = %identity_ref, ?reason, "sign-in denied");
                self.provider.sign_out(identity_ref);
                *self.state.lock() = AuthState::Denied(reason);
                Ok(Resolution::Denied(reason))
            }
            Ok(Resolution::InProgress) => unreachable!("inner resolution never reports InProgress"),
            Err(err) => {
                warn!(identity = %identity_ref, error = %err, "resolution failed, retryable");
                *self.state.lock() = AuthState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Explicit sign-out: terminate the assertion and return to
    /// `Unresolved` so the next assertion starts a fresh resolution.
    pub fn sign_out(&self, identity_ref: &str) {
        self.provider.sign_out(identity_ref);
        *self.state.lock() = AuthState::Unresolved;
    }

    async fn resolve_account(&self, identity_ref: &str) -> Result<Resolution, StoreError> {
        let Some(doc) = self.store.get(USERS, identity_ref).await? else {
            return Ok(Resolution::Denied(DenialReason::NoRecord));
        };
        let user: User = match serde_json::from_value(doc.data) {
            Ok(user) => User {
                id: Some(doc.id),
                ..user
            },
            Err(err) => {
                warn!(identity = %identity_ref, error = %err, "undecodable account document");
                return Ok(Resolution::Denied(DenialReason::NoRecord));
            }
        };

        if !user.roles.intersects(&ELIGIBLE_ROLES) {
            return Ok(Resolution::Denied(DenialReason::RoleNotEligible));
        }
        if user.status != AccountStatus::Approved {
            return Ok(Resolution::Denied(DenialReason::NotApproved));
        }

        // Best-effort sign-in stamp; losing it must not fail the resolution.
        let touch = json!({ "lastUpdated": Utc::now() });
        if let Err(err) = self.store.update(USERS, identity_ref, touch).await {
            warn!(identity = %identity_ref, error = %err, "could not stamp last sign-in");
        }

        Ok(Resolution::Authenticated(Session::new(user)))
    }
}
