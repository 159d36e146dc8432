//! Crate-wide error taxonomy. Selection conflicts, denials and
//! credential failures live next to their modules; this module holds the
//! lifecycle errors and re-exports the rest so callers can import the
//! whole taxonomy from one place. Every variant renders as a
//! plain-language message fit for direct display.

use thiserror::Error;

use crate::model::AccountStatus;

pub use crate::identity::{AuthError, DenialReason};
pub use crate::roles::{ConflictReason, EmptySelection, RoleParseError};
pub use crate::store::StoreError;

/// Failures of the request-approval workflow. `NotFound` and
/// `AlreadyTerminal` are precondition misuse and need no retry;
/// `Store` wraps a retryable transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("user request not found: {0}")]
    NotFound(String),
    #[error("user request {id} was already {status} and cannot change again")]
    AlreadyTerminal { id: String, status: AccountStatus },
    #[error(transparent)]
    EmptySelection(#[from] EmptySelection),
    #[error("another change to request {0} is still being submitted")]
    SubmissionInFlight(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
