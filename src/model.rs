//! Stored document shapes for the `users` and `user_requests` collections.
//! Field names match the persisted camelCase form; the document id lives
//! outside the document body and is filled in after decoding.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::RoleSet;

/// Shared status for accounts and access requests. `approved` and
/// `rejected` are terminal; only `pending` can transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
}

impl AccountStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AccountStatus::Approved | AccountStatus::Rejected)
    }
}

impl Display for AccountStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Approved => "approved",
            AccountStatus::Rejected => "rejected",
        })
    }
}

/// One account in the `users` collection, keyed by its external identity
/// reference. Never hard-deleted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub roles: RoleSet,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// One document in the `user_requests` collection. Created by the
/// registration flow; transitions exactly once out of `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Roles proposed by the requester, if any. The approver decides the
    /// final grant.
    #[serde(default)]
    pub roles: Option<RoleSet>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// External identity reference, present once the requester has an
    /// authenticatable principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
