//! Rules for building a role selection one toggle at a time.
//!
//! The toggle never mutates anything: callers keep a working copy and
//! persist it only on an explicit save, so a rejected toggle simply
//! leaves the working set untouched and surfaces the reason.

use thiserror::Error;

use super::catalog::{Category, Role};
use super::set::RoleSet;

/// Why a toggle was refused. Shown inline next to the picker; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("Admin and Accountant roles cannot be selected together")]
    AdminAccountantConflict,
    #[error("Admin/Accountant roles cannot be mixed with Operator roles")]
    CategoryMixConflict,
}

/// A save or approval needs at least one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Please select at least one role")]
pub struct EmptySelection;

/// Toggle `candidate` on `current`. Removal always succeeds; addition is
/// checked against the category rules so the accept path can never
/// produce an incoherent set.
pub fn try_toggle(current: &RoleSet, candidate: Role) -> Result<RoleSet, ConflictReason> {
    if current.contains(candidate) {
        return Ok(current.without(candidate));
    }
    match candidate.category() {
        Category::Admin => {
            let counterpart = match candidate {
                Role::Admin => Role::Accountant,
                _ => Role::Admin,
            };
            if current.contains(counterpart) {
                return Err(ConflictReason::AdminAccountantConflict);
            }
            if current.iter().any(|r| r.category() == Category::Operator) {
                return Err(ConflictReason::CategoryMixConflict);
            }
        }
        Category::Operator => {
            if current.iter().any(|r| r.category() == Category::Admin) {
                return Err(ConflictReason::CategoryMixConflict);
            }
        }
    }
    Ok(current.with(candidate))
}

/// Commit-time check: the only validation beyond what toggling already
/// guarantees. Returns the set unchanged when non-empty.
pub fn finalize(set: &RoleSet) -> Result<RoleSet, EmptySelection> {
    if set.is_empty() {
        return Err(EmptySelection);
    }
    Ok(set.clone())
}
