use crate::model::User;

/// The transient outcome of resolving an identity assertion. Never
/// persisted; discarded on sign-out or loss of the assertion. All
/// authorization checks read the session already in hand rather than
/// going back to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub authenticated: bool,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            user,
            authenticated: true,
        }
    }
}

/// Why an assertion resolved to a refusal. Denials are outcomes, not
/// errors: the caller routes to a denial screen, never an error screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No account document exists for the asserted identity.
    NoRecord,
    /// The account holds no role eligible for this console.
    RoleNotEligible,
    /// The account exists but is still pending or was rejected.
    NotApproved,
}

impl DenialReason {
    /// Plain-language text for the denial screen.
    pub fn message(self) -> &'static str {
        match self {
            DenialReason::NoRecord => "User account not found.",
            DenialReason::RoleNotEligible => {
                "Access denied. Only approved administrators and accountants can access this panel."
            }
            DenialReason::NotApproved => {
                "Access denied. This account has not been approved for access yet."
            }
        }
    }
}
