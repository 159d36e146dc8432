//! Identity and session management for the console: credential
//! verification, the per-assertion resolution state machine, and the
//! pure authorization gate used by protected routes.
//! Keep the public surface thin and split implementation across sub-modules.

mod authorizer;
mod provider;
mod resolver;
mod session;

pub use authorizer::{authorize, Access, Required};
pub use provider::{AuthError, IdentityProvider, IdentityRef, LocalIdentityProvider};
pub use resolver::{AuthState, Resolution, Resolver, ELIGIBLE_ROLES};
pub use session::{DenialReason, Session};
