//! Role catalog, role-set semantics and the selection rules that gate
//! which combinations of roles a single account may hold.
//! Keep the public surface thin and split implementation across sub-modules.

mod catalog;
pub mod selection;
mod set;

pub use catalog::{Category, Role, RoleParseError};
pub use selection::{finalize, try_toggle, ConflictReason, EmptySelection};
pub use set::RoleSet;
