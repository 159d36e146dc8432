//! Access-control and user-approval core for a petroleum shipment
//! reporting console: a fixed role catalog with category exclusion
//! rules, a pure authorization gate, an identity-resolution state
//! machine, and the lifecycle that turns pending access requests into
//! provisioned accounts. UI, routing and report CRUD live elsewhere and
//! consume these decisions.

pub mod directory;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod roles;
pub mod store;
