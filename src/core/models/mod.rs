//! Domain models

pub mod identity;
pub mod role;

pub use identity::{Identity, IdentityStatus, NewIdentity};
pub use role::{PermissionMatrix, Role};
