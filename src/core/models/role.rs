//! Role model
//!
//! Roles are read-mostly reference data: a flat set of independent rows, each
//! carrying its own full permission matrix. There is no inheritance; the one
//! special case (the top role) is handled by the decision engine's escalation
//! guard, not by the data model.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Sentinel feature granting an action on everything
pub const FEATURE_ALL: &str = "all";
/// Feature name for account management, watched by the escalation guard
pub const FEATURE_USERS: &str = "users";

/// Action names checked against the permission matrix
pub const ACTION_CREATE: &str = "create";
pub const ACTION_READ: &str = "read";
pub const ACTION_UPDATE: &str = "update";
pub const ACTION_DELETE: &str = "delete";

/// Mapping from action name to the set of feature names it may touch
pub type PermissionMatrix = HashMap<String, HashSet<String>>;

/// Named bundle of permissions assigned to identities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier
    pub id: Uuid,
    /// Human-readable name (unique)
    pub name: String,
    /// Opaque permission matrix; interpreted by the decision engine only
    pub permissions: PermissionMatrix,
}

impl Role {
    /// Create a role with a fresh id
    pub fn new(name: impl Into<String>, permissions: PermissionMatrix) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            permissions,
        }
    }
}

/// Build a permission matrix from `(action, [features])` pairs.
pub fn matrix<const N: usize>(entries: [(&str, &[&str]); N]) -> PermissionMatrix {
    entries
        .into_iter()
        .map(|(action, features)| {
            (
                action.to_string(),
                features.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect()
}
