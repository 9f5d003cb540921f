//! Identity model
//!
//! The public `Identity` type carries no secret material: the password digest
//! and reset-token fields live behind the store boundary and are only
//! returned by lookups that explicitly request them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account capable of authenticating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier
    pub id: Uuid,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address (unique, case-normalized)
    pub email: String,
    /// Assigned role
    pub role_id: Uuid,
    /// Lifecycle status
    pub status: IdentityStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Whether the account may authenticate
    pub fn is_active(&self) -> bool {
        matches!(self.status, IdentityStatus::Active) && self.deleted_at.is_none()
    }
}

/// Identity lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityStatus {
    /// May authenticate
    Active,
    /// Blocked from authenticating
    Inactive,
}

impl Default for IdentityStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Fields required to create an identity. The secret arrives here already
/// hashed; plaintext never crosses the store boundary.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub secret_hash: String,
    pub role_id: Uuid,
    pub status: IdentityStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(status: IdentityStatus, deleted_at: Option<DateTime<Utc>>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            role_id: Uuid::new_v4(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at,
        }
    }

    #[test]
    fn active_identity_is_active() {
        assert!(identity(IdentityStatus::Active, None).is_active());
    }

    #[test]
    fn inactive_or_deleted_identity_is_not_active() {
        assert!(!identity(IdentityStatus::Inactive, None).is_active());
        assert!(!identity(IdentityStatus::Active, Some(Utc::now())).is_active());
    }

    #[test]
    fn serialized_identity_has_no_secret_fields() {
        let value = serde_json::to_value(identity(IdentityStatus::Active, None)).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("secret_hash"));
        assert!(!object.contains_key("reset_token"));
    }
}
