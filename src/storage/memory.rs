//! In-memory store
//!
//! Backs the server in development and the test suites. Each mutating method
//! takes the write lock once, so the consume-reset path is a single atomic
//! read-modify-write: a concurrent second consume sees either the token still
//! set or both fields cleared, never a half-updated record.

use crate::config::RbacConfig;
use crate::core::models::role::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, FEATURE_ALL, matrix,
};
use crate::core::models::{Identity, IdentityStatus, NewIdentity, Role};
use crate::storage::{IdentityStore, RoleStore};
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// One identity row; secret and reset fields never leave this module
#[derive(Debug, Clone)]
struct IdentityRecord {
    identity: Identity,
    secret_hash: String,
    reset_token: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
}

/// In-memory implementation of both stores
#[derive(Default)]
pub struct MemoryStore {
    identities: RwLock<HashMap<Uuid, IdentityRecord>>,
    roles: RwLock<HashMap<Uuid, Role>>,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the policy's well-known roles and their matrices
    pub fn with_default_roles(policy: &RbacConfig) -> Self {
        let store = Self::new();
        let all = &[FEATURE_ALL][..];
        let tasks = &["tasks"][..];
        for role in [
            Role::new(
                &policy.super_admin_role,
                matrix([
                    (ACTION_CREATE, all),
                    (ACTION_READ, all),
                    (ACTION_UPDATE, all),
                    (ACTION_DELETE, all),
                ]),
            ),
            Role::new(
                &policy.admin_role,
                matrix([
                    (ACTION_CREATE, all),
                    (ACTION_READ, all),
                    (ACTION_UPDATE, all),
                    (ACTION_DELETE, all),
                ]),
            ),
            Role::new(
                &policy.default_role,
                matrix([
                    (ACTION_CREATE, tasks),
                    (ACTION_READ, tasks),
                    (ACTION_UPDATE, tasks),
                    (ACTION_DELETE, tasks),
                ]),
            ),
            Role::new(&policy.public_role, matrix([(ACTION_READ, all)])),
        ] {
            store.insert_role(role);
        }
        store
    }

    /// Insert or replace a role
    pub fn insert_role(&self, role: Role) {
        self.roles.write().insert(role.id, role);
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        Ok(self
            .identities
            .read()
            .values()
            .find(|r| r.identity.email == email)
            .map(|r| r.identity.clone()))
    }

    async fn find_by_email_with_secret(&self, email: &str) -> Result<Option<(Identity, String)>> {
        Ok(self
            .identities
            .read()
            .values()
            .find(|r| r.identity.email == email)
            .map(|r| (r.identity.clone(), r.secret_hash.clone())))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        Ok(self
            .identities
            .read()
            .get(&id)
            .map(|r| r.identity.clone()))
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity> {
        let mut identities = self.identities.write();
        if identities.values().any(|r| r.identity.email == new.email) {
            return Err(GateError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            role_id: new.role_id,
            status: new.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        identities.insert(
            identity.id,
            IdentityRecord {
                identity: identity.clone(),
                secret_hash: new.secret_hash,
                reset_token: None,
                reset_expires_at: None,
            },
        );
        Ok(identity)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut identities = self.identities.write();
        let record = identities
            .get_mut(&id)
            .ok_or(GateError::UserNotFound)?;
        record.reset_token = Some(token.to_string());
        record.reset_expires_at = Some(expires_at);
        record.identity.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        new_secret_hash: &str,
    ) -> Result<Option<Identity>> {
        let mut identities = self.identities.write();
        let record = identities.values_mut().find(|r| {
            r.reset_token.as_deref() == Some(token)
                && r.reset_expires_at.is_some_and(|expiry| expiry > now)
        });
        let Some(record) = record else {
            return Ok(None);
        };
        record.secret_hash = new_secret_hash.to_string();
        record.reset_token = None;
        record.reset_expires_at = None;
        record.identity.updated_at = now;
        Ok(Some(record.identity.clone()))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>> {
        Ok(self.roles.read().get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self
            .roles
            .read()
            .values()
            .find(|r| r.name == name)
            .cloned())
    }
}
