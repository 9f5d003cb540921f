//! Persistence boundary
//!
//! The service talks to persistence through these traits only. Default
//! projections exclude secret material; lookups that need the password digest
//! say so in their name. The atomicity contract for `consume_reset_token` is
//! part of the trait: one compare-and-clear, not a check followed by a clear.

pub mod memory;

use crate::config::RbacConfig;
use crate::core::models::{Identity, NewIdentity, Role};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Identity persistence operations
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find an identity by normalized email, secret fields excluded
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Find an identity by normalized email together with its password digest
    async fn find_by_email_with_secret(&self, email: &str) -> Result<Option<(Identity, String)>>;

    /// Find an identity by id, secret fields excluded
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;

    /// Create an identity; fails with `EmailAlreadyExists` on a duplicate email
    async fn create(&self, new: NewIdentity) -> Result<Identity>;

    /// Persist a reset token and its expiry, replacing any previous one
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Atomically consume a reset token: match an identity whose token equals
    /// `token` and whose expiry is after `now`, set the new digest, and clear
    /// both reset fields in the same update. Returns `None` when no identity
    /// matches (unknown, expired, or already consumed).
    async fn consume_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        new_secret_hash: &str,
    ) -> Result<Option<Identity>>;
}

/// Role reference-data lookups; pure, no side effects
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Find a role by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>>;

    /// Find a role by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;
}

/// Facade over the configured store implementations
#[derive(Clone)]
pub struct StorageLayer {
    identities: Arc<dyn IdentityStore>,
    roles: Arc<dyn RoleStore>,
}

impl StorageLayer {
    /// Compose a storage layer from store implementations
    pub fn new(identities: Arc<dyn IdentityStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self { identities, roles }
    }

    /// An in-memory storage layer seeded with the policy's well-known roles
    pub fn in_memory(policy: &RbacConfig) -> Self {
        let store = Arc::new(memory::MemoryStore::with_default_roles(policy));
        Self {
            identities: store.clone(),
            roles: store,
        }
    }

    /// Identity store handle
    pub fn identities(&self) -> &dyn IdentityStore {
        self.identities.as_ref()
    }

    /// Role store handle
    pub fn roles(&self) -> &dyn RoleStore {
        self.roles.as_ref()
    }
}
