//! Authentication and authorization system
//!
//! `AuthSystem` owns the credential lifecycle (registration, login, password
//! reset) and hands out the decision engine used by the authorization
//! middleware. Password hashing is deliberately CPU-expensive and runs on the
//! blocking pool, off the latency-sensitive path.

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod reset;

use crate::config::AuthConfig;
use crate::core::models::{Identity, IdentityStatus, NewIdentity};
use crate::storage::StorageLayer;
use crate::utils::error::{GateError, Result};
use crate::utils::validation;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fields accepted at registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Role name; defaults to the policy's lowest-privilege role
    pub role: Option<String>,
    /// Lifecycle status; defaults to active
    pub status: Option<IdentityStatus>,
}

/// Main authentication system
#[derive(Clone)]
pub struct AuthSystem {
    /// Authentication configuration
    config: Arc<AuthConfig>,
    /// Persistence boundary
    storage: Arc<StorageLayer>,
    /// Token issuer/verifier
    jwt: Arc<jwt::JwtHandler>,
    /// Authorization decision engine
    engine: Arc<rbac::AccessEngine>,
    /// Out-of-band reset delivery
    notifier: Arc<dyn reset::ResetNotifier>,
}

impl AuthSystem {
    /// Create a new authentication system
    pub fn new(
        config: &AuthConfig,
        storage: Arc<StorageLayer>,
        notifier: Arc<dyn reset::ResetNotifier>,
    ) -> Self {
        let config = Arc::new(config.clone());
        let jwt = Arc::new(jwt::JwtHandler::new(&config));
        let engine = Arc::new(rbac::AccessEngine::new(
            jwt.clone(),
            storage.clone(),
            config.rbac.clone(),
        ));

        Self {
            config,
            storage,
            jwt,
            engine,
            notifier,
        }
    }

    /// Register a new identity and issue its first token
    pub async fn register(&self, registration: Registration) -> Result<(Identity, String)> {
        validation::validate_email(&registration.email)?;
        validation::validate_password("password", &registration.password)?;
        let email = validation::normalize_email(&registration.email);

        info!("registration attempt for {}", email);

        if self
            .storage
            .identities()
            .find_by_email(&email)
            .await?
            .is_some()
        {
            return Err(GateError::EmailAlreadyExists);
        }

        let role_name = registration
            .role
            .as_deref()
            .unwrap_or(&self.config.rbac.default_role);
        let role = self
            .storage
            .roles()
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| GateError::Validation(format!("role: unknown role {role_name:?}")))?;

        let secret_hash = hash_on_blocking_pool(registration.password).await?;

        let identity = self
            .storage
            .identities()
            .create(NewIdentity {
                first_name: registration.first_name,
                last_name: registration.last_name,
                email,
                secret_hash,
                role_id: role.id,
                status: registration.status.unwrap_or_default(),
            })
            .await?;

        let token = self.jwt.issue(identity.id, role.id)?;

        info!("registered identity {}", identity.id);
        Ok((identity, token))
    }

    /// Authenticate by email and password, issuing a fresh token.
    ///
    /// Unknown email, wrong password, and inactive account all return the
    /// same `InvalidCredentials` to prevent account enumeration.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Identity, String)> {
        let email = validation::normalize_email(email);
        info!("login attempt for {}", email);

        let Some((identity, secret_hash)) = self
            .storage
            .identities()
            .find_by_email_with_secret(&email)
            .await?
        else {
            warn!("login with unknown email");
            return Err(GateError::InvalidCredentials);
        };

        let password = password.to_string();
        let password_ok = tokio::task::spawn_blocking(move || {
            password::verify_password(&password, &secret_hash)
        })
        .await
        .map_err(|e| GateError::internal(format!("verification task failed: {}", e)))??;

        if !password_ok {
            warn!("login with wrong password for {}", identity.id);
            return Err(GateError::InvalidCredentials);
        }
        if !identity.is_active() {
            warn!("login for inactive identity {}", identity.id);
            return Err(GateError::InvalidCredentials);
        }

        let token = self.jwt.issue(identity.id, identity.role_id)?;

        info!("identity {} logged in", identity.id);
        Ok((identity, token))
    }

    /// Generate, persist, and dispatch a password reset token.
    ///
    /// The token is persisted before delivery is attempted; a delivery
    /// failure is logged and does not invalidate the token.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = validation::normalize_email(email);
        info!("password reset requested for {}", email);

        let identity = self
            .storage
            .identities()
            .find_by_email(&email)
            .await?
            .ok_or(GateError::UserNotFound)?;

        let token = reset::generate_reset_token();
        let expires_at = chrono::Utc::now()
            + chrono::Duration::seconds(self.config.reset_token_ttl_secs as i64);

        self.storage
            .identities()
            .set_reset_token(identity.id, &token, expires_at)
            .await?;

        if let Err(e) = self.notifier.send_reset(&identity.email, &token).await {
            error!("reset token delivery failed for {}: {}", identity.id, e);
        }

        info!("reset token issued for identity {}", identity.id);
        Ok(())
    }

    /// Consume a reset token and set a new password.
    ///
    /// The store clears the token and writes the new digest in one atomic
    /// update, so a replayed token always fails.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Identity> {
        validation::validate_password("password", new_password)?;

        let new_hash = hash_on_blocking_pool(new_password.to_string()).await?;

        let identity = self
            .storage
            .identities()
            .consume_reset_token(token, chrono::Utc::now(), &new_hash)
            .await?
            .ok_or(GateError::ResetTokenInvalidOrExpired)?;

        info!("password reset for identity {}", identity.id);
        Ok(identity)
    }

    /// Token handler
    pub fn jwt(&self) -> &jwt::JwtHandler {
        &self.jwt
    }

    /// Authorization decision engine
    pub fn engine(&self) -> &rbac::AccessEngine {
        &self.engine
    }

    /// Authentication configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Run the expensive hash on the blocking pool
async fn hash_on_blocking_pool(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| GateError::internal(format!("hashing task failed: {}", e)))?
}
