//! Service configuration
//!
//! Configuration is explicit state passed into the components that need it:
//! the signing key goes to the token handler at construction, the role policy
//! to the decision engine. Nothing reads the environment after startup.

use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret; process-wide, rotating it invalidates all tokens
    pub jwt_secret: String,
    /// Bearer token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Password reset token lifetime in seconds
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_secs: u64,
    /// Role policy
    #[serde(default)]
    pub rbac: RbacConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_jwt_secret(),
            token_ttl_secs: default_token_ttl(),
            reset_token_ttl_secs: default_reset_ttl(),
            rbac: RbacConfig::default(),
        }
    }
}

/// Role policy configuration: the well-known role names the decision engine
/// keys its behavior on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Role assigned at registration when none is requested
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Role resolved for unauthenticated read access
    #[serde(default = "default_public_role")]
    pub public_role: String,
    /// Mid-tier administrative role subject to the escalation guard
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Top role protected by the escalation guard
    #[serde(default = "default_super_admin_role")]
    pub super_admin_role: String,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            public_role: default_public_role(),
            admin_role: default_admin_role(),
            super_admin_role: default_super_admin_role(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Reads a `.env` file when present. A missing `TASKGATE_JWT_SECRET`
    /// yields a randomly generated secret, which is fine for development but
    /// means tokens do not survive a restart.
    pub fn from_env() -> crate::utils::error::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(host) = std::env::var("TASKGATE_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("TASKGATE_PORT") {
            config.server.port = port.parse().map_err(|_| {
                crate::utils::error::GateError::Config("TASKGATE_PORT must be a port number".into())
            })?;
        }
        if let Ok(secret) = std::env::var("TASKGATE_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        } else {
            warn!("TASKGATE_JWT_SECRET not set; using a generated secret, tokens will not survive restart");
        }
        if let Ok(ttl) = std::env::var("TASKGATE_TOKEN_TTL_SECS") {
            config.auth.token_ttl_secs = ttl.parse().map_err(|_| {
                crate::utils::error::GateError::Config(
                    "TASKGATE_TOKEN_TTL_SECS must be an integer".into(),
                )
            })?;
        }
        if let Ok(ttl) = std::env::var("TASKGATE_RESET_TOKEN_TTL_SECS") {
            config.auth.reset_token_ttl_secs = ttl.parse().map_err(|_| {
                crate::utils::error::GateError::Config(
                    "TASKGATE_RESET_TOKEN_TTL_SECS must be an integer".into(),
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::utils::error::Result<()> {
        self.auth.validate()
    }
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::error::GateError;

        if self.jwt_secret.len() < 32 {
            return Err(GateError::Config(
                "JWT secret must be at least 32 characters long".into(),
            ));
        }
        if self.jwt_secret == "your-secret-key" || self.jwt_secret == "change-me" {
            return Err(GateError::Config(
                "JWT secret must not use a placeholder value".into(),
            ));
        }
        if self.token_ttl_secs < 300 {
            return Err(GateError::Config(
                "token lifetime should be at least 5 minutes".into(),
            ));
        }
        if self.reset_token_ttl_secs == 0 {
            return Err(GateError::Config(
                "reset token lifetime must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Generate a random signing secret for development use
fn generate_jwt_secret() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_reset_ttl() -> u64 {
    3600
}

fn default_role() -> String {
    "User".to_string()
}

fn default_public_role() -> String {
    "Viewer".to_string()
}

fn default_admin_role() -> String {
    "Admin".to_string()
}

fn default_super_admin_role() -> String {
    "Super Admin".to_string()
}
