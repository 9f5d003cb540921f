//! # Taskgate
//!
//! Identity and access-control layer for a multi-tenant task service.
//!
//! ## Features
//!
//! - **Credential lifecycle**: registration with password policy enforcement,
//!   login with Argon2 verification, single-use password reset tokens
//! - **Bearer tokens**: HS256 JWTs carrying identity and role
//! - **Role-based access control**: per-role action/feature permission
//!   matrices with a public role for anonymous reads
//! - **Escalation guard**: administrators cannot create, promote, or delete
//!   identities at the top privilege tier
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskgate::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> taskgate::Result<()> {
//!     let config = Config::from_env()?;
//!     taskgate::server::run(config).await
//! }
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use utils::error::{GateError, Result};
