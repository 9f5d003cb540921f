//! HTTP middleware

pub mod auth;

pub use auth::Authorize;
