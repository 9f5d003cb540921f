//! Password reset tokens and out-of-band delivery
//!
//! The raw token is handed to a notifier for delivery; delivery failure never
//! rolls back the persisted token.

use crate::utils::error::Result;
use async_trait::async_trait;
use rand::RngCore;
use tracing::info;

/// Generate an opaque reset token: 32 bytes from a CSPRNG, hex-encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Out-of-band delivery of reset tokens. The email transport itself lives
/// outside this crate; implementations adapt to whatever carrier is wired in.
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    /// Deliver a reset token to a recipient address
    async fn send_reset(&self, recipient: &str, token: &str) -> Result<()>;
}

/// Notifier that logs instead of delivering; default for development
pub struct LogNotifier;

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset(&self, recipient: &str, _token: &str) -> Result<()> {
        // The token itself stays out of the log.
        info!("password reset token issued for {}", recipient);
        Ok(())
    }
}
