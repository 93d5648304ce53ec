//! Trait and types for the external authentication service.

use anyhow::Result;

/// Session issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: String,
}

/// Credential-issuing service for government users.
///
/// Signup is two-step: `signup_start` issues a short-lived token for the
/// email address, and `signup_complete` sets the password against it.
#[async_trait::async_trait]
pub trait AuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    /// Returns the pending-signup token.
    async fn signup_start(&self, email: &str) -> Result<String>;

    async fn signup_complete(&self, token: &str, password: &str) -> Result<()>;
}
