pub mod mock;
pub mod pkce;
pub mod spotify;
pub mod spotify_auth;

use anyhow::Result;
use url::Url;

/// Everything a prompt needs to send the user to the provider's consent page.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub url: Url,
    /// Anti-forgery value that must come back unchanged on the redirect.
    pub state: String,
    pub redirect_uri: String,
}

/// Result of one trip through the provider's consent page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { code: String, state: Option<String> },
    Denied { error: String, description: Option<String> },
    Cancelled,
}

/// Prompt trait: opens the authorization page and waits for the redirect.
/// Implementations: spotify_auth::ManualPrompt and mock::MockPrompt.
#[async_trait::async_trait]
pub trait AuthPrompt: Send + Sync {
    async fn prompt(&self, request: &AuthRequest) -> Result<AuthOutcome>;

    /// Return the prompt's name (for logging)
    fn name(&self) -> &str;
}
