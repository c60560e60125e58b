use crate::api::spotify::SpotifyClient;
use crate::api::spotify_auth::build_auth_request;
use crate::api::{AuthOutcome, AuthPrompt};
use crate::config::Config;
use crate::error::AuthError;
use crate::session::{AuthFailure, SessionEvent, SessionState};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// One login attempt: prompt, exchange the code, fetch the profile.
///
/// Network failures propagate as errors with no retry. A denied or
/// cancelled prompt is not an error; it moves the session to `AuthFailed`.
pub struct LoginFlow<P: AuthPrompt> {
    client: SpotifyClient,
    cfg: Config,
    prompt: P,
}

impl<P: AuthPrompt> LoginFlow<P> {
    pub fn new(cfg: Config, prompt: P) -> Self {
        Self {
            client: SpotifyClient::new(&cfg),
            cfg,
            prompt,
        }
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub async fn login(&self, session: SessionState) -> Result<SessionState> {
        let pkce = session.pkce().ok_or(AuthError::PromptDisabled)?;
        let request = build_auth_request(&self.cfg, pkce)?;
        info!("starting login via {} prompt", self.prompt.name());

        let outcome = self.prompt.prompt(&request).await?;
        let (code, returned_state) = match outcome {
            AuthOutcome::Success { code, state } => (code, state),
            AuthOutcome::Denied { error, description } => {
                warn!("authorization denied: {}", error);
                return session.advance(SessionEvent::PromptRejected(AuthFailure::Denied {
                    error,
                    description,
                }));
            }
            AuthOutcome::Cancelled => {
                return session.advance(SessionEvent::PromptRejected(AuthFailure::Cancelled));
            }
        };
        if returned_state.as_deref() != Some(request.state.as_str()) {
            warn!("redirect state mismatch; discarding authorization code");
            return session.advance(SessionEvent::PromptRejected(AuthFailure::StateMismatch));
        }

        let grant = self
            .client
            .exchange_code(&code, session.pkce().map(|p| p.verifier()))
            .await
            .context("exchanging authorization code")?;
        let profile = self
            .client
            .fetch_profile(&grant.access_token)
            .await
            .context("fetching user profile")?;
        info!("logged in as {}", profile.greeting_name());
        session.advance(SessionEvent::ProfileLoaded { grant, profile })
    }
}
