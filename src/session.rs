//! Login session state.
//!
//! The session is an immutable value: every event consumes the current
//! state and yields the next one. `Authenticated` and `AuthFailed` are
//! terminal; there is no logout.
use crate::api::pkce::PkcePair;
use crate::api::spotify::{TokenGrant, UserProfile};
use crate::error::AuthError;
use anyhow::Result;
use std::fmt;

#[derive(Debug, Clone)]
pub enum SessionState {
    Unauthenticated { pkce: Option<PkcePair> },
    Authenticated { grant: TokenGrant, profile: UserProfile },
    AuthFailed { reason: AuthFailure },
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    PkceReady(PkcePair),
    ProfileLoaded { grant: TokenGrant, profile: UserProfile },
    PromptRejected(AuthFailure),
}

/// Why a login attempt ended without a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    Cancelled,
    Denied { error: String, description: Option<String> },
    StateMismatch,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::Cancelled => f.write_str("login cancelled"),
            AuthFailure::Denied { error, description: Some(d) } => write!(f, "{} ({})", error, d),
            AuthFailure::Denied { error, description: None } => f.write_str(error),
            AuthFailure::StateMismatch => f.write_str("redirect state did not match the request"),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unauthenticated { pkce: None }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session with its PKCE pair already generated, as on app load.
    pub fn mount() -> Result<Self> {
        Self::new().advance(SessionEvent::PkceReady(PkcePair::generate()?))
    }

    pub fn advance(self, event: SessionEvent) -> Result<Self> {
        match (self, event) {
            (SessionState::Unauthenticated { pkce: None }, SessionEvent::PkceReady(pair)) => {
                Ok(SessionState::Unauthenticated { pkce: Some(pair) })
            }
            (
                SessionState::Unauthenticated { pkce: Some(_) },
                SessionEvent::ProfileLoaded { grant, profile },
            ) => Ok(SessionState::Authenticated { grant, profile }),
            (SessionState::Unauthenticated { .. }, SessionEvent::PromptRejected(reason)) => {
                Ok(SessionState::AuthFailed { reason })
            }
            (state, event) => Err(AuthError::InvalidTransition {
                state: state.kind(),
                event: event.kind(),
            }
            .into()),
        }
    }

    pub fn pkce(&self) -> Option<&PkcePair> {
        match self {
            SessionState::Unauthenticated { pkce } => pkce.as_ref(),
            _ => None,
        }
    }

    /// The login control stays disabled until a challenge exists.
    pub fn prompt_enabled(&self) -> bool {
        self.pkce().is_some()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated { .. } => "unauthenticated",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::AuthFailed { .. } => "auth-failed",
        }
    }
}

impl SessionEvent {
    fn kind(&self) -> &'static str {
        match self {
            SessionEvent::PkceReady(_) => "pkce-ready",
            SessionEvent::ProfileLoaded { .. } => "profile-loaded",
            SessionEvent::PromptRejected(_) => "prompt-rejected",
        }
    }
}
