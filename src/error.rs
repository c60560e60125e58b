use thiserror::Error;

/// Typed failures of the login flow.
///
/// Library functions return `anyhow::Result`; callers that need to branch on
/// the cause can `downcast_ref::<AuthError>()`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid code verifier: {0}")]
    InvalidVerifier(String),

    #[error("code verifier is not set; token exchange aborted")]
    MissingVerifier,

    #[error("login prompt is disabled until a code challenge is available")]
    PromptDisabled,

    #[error("malformed redirect: {0}")]
    MalformedRedirect(String),

    #[error("{endpoint} request failed: {status} => {body}")]
    Http {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("token response did not match schema")]
    TokenDecode(#[source] serde_json::Error),

    #[error("profile response did not match schema")]
    ProfileDecode(#[source] serde_json::Error),

    #[error("cannot apply {event} to {state} session")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}
