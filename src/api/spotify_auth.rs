use super::pkce::PkcePair;
use super::{AuthOutcome, AuthPrompt, AuthRequest};
use crate::config::Config;
use crate::error::AuthError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

/// Build the Spotify authorization URL for a PKCE login.
///
/// A fresh `state` value is attached to every request; the redirect must
/// echo it back or the login is treated as failed.
pub fn build_auth_request(cfg: &Config, pkce: &PkcePair) -> Result<AuthRequest> {
    let state = uuid::Uuid::new_v4().simple().to_string();
    let mut url = Url::parse(&cfg.authorize_endpoint())?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &cfg.client_id)
        .append_pair("scope", &cfg.scopes.join(" "))
        .append_pair("redirect_uri", &cfg.redirect_uri)
        .append_pair("code_challenge_method", pkce.method())
        .append_pair("code_challenge", pkce.challenge())
        .append_pair("state", &state);
    Ok(AuthRequest {
        url,
        state,
        redirect_uri: cfg.redirect_uri.clone(),
    })
}

/// Interpret the URL the provider redirected to.
///
/// `error=...` means the user denied access, `code=...` means success.
/// Anything else is malformed.
pub fn parse_redirect(input: &str) -> Result<AuthOutcome> {
    let parsed = Url::parse(input.trim())
        .map_err(|e| AuthError::MalformedRedirect(format!("invalid url pasted: {}", e)))?;
    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Ok(AuthOutcome::Denied {
            error,
            description: param("error_description"),
        });
    }
    match param("code") {
        Some(code) if !code.is_empty() => Ok(AuthOutcome::Success {
            code,
            state: param("state"),
        }),
        _ => Err(AuthError::MalformedRedirect("no code in redirect URL".into()).into()),
    }
}

/// Manual prompt: print the authorization URL, the user opens it in a
/// browser, approves and pastes the full redirect URL back here.
///
/// This avoids running an embedded HTTP server on the redirect address.
/// An empty line cancels the login.
pub struct ManualPrompt;

impl ManualPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ManualPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthPrompt for ManualPrompt {
    async fn prompt(&self, request: &AuthRequest) -> Result<AuthOutcome> {
        println!(
            "Open this URL in your browser and authorize the application:\n\n{}\n",
            request.url
        );
        println!(
            "After authorizing, you'll be redirected to {}. Copy the full redirect URL and paste it here (empty line to cancel).",
            request.redirect_uri
        );
        println!("Paste redirect URL:");

        let input = tokio::task::spawn_blocking(|| -> Result<String> {
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            Ok(input)
        })
        .await
        .map_err(|e| anyhow!("stdin reader failed: {}", e))??;

        if input.trim().is_empty() {
            info!("login prompt cancelled by user");
            return Ok(AuthOutcome::Cancelled);
        }
        let outcome = parse_redirect(&input)?;
        debug!("redirect parsed: {}", outcome_kind(&outcome));
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "manual"
    }
}

fn outcome_kind(outcome: &AuthOutcome) -> &'static str {
    match outcome {
        AuthOutcome::Success { .. } => "success",
        AuthOutcome::Denied { .. } => "denied",
        AuthOutcome::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn auth_request_carries_challenge_and_scopes() {
        let cfg = Config::default();
        let pkce = PkcePair::from_verifier("abc123".into()).unwrap();
        let req = build_auth_request(&cfg, &pkce).unwrap();

        assert!(req.url.as_str().starts_with("https://accounts.spotify.com/authorize?"));
        assert_eq!(query(&req.url, "client_id").as_deref(), Some(cfg.client_id.as_str()));
        assert_eq!(query(&req.url, "response_type").as_deref(), Some("code"));
        assert_eq!(
            query(&req.url, "code_challenge").as_deref(),
            Some("bKE9UspwyIPg8LsQHkJaiehiTeUdstI5JZOvaoQRgJA")
        );
        assert_eq!(query(&req.url, "code_challenge_method").as_deref(), Some("S256"));
        assert_eq!(
            query(&req.url, "scope").as_deref(),
            Some("user-read-email user-top-read playlist-read-private")
        );
        assert_eq!(query(&req.url, "redirect_uri").as_deref(), Some("http://localhost:8081/"));
        assert_eq!(query(&req.url, "state"), Some(req.state.clone()));
        // the verifier itself never leaves the process during the prompt
        assert!(!req.url.as_str().contains("abc123"));
    }

    #[test]
    fn each_request_gets_a_fresh_state() {
        let cfg = Config::default();
        let pkce = PkcePair::generate().unwrap();
        let a = build_auth_request(&cfg, &pkce).unwrap();
        let b = build_auth_request(&cfg, &pkce).unwrap();
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn parse_success_redirect() {
        let out = parse_redirect("http://localhost:8081/?code=CODE1&state=xyz\n").unwrap();
        assert_eq!(
            out,
            AuthOutcome::Success {
                code: "CODE1".into(),
                state: Some("xyz".into())
            }
        );
    }

    #[test]
    fn parse_custom_scheme_redirect() {
        let out = parse_redirect("my-expo-app://redirect?code=abc").unwrap();
        assert_eq!(
            out,
            AuthOutcome::Success {
                code: "abc".into(),
                state: None
            }
        );
    }

    #[test]
    fn parse_denied_redirect() {
        let out = parse_redirect("http://localhost:8081/?error=access_denied&state=xyz").unwrap();
        assert_eq!(
            out,
            AuthOutcome::Denied {
                error: "access_denied".into(),
                description: None
            }
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_redirect("not a url").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::MalformedRedirect(_))
        ));
        assert!(parse_redirect("http://localhost:8081/?state=xyz").is_err());
    }
}
