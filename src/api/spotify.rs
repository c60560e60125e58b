use crate::config::Config;
use crate::error::AuthError;
use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Opaque bearer credential. Debug output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Result of a successful code exchange. Refresh tokens are not kept.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: AccessToken,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

/// The only part of the /me payload this crate consumes.
///
/// `display_name` must be present but may be null; `id` is the greeting
/// fallback for accounts without a display name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "present_but_nullable")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl UserProfile {
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("Spotify user")
    }
}

// deserialize_with without `default` keeps a missing key an error
fn present_but_nullable<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(d)
}

/// Thin client over the Spotify accounts service and Web API.
/// Endpoint bases come from Config, so tests can route calls to a mock server.
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    redirect_uri: String,
    token_url: String,
    profile_url: String,
}

impl SpotifyClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::new(),
            client_id: cfg.client_id.clone(),
            redirect_uri: cfg.redirect_uri.clone(),
            token_url: cfg.token_endpoint(),
            profile_url: cfg.profile_endpoint(),
        }
    }

    /// Public PKCE clients have no secret, so the Basic credential is the
    /// client id alone.
    fn basic_auth(&self) -> String {
        format!("Basic {}", general_purpose::STANDARD.encode(&self.client_id))
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Fails with `AuthError::MissingVerifier` before touching the network
    /// when no verifier is available.
    pub async fn exchange_code(&self, code: &str, verifier: Option<&str>) -> Result<TokenGrant> {
        let verifier = match verifier {
            Some(v) if !v.is_empty() => v,
            _ => return Err(AuthError::MissingVerifier.into()),
        };
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
            ("client_id", &self.client_id),
            // the token endpoint reads `code_verifier`; a camelCase `codeVerifier` key is ignored
            ("code_verifier", verifier),
        ];
        debug!("exchanging authorization code at {}", self.token_url);
        let resp = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, self.basic_auth())
            .form(&params)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Http {
                endpoint: "token exchange",
                status,
                body,
            }
            .into());
        }

        let bytes = resp.bytes().await?;
        let tr: TokenResponse = serde_json::from_slice(&bytes).map_err(AuthError::TokenDecode)?;
        let expires_at = tr.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        info!("access token granted (scope: {})", tr.scope.as_deref().unwrap_or("-"));
        Ok(TokenGrant {
            access_token: AccessToken::new(tr.access_token),
            token_type: tr.token_type.unwrap_or_else(|| "Bearer".into()),
            expires_at,
            scope: tr.scope,
        })
    }

    /// GET /me with the bearer token.
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        let resp = self
            .client
            .get(&self.profile_url)
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Http {
                endpoint: "profile",
                status,
                body,
            }
            .into());
        }
        let bytes = resp.bytes().await?;
        let profile: UserProfile =
            serde_json::from_slice(&bytes).map_err(AuthError::ProfileDecode)?;
        debug!("fetched profile for {}", profile.greeting_name());
        Ok(profile)
    }
}
