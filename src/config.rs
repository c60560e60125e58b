use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Used both when building the authorization URL and at token exchange;
    /// the provider rejects the exchange if the two differ.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    // Endpoints
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Directory for the daily-rotated log file. Logs go to stderr only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_client_id() -> String { "44cffff47a2d442a8022bebcd5602586".into() }
fn default_redirect_uri() -> String { "http://localhost:8081/".into() }
fn default_auth_base() -> String { "https://accounts.spotify.com".into() }
// include v1 path by default
fn default_api_base() -> String { "https://api.spotify.com/v1".into() }

fn default_scopes() -> Vec<String> {
    vec!["user-read-email", "user-top-read", "playlist-read-private"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            auth_base: default_auth_base(),
            api_base: default_api_base(),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Endpoints and client id may be overridden by SPOTIFY_AUTH_BASE,
    /// SPOTIFY_API_BASE and SPOTIFY_CLIENT_ID (useful for tests and staging).
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SPOTIFY_AUTH_BASE") {
            self.auth_base = v;
        }
        if let Ok(v) = env::var("SPOTIFY_API_BASE") {
            self.api_base = v;
        }
        if let Ok(v) = env::var("SPOTIFY_CLIENT_ID") {
            self.client_id = v;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(anyhow!("client_id must not be empty"));
        }
        Url::parse(&self.redirect_uri)
            .map_err(|e| anyhow!("invalid redirect_uri '{}': {}", self.redirect_uri, e))?;
        Url::parse(&self.auth_base)
            .map_err(|e| anyhow!("invalid auth_base '{}': {}", self.auth_base, e))?;
        Url::parse(&self.api_base)
            .map_err(|e| anyhow!("invalid api_base '{}': {}", self.api_base, e))?;
        Ok(())
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/authorize", self.auth_base.trim_end_matches('/'))
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/api/token", self.auth_base.trim_end_matches('/'))
    }

    pub fn profile_endpoint(&self) -> String {
        format!("{}/me", self.api_base.trim_end_matches('/'))
    }
}
