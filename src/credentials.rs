//! Nylas API credentials.

use crate::error::{NylasError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const DEFAULT_API_URI: &str = "https://api.us.nylas.com";

/// Access token and API region for one Nylas application.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,

    /// Base URI of the API; the US region is used when unset
    #[serde(default)]
    pub api_uri: Option<String>,
}

impl Credentials {
    pub fn new(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            api_uri: None,
        }
    }

    pub fn with_api_uri(mut self, api_uri: &str) -> Self {
        self.api_uri = Some(api_uri.to_string());
        self
    }

    /// Base URI every request path is appended to.
    pub fn base_uri(&self) -> &str {
        self.api_uri
            .as_deref()
            .map(|uri| uri.trim().trim_end_matches('/'))
            .filter(|uri| !uri.is_empty())
            .unwrap_or(DEFAULT_API_URI)
    }

    /// Load from `NYLAS_ACCESS_TOKEN` and optional `NYLAS_API_URI`.
    pub fn from_env() -> Result<Self> {
        let access_token = env::var("NYLAS_ACCESS_TOKEN")
            .map_err(|_| NylasError::Config("Missing env var NYLAS_ACCESS_TOKEN".to_string()))?;
        let api_uri = env::var("NYLAS_API_URI").ok();

        Ok(Self {
            access_token,
            api_uri,
        })
    }
}

// Keeps the token out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("api_uri", &self.api_uri)
            .finish()
    }
}
