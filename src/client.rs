//! Authenticated HTTP calls to the Nylas API.

use crate::credentials::Credentials;
use crate::request::{Method, RequestDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by an [`HttpCaller`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The service answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        /// `message` from the response body, when the service sent one
        message: Option<String>,
    },

    /// The call could not complete (network, DNS, TLS, a cut-off body).
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Performs one authenticated call and returns the parsed JSON body.
#[async_trait]
pub trait HttpCaller: Send + Sync {
    async fn call(&self, request: &RequestDescriptor) -> Result<Value, CallError>;
}

/// `reqwest` backed caller using bearer authentication.
#[derive(Debug, Clone)]
pub struct NylasClient {
    http: Client,
    credentials: Credentials,
}

impl NylasClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_client(Client::new(), credentials)
    }

    pub fn with_client(http: Client, credentials: Credentials) -> Self {
        Self { http, credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Check the credentials by listing the application.
    pub async fn verify_credentials(&self) -> Result<(), CallError> {
        let url = format!("{}/v3/applications", self.credentials.base_uri());
        tracing::debug!(url = %url, "Verifying Nylas credentials");

        self.send(Method::Get, &url, None, None).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: Option<&[(&str, &Value)]>,
        body: Option<&Value>,
    ) -> Result<Value, CallError> {
        let mut request = self
            .http
            .request(method.into(), url)
            .bearer_auth(&self.credentials.access_token);

        if let Some(query) = query {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CallError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        // Non-JSON answers are kept as text under `body`
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => Ok(body),
            Err(_) => Ok(serde_json::json!({ "body": text })),
        }
    }
}

#[async_trait]
impl HttpCaller for NylasClient {
    async fn call(&self, request: &RequestDescriptor) -> Result<Value, CallError> {
        let url = request.url(self.credentials.base_uri());
        let query: Vec<(&str, &Value)> = request
            .query()
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();

        self.send(request.method(), &url, Some(&query), request.body())
            .await
    }
}

/// Pull the server's message from an error body.
///
/// Nylas v3 nests it under `error.message`; older shapes put it at the top.
fn error_message(text: &str) -> Option<String> {
    let body: Value = serde_json::from_str(text).ok()?;
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str))
        .map(str::to_string)
}
