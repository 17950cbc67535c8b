//! `reqwest` implementation of [`ApiGateway`].

use std::sync::Arc;

use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ApiError, ApiGateway, Auth};
use crate::config::ClientConfig;
use crate::session::{AUTH_TOKEN_KEY, SessionStore};

/// Longest slice of a response body that ends up in logs or error messages.
const MAX_LOGGED_BODY: usize = 500;

/// HTTP client for the remote storefront API.
///
/// Cheap to clone; clones share the connection pool and the session handle.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    client: reqwest::Client,
    config: ClientConfig,
    session: SessionStore,
}

impl HttpGateway {
    /// Create a gateway that reads its token from `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (e.g., the TLS backend fails to initialize).
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpGatewayInner {
                client,
                config: config.clone(),
                session,
            }),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<Value, ApiError> {
        let url = self.inner.config.endpoint(path);
        let mut request = self
            .inner
            .client
            .request(method, &url)
            .header("Content-Type", "application/json");

        if auth == Auth::Token
            && let Some(token) = self.inner.session.token()
        {
            request = request.header(AUTH_TOKEN_KEY, token.expose_secret());
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Read as text first so failures can be logged with the body
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate(&response_text),
                "API returned non-success status"
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(&response_text),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text),
                "Failed to parse API response"
            );
            ApiError::Decode(e)
        })
    }
}

impl ApiGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn get(&self, path: &str, auth: Auth) -> Result<Value, ApiError> {
        debug!("GET");
        self.send(Method::GET, path, None, auth).await
    }

    #[instrument(skip(self, body))]
    async fn post(&self, path: &str, body: Value, auth: Auth) -> Result<Value, ApiError> {
        debug!("POST");
        self.send(Method::POST, path, Some(body), auth).await
    }

    #[instrument(skip(self, body))]
    async fn put(&self, path: &str, body: Value, auth: Auth) -> Result<Value, ApiError> {
        debug!("PUT");
        self.send(Method::PUT, path, Some(body), auth).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str, auth: Auth) -> Result<Value, ApiError> {
        debug!("DELETE");
        self.send(Method::DELETE, path, None, auth).await
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY).collect()
}

/// Prefer the API's `{"message": ...}` field; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| truncate(body.trim()))
}
