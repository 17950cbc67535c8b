//! Gateway to the remote storefront REST API.
//!
//! # Architecture
//!
//! - [`ApiGateway`] is the seam: four verbs over a resource path, JSON in and out
//! - [`HttpGateway`] is the `reqwest` implementation; it reads the session token
//!   from the [`SessionStore`](crate::session::SessionStore) on every call
//! - Typed services ([`Catalog`](crate::catalog::Catalog),
//!   [`AddressBook`](crate::addresses::AddressBook), the checkout wizard) decode
//!   the JSON with [`decode`]
//!
//! # Example
//!
//! ```rust,ignore
//! let gateway = HttpGateway::new(&config, session.clone())?;
//! let products = gateway.get(paths::PRODUCTS, Auth::Token).await?;
//! ```

mod http;
pub mod paths;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpGateway;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Server-provided message, or a truncated body.
        message: String,
    },

    /// The body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, if the server responded at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the server refused the request as a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }
}

/// Whether a request should carry the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach `x-auth-token` when a session exists.
    Token,
    /// Never attach credentials (sign-in, sign-up).
    Anonymous,
}

/// The four verbs the storefront needs from the remote API.
///
/// Every method returns the parsed JSON body; an empty body is `Value::Null`.
pub trait ApiGateway: Send + Sync {
    /// Read a resource (`GET`).
    fn get(&self, path: &str, auth: Auth) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Create a resource (`POST`).
    fn post(
        &self,
        path: &str,
        body: Value,
        auth: Auth,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Replace a resource (`PUT`).
    fn put(
        &self,
        path: &str,
        body: Value,
        auth: Auth,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Delete a resource (`DELETE`).
    fn delete(&self, path: &str, auth: Auth)
    -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// Decode a JSON body into a typed value.
///
/// # Errors
///
/// Returns `ApiError::Decode` if the body does not match `T`.
pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| {
        tracing::warn!(error = %e, "Unexpected response shape");
        ApiError::Decode(e)
    })
}

/// Encode a request body.
///
/// # Errors
///
/// Returns `ApiError::Decode` if `value` cannot be represented as JSON.
pub fn encode<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}
