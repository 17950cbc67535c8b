//! Authentication error types.

use thiserror::Error;

use super::StorageError;
use crate::api::ApiError;

/// Errors that can occur during sign-in, sign-up or session persistence.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The API refused the credentials or the sign-up data.
    #[error("{0}")]
    Rejected(String),

    /// The API accepted the request but returned no token.
    #[error("no session token in the authentication response")]
    MissingToken,

    /// The request did not complete.
    #[error("authentication request failed: {0}")]
    Api(#[source] ApiError),

    /// The token could not be persisted.
    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http { status, message } if (400..500).contains(&status) => {
                if message.trim().is_empty() {
                    Self::Rejected("Invalid credentials".to_string())
                } else {
                    Self::Rejected(message)
                }
            }
            other => Self::Api(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_rejections() {
        let err = AuthError::from(ApiError::Http {
            status: 401,
            message: "Bad credentials".to_string(),
        });
        assert_eq!(err.to_string(), "Bad credentials");

        let err = AuthError::from(ApiError::Http {
            status: 403,
            message: String::new(),
        });
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_server_errors_are_not_rejections() {
        let err = AuthError::from(ApiError::Http {
            status: 502,
            message: "bad gateway".to_string(),
        });
        assert!(matches!(err, AuthError::Api(_)));
    }
}
