//! Checkout error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::validation::ValidationError;

/// Errors surfaced by the checkout wizard.
///
/// The `Display` text is what the shopper sees; the API detail stays in the
/// error source for logs.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The current form cannot be submitted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to fetch addresses")]
    FetchAddresses(#[source] ApiError),

    #[error("Failed to save address")]
    SaveAddress(#[source] ApiError),

    #[error("Failed to place order")]
    PlaceOrder(#[source] ApiError),
}
