//! Multi-step checkout.
//!
//! Three stages: pick or create a shipping address, review the order, see the
//! confirmation. [`state`] holds the pure transition table; [`CheckoutWizard`]
//! drives it against an [`ApiGateway`](crate::api::ApiGateway) and owns the
//! post-confirmation redirect timer.

mod error;
pub mod state;
mod wizard;

use std::time::Duration;

pub use error::WizardError;
pub use state::{CheckoutEntry, Effect, OrderSummary, Pending, Step, WizardEvent, WizardState};
pub use wizard::CheckoutWizard;

/// How long the confirmation stays up before returning to the catalog.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub(crate) const ORDER_SUCCESS: &str = "Order placed successfully!";
pub(crate) const ORDER_FAILED: &str = "Failed to place order";
pub(crate) const ADDRESS_SAVE_FAILED: &str = "Failed to save address";
pub(crate) const ADDRESSES_FAILED: &str = "Failed to fetch addresses";
