//! Saved shipping addresses outside the checkout flow.

use thiserror::Error;
use tracing::{info, instrument};

use eshop_core::{Address, AddressForm};

use crate::api::{self, ApiError, ApiGateway, Auth, paths};
use crate::validation::{ValidationError, validate_address};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to fetch addresses")]
    Fetch(#[source] ApiError),

    #[error("Failed to save address")]
    Save(#[source] ApiError),
}

/// The signed-in user's address book.
#[derive(Debug, Clone)]
pub struct AddressBook<G> {
    gateway: G,
}

impl<G: ApiGateway> AddressBook<G> {
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Returns `AddressError::Fetch` if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Address>, AddressError> {
        let body = self
            .gateway
            .get(paths::ADDRESSES, Auth::Token)
            .await
            .map_err(AddressError::Fetch)?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        api::decode(body).map_err(AddressError::Fetch)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// - `AddressError::Validation` if a required field is blank (no request is made)
    /// - `AddressError::Save` if the API call fails
    #[instrument(skip(self, form))]
    pub async fn create(&self, form: &AddressForm) -> Result<Address, AddressError> {
        validate_address(form)?;
        let body = api::encode(form).map_err(AddressError::Save)?;
        let address: Address = self
            .gateway
            .post(paths::ADDRESSES, body, Auth::Token)
            .await
            .and_then(api::decode)
            .map_err(AddressError::Save)?;
        info!(address_id = %address.id, "Address saved");
        Ok(address)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::session::tests::ScriptedGateway;

    #[tokio::test]
    async fn test_list_treats_empty_body_as_no_addresses() {
        let gateway = ScriptedGateway::default();
        let book = AddressBook::new(gateway.clone());

        assert!(book.list().await.unwrap().is_empty());
        assert_eq!(gateway.requests()[0].3, Auth::Token);
    }

    #[tokio::test]
    async fn test_create_validates_before_posting() {
        let gateway = ScriptedGateway::default();
        gateway.respond(Ok(json!({
            "id": "a1", "street": "Main", "city": "X", "state": "Y", "zipCode": "1"
        })));
        let book = AddressBook::new(gateway.clone());

        let err = book
            .create(&AddressForm::new("Main", "", "Y", "1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "All address fields are required");
        assert!(gateway.requests().is_empty());

        let saved = book
            .create(&AddressForm::new("Main", "X", "Y", "1"))
            .await
            .unwrap();
        assert_eq!(saved.to_string(), "Main, X, Y 1");
    }
}
