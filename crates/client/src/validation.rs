//! Client-side form validation.
//!
//! Validation failures are field-level and never reach the network.

use thiserror::Error;

use eshop_core::{AddressField, AddressForm, ProductDraft};

/// A form that cannot be submitted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select address!")]
    NoAddressSelected,

    #[error("All address fields are required")]
    MissingAddressFields(Vec<AddressField>),

    #[error("Product {0} is required")]
    MissingProductField(&'static str),

    #[error("Price must be greater than zero")]
    NonPositivePrice,
}

/// Check that all four required address fields are filled.
///
/// # Errors
///
/// Returns `ValidationError::MissingAddressFields` naming the blank fields.
pub fn validate_address(form: &AddressForm) -> Result<(), ValidationError> {
    let missing = form.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingAddressFields(missing))
    }
}

/// Check a product before it is created or replaced.
///
/// # Errors
///
/// Returns the first problem found, in form order.
pub fn validate_product(draft: &ProductDraft) -> Result<(), ValidationError> {
    for (field, value) in [
        ("name", &draft.name),
        ("category", &draft.category),
        ("description", &draft.description),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingProductField(field));
        }
    }
    if !draft.price.is_positive() {
        return Err(ValidationError::NonPositivePrice);
    }
    Ok(())
}
