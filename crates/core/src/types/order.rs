//! Order submission types.

use serde::{Deserialize, Serialize};

use super::{AddressId, ProductId, Quantity};

/// An order about to be submitted: one product, a quantity, a shipping address.
///
/// Serializes to exactly `{productId, quantity, addressId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub address_id: AddressId,
}
