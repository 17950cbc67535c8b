//! Resource paths on the remote API, relative to the configured base URL.

use eshop_core::ProductId;

pub const SIGNUP: &str = "/auth/signup";
pub const SIGNIN: &str = "/auth/signin";

pub const PRODUCTS: &str = "/products";
pub const CATEGORIES: &str = "/products/categories";

pub const ADDRESSES: &str = "/addresses";

pub const ORDERS: &str = "/orders";

/// `/products/{id}`
#[must_use]
pub fn product(id: &ProductId) -> String {
    format!("{PRODUCTS}/{}", urlencoding::encode(id.as_str()))
}

/// `/products?search={query}`
#[must_use]
pub fn product_search(query: &str) -> String {
    format!("{PRODUCTS}?search={}", urlencoding::encode(query))
}
