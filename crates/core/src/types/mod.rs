//! Core types for the storefront client.
//!
//! This module provides type-safe wrappers for the domain concepts exchanged
//! with the remote API.

pub mod address;
pub mod auth;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;

pub use address::{Address, AddressField, AddressForm};
pub use auth::{AuthResponse, Credentials, SignupRequest};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::OrderDraft;
pub use price::Price;
pub use product::{Product, ProductDraft};
pub use quantity::{Quantity, QuantityError};
