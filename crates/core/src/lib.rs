//! eshop Core - Shared types library.
//!
//! This crate provides the domain types used across the eshop workspace:
//! - `eshop-client` - Session store, API gateway, route guard and checkout wizard
//! - `eshop-cli` - Terminal storefront built on the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Everything here (de)serializes to the remote API's JSON shapes.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, quantities, emails, addresses, products and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
