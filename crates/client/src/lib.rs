//! eshop storefront client.
//!
//! Everything a front end needs to talk to the eshop REST API: the session
//! store, the HTTP gateway, the route guard for protected views, the catalog
//! and the checkout wizard. Rendering is left to the caller; flows that finish
//! hand back a [`navigation::Navigation`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod guard;
pub mod navigation;
pub mod session;
pub mod validation;
