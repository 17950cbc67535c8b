//! Navigation handoff to the front end's router.
//!
//! Flows that finish (checkout, product admin) don't render anything
//! themselves; they emit a [`Navigation`] naming the next view and an optional
//! status message, and whatever owns the receiver decides how to show it.

use core::fmt;

use tokio::sync::mpsc;

use eshop_core::ProductId;

/// Views the storefront knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Products,
    ProductDetail(ProductId),
    AddProduct,
    CreateOrder,
}

impl Route {
    /// URL-style path for this view.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetail(id) => format!("/products/{id}"),
            Self::AddProduct => "/products/add".to_string(),
            Self::CreateOrder => "/orders/create".to_string(),
        }
    }

    /// Whether the view sits behind the route guard.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Home | Self::Login | Self::Signup)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A request to switch views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub message: Option<String>,
}

impl Navigation {
    #[must_use]
    pub const fn to(route: Route) -> Self {
        Self {
            route,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(route: Route, message: impl Into<String>) -> Self {
        Self {
            route,
            message: Some(message.into()),
        }
    }
}

/// Sending half of the router's inbox.
pub type Navigator = mpsc::UnboundedSender<Navigation>;

/// Receiving half, owned by the front end.
pub type NavigationInbox = mpsc::UnboundedReceiver<Navigation>;

/// Create a connected navigator/inbox pair.
#[must_use]
pub fn channel() -> (Navigator, NavigationInbox) {
    mpsc::unbounded_channel()
}

/// Hand `navigation` to the router. A router that has gone away is not an error.
pub fn navigate(navigator: &Navigator, navigation: Navigation) {
    if let Err(mpsc::error::SendError(dropped)) = navigator.send(navigation) {
        tracing::debug!(route = %dropped.route, "Navigation dropped, router is gone");
    }
}
