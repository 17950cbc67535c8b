//! Route guard for protected views.
//!
//! A protected view only renders once the guard hands it an
//! [`Authenticated`] capability. The guard refuses to decide before the
//! session has hydrated, so a stored session is never mistaken for a missing
//! one during startup.
//!
//! # Example
//!
//! ```rust,ignore
//! let guard = RouteGuard::new(session.clone());
//! match guard.render_with(|auth| products_view(auth)) {
//!     Ok(view) => view.await?,
//!     Err(GuardRejection::Unauthenticated { redirect }) => show_login(redirect),
//!     Err(GuardRejection::NotReady) => show_spinner(),
//! }
//! ```

use thiserror::Error;

use crate::navigation::{Navigation, Route};
use crate::session::SessionStore;

/// Proof that the session was authenticated when a view was admitted.
///
/// Only [`RouteGuard`] can construct one.
#[derive(Debug)]
pub struct Authenticated {
    _private: (),
}

/// Why the guard refused to render a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardRejection {
    /// The session has not been loaded from storage yet.
    #[error("session is still loading")]
    NotReady,

    /// No session; the caller should send the user to `redirect`.
    #[error("please log in to continue")]
    Unauthenticated {
        /// Where to send the user.
        redirect: Route,
    },
}

impl GuardRejection {
    /// The navigation a front end should perform, if any.
    #[must_use]
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            Self::NotReady => None,
            Self::Unauthenticated { redirect } => Some(Navigation::to(redirect.clone())),
        }
    }
}

/// A view that may only render for a signed-in user.
pub trait ProtectedView {
    /// What rendering produces (often a future the caller awaits).
    type Output;

    /// Render with proof of authentication.
    fn render(self, auth: &Authenticated) -> Self::Output;
}

/// Gates protected views on the session's authenticated flag.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Check the session without rendering anything.
    ///
    /// # Errors
    ///
    /// - `GuardRejection::NotReady` before hydration
    /// - `GuardRejection::Unauthenticated` when there is no token
    pub fn check(&self) -> Result<Authenticated, GuardRejection> {
        if !self.session.is_hydrated() {
            return Err(GuardRejection::NotReady);
        }
        if !self.session.is_authenticated() {
            tracing::debug!("Protected view requested without a session");
            return Err(GuardRejection::Unauthenticated {
                redirect: Route::Login,
            });
        }
        Ok(Authenticated { _private: () })
    }

    /// Render `view` if the session is authenticated.
    ///
    /// # Errors
    ///
    /// Returns the rejection from [`check`](Self::check).
    pub fn render<V: ProtectedView>(&self, view: V) -> Result<V::Output, GuardRejection> {
        let auth = self.check()?;
        Ok(view.render(&auth))
    }

    /// Closure form of [`render`](Self::render).
    ///
    /// # Errors
    ///
    /// Returns the rejection from [`check`](Self::check).
    pub fn render_with<T>(
        &self,
        view: impl FnOnce(&Authenticated) -> T,
    ) -> Result<T, GuardRejection> {
        let auth = self.check()?;
        Ok(view(&auth))
    }
}
