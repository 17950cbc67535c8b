//! Process-wide session state.
//!
//! The [`SessionStore`] owns the auth token. It is hydrated from
//! [`TokenStorage`] once at startup and afterwards only changes through
//! [`login`](SessionStore::login), [`signup`](SessionStore::signup) and
//! [`logout`](SessionStore::logout). A present token is all "authenticated"
//! means here; expiry and signature are the API's business.

mod error;
mod storage;

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use tracing::{info, warn};

use eshop_core::{AuthResponse, Credentials, SignupRequest};

use crate::api::{self, ApiGateway, Auth, paths};

pub use error::AuthError;
pub use storage::{FileTokenStorage, MemoryTokenStorage, StorageError, TokenStorage};

/// Header carrying the token on API requests; also the storage key.
pub const AUTH_TOKEN_KEY: &str = "x-auth-token";

/// A signed-in session as returned by login or signup.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

/// Handle to the process-wide session.
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    storage: Box<dyn TokenStorage>,
    state: RwLock<SessionState>,
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    hydrated: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.token.is_some())
            .field("hydrated", &state.hydrated)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty, not-yet-hydrated store over `storage`.
    #[must_use]
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                storage: Box::new(storage),
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    /// Create a store and hydrate it immediately.
    #[must_use]
    pub fn open(storage: impl TokenStorage + 'static) -> Self {
        let store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Load the token from storage. Only the first call has any effect.
    ///
    /// Returns whether a token was found. A storage read failure is logged
    /// and treated as "no token".
    pub fn hydrate(&self) -> bool {
        let mut state = self.write();
        if state.hydrated {
            return state.token.is_some();
        }

        let token = match self.inner.storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read stored session, starting signed out");
                None
            }
        };
        // A login that raced ahead of hydration wins over the stored value
        if state.token.is_none() {
            state.token = token.map(SecretString::from);
        }
        state.hydrated = true;
        state.token.is_some()
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.read().hydrated
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// The current token, for attaching to requests.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read().token.clone()
    }

    /// Sign in and remember the returned token.
    ///
    /// A failed attempt leaves any existing session untouched.
    ///
    /// # Errors
    ///
    /// - `AuthError::Rejected` if the API refuses the credentials
    /// - `AuthError::MissingToken` if the response carries no token
    /// - `AuthError::Api` for network or server failures
    /// - `AuthError::Storage` if the token cannot be persisted
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login<G: ApiGateway>(
        &self,
        gateway: &G,
        credentials: &Credentials,
    ) -> Result<Session, AuthError> {
        let body = api::encode(credentials)?;
        let response = gateway.post(paths::SIGNIN, body, Auth::Anonymous).await?;
        let session = self.establish(api::decode(response)?)?;
        info!("Signed in");
        Ok(session)
    }

    /// Create an account and remember the returned token.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login). An API that creates the account but
    /// returns no token yields `AuthError::MissingToken`; the account exists
    /// and a subsequent login will work.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn signup<G: ApiGateway>(
        &self,
        gateway: &G,
        request: &SignupRequest,
    ) -> Result<Session, AuthError> {
        let body = api::encode(request)?;
        let response = gateway.post(paths::SIGNUP, body, Auth::Anonymous).await?;
        let session = self.establish(api::decode(response)?)?;
        info!("Signed up");
        Ok(session)
    }

    /// Forget the token, in storage and in memory. Never fails.
    pub fn logout(&self) {
        if let Err(e) = self.inner.storage.clear() {
            warn!(error = %e, "Could not clear stored session");
        }
        self.write().token = None;
        info!("Signed out");
    }

    fn establish(&self, response: AuthResponse) -> Result<Session, AuthError> {
        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.inner.storage.store(&token)?;
        self.write().token = Some(SecretString::from(token.clone()));

        Ok(Session {
            token: SecretString::from(token),
            email: response.email,
            roles: response.roles,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use secrecy::ExposeSecret;
    use serde_json::{Value, json};

    use super::*;
    use crate::api::ApiError;
    use eshop_core::Email;

    /// Gateway that replays canned responses and records requests.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedGateway {
        pub(crate) responses: Arc<Mutex<VecDeque<Result<Value, ApiError>>>>,
        pub(crate) requests: Arc<Mutex<Vec<(String, String, Value, Auth)>>>,
    }

    impl ScriptedGateway {
        pub(crate) fn respond(&self, response: Result<Value, ApiError>) -> &Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub(crate) fn requests(&self) -> Vec<(String, String, Value, Auth)> {
            self.requests.lock().unwrap().clone()
        }

        fn next(
            &self,
            method: &str,
            path: &str,
            body: Value,
            auth: Auth,
        ) -> Result<Value, ApiError> {
            self.requests
                .lock()
                .unwrap()
                .push((method.to_string(), path.to_string(), body, auth));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Value::Null))
        }
    }

    impl ApiGateway for ScriptedGateway {
        async fn get(&self, path: &str, auth: Auth) -> Result<Value, ApiError> {
            self.next("GET", path, Value::Null, auth)
        }

        async fn post(&self, path: &str, body: Value, auth: Auth) -> Result<Value, ApiError> {
            self.next("POST", path, body, auth)
        }

        async fn put(&self, path: &str, body: Value, auth: Auth) -> Result<Value, ApiError> {
            self.next("PUT", path, body, auth)
        }

        async fn delete(&self, path: &str, auth: Auth) -> Result<Value, ApiError> {
            self.next("DELETE", path, Value::Null, auth)
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            username: Email::parse("shopper@example.com").unwrap(),
            password: "password1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_token_everywhere() {
        let storage = Arc::new(MemoryTokenStorage::default());
        let store = SessionStore::open(SharedStorage(Arc::clone(&storage)));
        let gateway = ScriptedGateway::default();
        gateway.respond(Ok(json!({"token": "tok-1", "email": "shopper@example.com"})));

        let session = store.login(&gateway, &credentials()).await.unwrap();

        assert_eq!(session.token.expose_secret(), "tok-1");
        assert!(store.is_authenticated());
        assert_eq!(storage.load().unwrap().as_deref(), Some("tok-1"));

        let (method, path, body, auth) = gateway.requests().remove(0);
        assert_eq!(
            (method.as_str(), path.as_str(), auth),
            ("POST", "/auth/signin", Auth::Anonymous)
        );
        assert_eq!(body, json!({"username": "shopper@example.com", "password": "password1"}));
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_previous_session() {
        let storage = MemoryTokenStorage::default();
        storage.seed("old-token");
        let store = SessionStore::open(storage);
        let gateway = ScriptedGateway::default();
        gateway.respond(Err(ApiError::Http {
            status: 401,
            message: "Bad credentials".to_string(),
        }));

        let err = store.login(&gateway, &credentials()).await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected(ref m) if m == "Bad credentials"));
        assert_eq!(store.token().unwrap().expose_secret(), "old-token");
    }

    #[tokio::test]
    async fn test_response_without_token_is_an_error() {
        let store = SessionStore::open(MemoryTokenStorage::default());
        let gateway = ScriptedGateway::default();
        gateway.respond(Ok(json!({"message": "User registered successfully!"})));

        let request = SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: "password1".to_string(),
            contact_number: "5550100".to_string(),
        };
        let err = store.signup(&gateway, &request).await.unwrap_err();

        assert!(matches!(err, AuthError::MissingToken));
        assert!(!store.is_authenticated());
        assert_eq!(gateway.requests()[0].1, "/auth/signup");
    }

    #[tokio::test]
    async fn test_authenticated_tracks_latest_login_and_logout() {
        let storage = Arc::new(MemoryTokenStorage::default());
        let store = SessionStore::open(SharedStorage(Arc::clone(&storage)));
        let gateway = ScriptedGateway::default();
        gateway
            .respond(Ok(json!({"token": "a"})))
            .respond(Ok(json!({"token": "b"})));

        assert!(!store.is_authenticated());
        store.login(&gateway, &credentials()).await.unwrap();
        assert!(store.is_authenticated());
        store.logout();
        assert!(!store.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
        store.login(&gateway, &credentials()).await.unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "b");
    }

    #[test]
    fn test_hydrate_reads_storage_once() {
        let storage = Arc::new(MemoryTokenStorage::default());
        storage.seed("persisted");
        let store = SessionStore::new(SharedStorage(Arc::clone(&storage)));

        assert!(!store.is_hydrated());
        assert!(!store.is_authenticated());

        assert!(store.hydrate());
        assert!(store.is_authenticated());

        // Later storage changes are not re-read
        storage.clear().unwrap();
        assert!(store.hydrate());
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::open(MemoryTokenStorage::default());
        let other = store.clone();
        store.write().token = Some(SecretString::from("t"));
        assert!(other.is_authenticated());
        other.logout();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let storage = MemoryTokenStorage::default();
        storage.seed("very-secret-token");
        let store = SessionStore::open(storage);
        let debug = format!("{store:?}");
        assert!(debug.contains("authenticated: true"));
        assert!(!debug.contains("very-secret-token"));
    }

    /// Lets a test keep a handle on storage owned by the store.
    struct SharedStorage(Arc<MemoryTokenStorage>);

    impl TokenStorage for SharedStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            self.0.load()
        }

        fn store(&self, token: &str) -> Result<(), StorageError> {
            self.0.store(token)
        }

        fn clear(&self) -> Result<(), StorageError> {
            self.0.clear()
        }
    }
}
