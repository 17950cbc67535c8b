//! End-to-end test support for eshop.
//!
//! [`StubApi`] serves the storefront REST API from memory on an ephemeral
//! port, so tests drive the real [`HttpGateway`] over real HTTP without a
//! remote deployment.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eshop-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let api = StubApi::spawn().await;
//! api.add_user("shopper@example.com", "password1");
//! let client = api.client(MemoryTokenStorage::default());
//! client.session.login(&client.gateway, &credentials).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use eshop_client::api::HttpGateway;
use eshop_client::config::ClientConfig;
use eshop_client::session::{AUTH_TOKEN_KEY, SessionStore, TokenStorage};

/// In-memory stand-in for the remote storefront API.
#[derive(Clone)]
pub struct StubApi {
    pub base_url: String,
    state: Arc<Mutex<StubState>>,
}

#[derive(Default)]
struct StubState {
    users: HashMap<String, String>,
    tokens: HashSet<String>,
    products: Vec<Value>,
    addresses: Vec<Value>,
    orders: Vec<Value>,
    next_id: u32,
    address_listing_down: bool,
}

impl StubState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn issue_token(&mut self) -> String {
        let token = self.next_id("token-");
        self.tokens.insert(token.clone());
        token
    }

    fn product_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.products.iter_mut().find(|p| p["id"] == id)
    }
}

/// A session store and gateway wired to a [`StubApi`].
pub struct StubClient {
    pub session: SessionStore,
    pub gateway: HttpGateway,
}

type Shared = Arc<Mutex<StubState>>;

impl StubApi {
    /// Start the stub on `127.0.0.1` with an OS-assigned port.
    pub async fn spawn() -> Self {
        let state = Shared::default();
        let router = Router::new()
            .route("/auth/signup", post(signup))
            .route("/auth/signin", post(signin))
            .route("/products", get(list_products).post(create_product))
            .route("/products/categories", get(categories))
            .route(
                "/products/{id}",
                get(show_product).put(replace_product).delete(delete_product),
            )
            .route("/addresses", get(list_addresses).post(create_address))
            .route("/orders", post(create_order))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Register an account that can sign in.
    pub fn add_user(&self, email: &str, password: &str) {
        self.lock().users.insert(email.to_string(), password.to_string());
    }

    /// Add a product to the catalog. `product` must carry an `id`.
    pub fn add_product(&self, product: Value) {
        self.lock().products.push(product);
    }

    /// Save an address as if the user had created it earlier.
    pub fn add_address(&self, address: Value) {
        self.lock().addresses.push(address);
    }

    /// Make `GET /addresses` answer 500 from now on.
    pub fn fail_address_listing(&self) {
        self.lock().address_listing_down = true;
    }

    /// Order bodies received so far.
    pub fn orders(&self) -> Vec<Value> {
        self.lock().orders.clone()
    }

    pub fn addresses(&self) -> Vec<Value> {
        self.lock().addresses.clone()
    }

    pub fn products(&self) -> Vec<Value> {
        self.lock().products.clone()
    }

    /// Build a hydrated client over `storage`.
    pub fn client(&self, storage: impl TokenStorage + 'static) -> StubClient {
        let session = SessionStore::open(storage);
        let config = ClientConfig::new(&self.base_url).unwrap();
        let gateway = HttpGateway::new(&config, session.clone()).unwrap();
        StubClient { session, gateway }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        lock(&self.state)
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Reject requests without a token this stub issued.
fn authorize(state: &StubState, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers.get(AUTH_TOKEN_KEY).and_then(|v| v.to_str().ok());
    match token {
        Some(token) if state.tokens.contains(token) => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let Some(email) = body["email"].as_str().map(str::to_owned) else {
        return error(StatusCode::BAD_REQUEST, "Email is required");
    };
    if state.users.contains_key(&email) {
        return error(StatusCode::BAD_REQUEST, "Error: Email is already in use!");
    }
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state.users.insert(email.clone(), password);
    let token = state.issue_token();
    Json(json!({ "token": token, "email": email, "roles": ["USER"] })).into_response()
}

async fn signin(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if state.users.get(username).map(String::as_str) != Some(password) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let email = username.to_string();
    let token = state.issue_token();
    Json(json!({ "token": token, "email": email, "roles": ["USER"] })).into_response()
}

async fn list_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let needle = query.get("search").map(|s| s.to_lowercase());
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| {
            needle.as_ref().is_none_or(|needle| {
                p["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(needle))
            })
        })
        .cloned()
        .collect();
    Json(products).into_response()
}

async fn categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut names: Vec<&str> = state
        .products
        .iter()
        .filter_map(|p| p["category"].as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    Json(names).into_response()
}

async fn show_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.product_mut(&id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(p.clone()).into_response(),
    )
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let id = state.next_id("p");
    body["id"] = json!(id);
    state.products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn replace_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    body["id"] = json!(id);
    match state.product_mut(&id) {
        Some(product) => {
            *product = body.clone();
            Json(body).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let before = state.products.len();
    state.products.retain(|p| p["id"] != id.as_str());
    if state.products.len() == before {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_addresses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    if state.address_listing_down {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }
    Json(state.addresses.clone()).into_response()
}

async fn create_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let id = state.next_id("a");
    body["id"] = json!(id);
    state.addresses.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    let address_known = state.addresses.iter().any(|a| a["id"] == body["addressId"]);
    let product_id = body["productId"].as_str().unwrap_or_default().to_string();
    let Some(product) = state.product_mut(&product_id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    let available = product["availableItems"].as_u64().unwrap_or_default();
    if quantity == 0 || quantity > available || !address_known {
        return error(StatusCode::BAD_REQUEST, "Invalid order");
    }
    product["availableItems"] = json!(available - quantity);

    let id = state.next_id("o");
    state.orders.push(body.clone());
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}
