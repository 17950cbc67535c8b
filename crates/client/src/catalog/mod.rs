//! Product catalog.
//!
//! Listing, search, detail and category lookups against the remote API, plus
//! the client-side filter and sort the product grid applies. Product
//! create/replace/delete share the category cache and invalidate it.
//!
//! Categories are cached in memory via `moka` (5-minute TTL); product lists
//! are always fetched fresh because stock counts move.

mod admin;

use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use eshop_core::{Product, ProductId, QuantityError};

use crate::api::{self, ApiError, ApiGateway, Auth, paths};
use crate::checkout::CheckoutEntry;
use crate::validation::ValidationError;

const CATEGORIES_KEY: &str = "categories";
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors surfaced by catalog operations.
///
/// `Display` is the message shown to the shopper.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch products. Please try again later.")]
    FetchProducts(#[source] ApiError),

    #[error("Failed to fetch categories")]
    FetchCategories(#[source] ApiError),

    #[error("Failed to fetch product details. Please try again later.")]
    FetchProduct(#[source] ApiError),

    #[error("Failed to add product")]
    AddProduct(#[source] ApiError),

    #[error("Failed to modify product")]
    ModifyProduct(#[source] ApiError),

    #[error("Failed to delete product")]
    DeleteProduct(#[source] ApiError),

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

/// Sort order for the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Whatever order the server returned.
    #[default]
    Default,
    PriceHighToLow,
    PriceLowToHigh,
    /// Most recently modified first; undated products last.
    Newest,
}

impl SortOption {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::PriceHighToLow => "Price: High to Low",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::Newest => "Newest",
        }
    }
}

/// Category toggle above the product grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Build a filter from user input; empty or `all` means no filter.
    #[must_use]
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            None | Some("") => Self::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Self::All,
            Some(s) => Self::Category(s.to_string()),
        }
    }

    fn admits(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => product.category == *name,
        }
    }
}

/// Filter, then sort, a product list for display.
///
/// Sorting is stable, so ties keep the server's order.
#[must_use]
pub fn arrange(products: Vec<Product>, filter: &CategoryFilter, sort: SortOption) -> Vec<Product> {
    let mut products: Vec<Product> = products.into_iter().filter(|p| filter.admits(p)).collect();
    match sort {
        SortOption::Default => {}
        SortOption::PriceHighToLow => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOption::PriceLowToHigh => products.sort_by(|a, b| a.price.cmp(&b.price)),
        // `None` orders before `Some`, so reversing puts undated products last
        SortOption::Newest => products.sort_by(|a, b| b.modified_at.cmp(&a.modified_at)),
    }
    products
}

/// Start a checkout for `units` of `product` ("Buy Now").
///
/// # Errors
///
/// - `CatalogError::OutOfStock` when nothing is left
/// - `CatalogError::Quantity` when `units` is zero or above the stock
pub fn buy_now(product: Product, units: u32) -> Result<CheckoutEntry, CatalogError> {
    if !product.in_stock() {
        return Err(CatalogError::OutOfStock(product.name));
    }
    let quantity = product.quantity(units)?;
    Ok(CheckoutEntry { product, quantity })
}

/// Typed access to the product endpoints.
///
/// Cheap to clone when the gateway is; clones share the category cache.
#[derive(Clone)]
pub struct Catalog<G> {
    gateway: G,
    categories: Cache<&'static str, Vec<String>>,
}

impl<G: ApiGateway> Catalog<G> {
    #[must_use]
    pub fn new(gateway: G) -> Self {
        let categories = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();
        Self {
            gateway,
            categories,
        }
    }

    /// List products, optionally narrowed by a server-side search.
    ///
    /// A blank query lists everything.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FetchProducts` if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, search: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        let path = match search.map(str::trim) {
            Some(query) if !query.is_empty() => paths::product_search(query),
            _ => paths::PRODUCTS.to_string(),
        };
        let body = self
            .gateway
            .get(&path, Auth::Token)
            .await
            .map_err(CatalogError::FetchProducts)?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        api::decode(body).map_err(CatalogError::FetchProducts)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FetchProduct` if the request fails or the
    /// product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.gateway
            .get(&paths::product(id), Auth::Token)
            .await
            .and_then(api::decode)
            .map_err(|e| {
                warn!(error = %e, "Could not fetch product");
                CatalogError::FetchProduct(e)
            })
    }

    /// Category names, served from cache for five minutes.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FetchCategories` if the request fails. Failures
    /// are not cached.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(categories) = self.categories.get(CATEGORIES_KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self
            .gateway
            .get(paths::CATEGORIES, Auth::Token)
            .await
            .and_then(api::decode)
            .map_err(CatalogError::FetchCategories)?;

        self.categories
            .insert(CATEGORIES_KEY, categories.clone())
            .await;
        Ok(categories)
    }

    /// Drop cached categories so the next lookup refetches.
    pub async fn invalidate_categories(&self) {
        self.categories.invalidate(CATEGORIES_KEY).await;
    }

    pub(crate) const fn gateway(&self) -> &G {
        &self.gateway
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::session::tests::ScriptedGateway;

    fn products() -> Vec<Product> {
        serde_json::from_value(json!([
            {"id": "a", "name": "A", "category": "Home", "price": 20, "modifiedAt": "2024-01-01T00:00:00Z"},
            {"id": "b", "name": "B", "category": "Office", "price": 5},
            {"id": "c", "name": "C", "category": "home", "price": 50, "modifiedAt": "2024-06-01T00:00:00Z"},
            {"id": "d", "name": "D", "category": "Office", "price": 20, "modifiedAt": "2023-01-01T00:00:00Z"}
        ]))
        .unwrap()
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_keeps_server_order() {
        let arranged = arrange(products(), &CategoryFilter::All, SortOption::Default);
        assert_eq!(ids(&arranged), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_price_sorts_are_stable() {
        let high = arrange(products(), &CategoryFilter::All, SortOption::PriceHighToLow);
        assert_eq!(ids(&high), ["c", "a", "d", "b"]);

        let low = arrange(products(), &CategoryFilter::All, SortOption::PriceLowToHigh);
        assert_eq!(ids(&low), ["b", "a", "d", "c"]);
    }

    #[test]
    fn test_newest_puts_undated_last() {
        let newest = arrange(products(), &CategoryFilter::All, SortOption::Newest);
        assert_eq!(ids(&newest), ["c", "a", "d", "b"]);
    }

    #[test]
    fn test_filter_runs_before_sort() {
        let office = arrange(
            products(),
            &CategoryFilter::parse(Some("Office")),
            SortOption::PriceHighToLow,
        );
        assert_eq!(ids(&office), ["d", "b"]);
        assert_eq!(CategoryFilter::parse(Some(" all ")), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(None), CategoryFilter::All);
    }

    #[test]
    fn test_category_match_is_exact() {
        let home = arrange(products(), &CategoryFilter::parse(Some("Home")), SortOption::Default);
        assert_eq!(ids(&home), ["a"]);

        let lower = arrange(products(), &CategoryFilter::parse(Some("home")), SortOption::Default);
        assert_eq!(ids(&lower), ["c"]);

        let shouted = arrange(
            products(),
            &CategoryFilter::parse(Some("HOME")),
            SortOption::Default,
        );
        assert!(shouted.is_empty());
    }

    #[test]
    fn test_sort_labels() {
        assert_eq!(SortOption::default().label(), "Default");
        assert_eq!(SortOption::PriceHighToLow.label(), "Price: High to Low");
    }

    #[test]
    fn test_buy_now_refuses_empty_stock() {
        let mut product = products().remove(0);
        let err = buy_now(product.clone(), 1).unwrap_err();
        assert_eq!(err.to_string(), "A is out of stock");

        product.available_items = 2;
        assert!(matches!(buy_now(product.clone(), 3), Err(CatalogError::Quantity(_))));
        assert_eq!(buy_now(product, 2).unwrap().quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_blank_search_lists_everything() {
        let gateway = ScriptedGateway::default();
        gateway.respond(Ok(json!([]))).respond(Ok(json!([])));
        let catalog = Catalog::new(gateway.clone());

        catalog.products(Some("   ")).await.unwrap();
        catalog.products(Some("red lamp")).await.unwrap();

        let requests = gateway.requests();
        assert_eq!(requests[0].1, "/products");
        assert_eq!(requests[1].1, "/products?search=red%20lamp");
        assert_eq!(requests[0].3, Auth::Token);
    }

    #[tokio::test]
    async fn test_categories_are_cached() {
        let gateway = ScriptedGateway::default();
        gateway
            .respond(Ok(json!(["Home", "Office"])))
            .respond(Ok(json!(["Home", "Office", "Garden"])));
        let catalog = Catalog::new(gateway.clone());

        assert_eq!(catalog.categories().await.unwrap(), ["Home", "Office"]);
        assert_eq!(catalog.categories().await.unwrap(), ["Home", "Office"]);
        assert_eq!(gateway.requests().len(), 1);

        catalog.invalidate_categories().await;
        assert_eq!(catalog.categories().await.unwrap().len(), 3);
        assert_eq!(gateway.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failures_carry_shopper_message() {
        let gateway = ScriptedGateway::default();
        gateway.respond(Err(ApiError::Http {
            status: 500,
            message: String::new(),
        }));
        let catalog = Catalog::new(gateway);

        let err = catalog.product(&ProductId::new("p1")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch product details. Please try again later."
        );
    }
}
