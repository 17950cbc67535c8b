//! Product create, replace and delete.
//!
//! The API decides who may call these; the client only checks the form and
//! reports back with a [`Navigation`] to the product list.

use tracing::{info, instrument, warn};

use eshop_core::{Product, ProductDraft, ProductId};

use super::{Catalog, CatalogError};
use crate::api::{self, ApiGateway, Auth, paths};
use crate::navigation::{Navigation, Route};
use crate::validation::validate_product;

impl<G: ApiGateway> Catalog<G> {
    /// Create a product.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Validation` if the draft is incomplete (no request is made)
    /// - `CatalogError::AddProduct` if the API call fails
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Navigation, CatalogError> {
        validate_product(draft)?;
        let body = api::encode(draft).map_err(CatalogError::AddProduct)?;
        self.gateway()
            .post(paths::PRODUCTS, body, Auth::Token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Could not add product");
                CatalogError::AddProduct(e)
            })?;

        self.invalidate_categories().await;
        info!("Product added");
        Ok(Navigation::with_message(
            Route::Products,
            format!("Product {} added successfully", draft.name),
        ))
    }

    /// Replace every editable field of product `id`.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Validation` if the draft is incomplete (no request is made)
    /// - `CatalogError::ModifyProduct` if the API call fails
    #[instrument(skip(self, draft), fields(product_id = %id, name = %draft.name))]
    pub async fn replace_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Navigation, CatalogError> {
        validate_product(draft)?;
        let body = api::encode(draft).map_err(CatalogError::ModifyProduct)?;
        self.gateway()
            .put(&paths::product(id), body, Auth::Token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Could not modify product");
                CatalogError::ModifyProduct(e)
            })?;

        self.invalidate_categories().await;
        info!("Product modified");
        Ok(Navigation::with_message(
            Route::Products,
            format!("Product {} modified successfully", draft.name),
        ))
    }

    /// Delete `product`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DeleteProduct` if the API call fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn delete_product(&self, product: &Product) -> Result<Navigation, CatalogError> {
        self.gateway()
            .delete(&paths::product(&product.id), Auth::Token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Could not delete product");
                CatalogError::DeleteProduct(e)
            })?;

        self.invalidate_categories().await;
        info!("Product deleted");
        Ok(Navigation::with_message(
            Route::Products,
            format!("Product {} deleted successfully", product.name),
        ))
    }
}
