//! # Catalog Commands
//!
//! Refreshing and browsing the product grid.

use serde::Serialize;
use tracing::{debug, info};

use sabores_core::{Category, Product};

use crate::error::ApiError;
use crate::state::{CartState, CatalogState, SessionState};

/// Product grid payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

/// One product button in the grid.
///
/// `available` is how many more units the cached stock lets the cashier
/// add on top of what is already in the cart; the "+" button is disabled
/// at zero.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTile {
    pub product: Product,
    pub in_stock: bool,
    pub available: i64,
}

/// Reloads products and categories from the backend.
///
/// Called at startup and after every confirmed sale, so stock figures in
/// the grid follow the server.
pub async fn refresh_catalog(
    session: &SessionState,
    catalog: &CatalogState,
) -> Result<CatalogResponse, ApiError> {
    debug!("refresh_catalog command");

    let gateway = session.gateway();
    let products = gateway.fetch_catalog().await?;
    let categories = gateway.fetch_categories().await?;

    info!(products = products.len(), categories = categories.len(), "Catalog refreshed");
    catalog.replace(products.clone(), categories.clone());

    Ok(CatalogResponse {
        categories,
        products,
    })
}

/// The cached catalog, without a backend round trip.
pub fn get_catalog(catalog: &CatalogState) -> CatalogResponse {
    debug!("get_catalog command");
    CatalogResponse {
        categories: catalog.categories(),
        products: catalog.products(),
    }
}

/// Products of one category from the cached catalog, with what the cart
/// still allows of each.
pub fn list_category(catalog: &CatalogState, cart: &CartState, category_id: i64) -> Vec<ProductTile> {
    debug!(category_id, "list_category command");
    let products = catalog.in_category(category_id);
    cart.with_cart(|c| {
        products
            .into_iter()
            .map(|product| ProductTile {
                in_stock: product.is_in_stock(),
                available: c.available_to_add(&product),
                product,
            })
            .collect()
    })
}
