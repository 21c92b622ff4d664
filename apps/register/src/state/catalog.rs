//! # Catalog State
//!
//! Products last fetched from the gateway. Cart commands look products up
//! here; stock figures are only as fresh as the last refresh.

use std::sync::{Mutex, PoisonError};

use sabores_core::{Category, Product};

#[derive(Debug, Default)]
pub struct CatalogState {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached catalog.
    pub fn replace(&self, products: Vec<Product>, categories: Vec<Category>) {
        *self.products.lock().unwrap_or_else(PoisonError::into_inner) = products;
        *self.categories.lock().unwrap_or_else(PoisonError::into_inner) = categories;
    }

    pub fn product(&self, id: i64) -> Option<Product> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn products(&self) -> Vec<Product> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Products of one category, in catalog order.
    pub fn in_category(&self, category_id: i64) -> Vec<Product> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.category_id == Some(category_id))
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
