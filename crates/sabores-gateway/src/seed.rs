//! # Demo Catalog
//!
//! Bakery catalog used to seed the in-memory backend for demos and tests.
//!
//! ## Generated Products
//! - Tortas (whole cakes)
//! - Pastelería (individual pastries)
//! - Panadería (bread)
//! - Sin Azúcar (sugar-free line)
//!
//! Ids are assigned in order: categories from 1, products from 1.

use sabores_core::{Category, Money, Product};

/// (category name, description, [(product name, price in pesos, stock)])
const CATEGORIES: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Tortas",
        "Tortas enteras para celebraciones",
        &[
            ("Torta Cuadrada de Chocolate", 45_000, 5),
            ("Torta Cuadrada de Frutas", 50_000, 4),
            ("Torta Circular de Vainilla", 40_000, 6),
            ("Torta Tres Leches", 42_000, 3),
        ],
    ),
    (
        "Pastelería",
        "Porciones y dulces individuales",
        &[
            ("Mousse de Chocolate", 5_000, 20),
            ("Tiramisú Clásico", 5_500, 15),
            ("Kuchen de Nuez", 1_200, 30),
            ("Alfajor de Manjar", 800, 50),
        ],
    ),
    (
        "Panadería",
        "Pan amasado del día",
        &[
            ("Pan Amasado (unidad)", 350, 100),
            ("Hallulla (unidad)", 300, 100),
            ("Empanada de Manzana", 3_000, 25),
        ],
    ),
    (
        "Sin Azúcar",
        "Línea endulzada con stevia",
        &[
            ("Torta Sin Azúcar de Naranja", 48_000, 2),
            ("Cheesecake Sin Azúcar", 47_000, 2),
        ],
    ),
];

/// Builds the demo categories.
pub fn demo_categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, (name, description, _))| Category {
            id: i as i64 + 1,
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .collect()
}

/// Builds the demo products.
pub fn demo_products() -> Vec<Product> {
    let mut products = Vec::new();

    for (category_index, (_, _, items)) in CATEGORIES.iter().enumerate() {
        for (name, price, stock) in items.iter() {
            products.push(Product {
                id: products.len() as i64 + 1,
                name: name.to_string(),
                description: None,
                price: Money::from_pesos(*price),
                stock: *stock,
                category_id: Some(category_index as i64 + 1),
                image_url: None,
            });
        }
    }

    products
}
