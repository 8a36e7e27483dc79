//! Built-in product catalog with category filter and text search

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Category entry that disables filtering
pub const ALL_CATEGORIES: &str = "All";

/// Filter chips shown above the catalog, in display order
pub const FILTER_CATEGORIES: &[&str] = &[
    ALL_CATEGORIES,
    "Healthcare",
    "Education",
    "Finance",
    "Marketing",
    "Real Estate",
    "E-Commerce",
    "Logistics",
    "Enterprise",
    "Services",
    "Media",
    "Blockchain",
];

const BUILTIN_PRODUCTS: &str = include_str!("products.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub title: String,
    pub subtitle: String,
    pub category: String,
    /// Accent color as `#RRGGBB`
    pub color: String,
    pub description: String,
    pub features: Vec<String>,
    /// Captions of the preview screens
    pub labels: Vec<String>,
}

impl Product {
    /// Case-insensitive match against title, subtitle, category and description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.title, &self.subtitle, &self.category, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }

    pub fn in_category(&self, category: &str) -> bool {
        category.eq_ignore_ascii_case(ALL_CATEGORIES)
            || self.category.eq_ignore_ascii_case(category)
    }

    /// Accent color as RGB components
    pub fn accent(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// The catalog shipped with the application
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PRODUCTS).context("Failed to parse built-in product catalog")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> =
            serde_json::from_str(json).context("Invalid product catalog JSON")?;
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products in `category` (or all of them) matching `query`
    pub fn filter(&self, category: &str, query: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.in_category(category) && p.matches(query))
            .collect()
    }
}
