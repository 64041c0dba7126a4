//! Product catalog types, assembled by the backend from the product tab of
//! the tabular store plus the file-store image search.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListItem {
    pub sku: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductListItem>,
}

/// An image resolved for a product. `url` always points at the backend's
/// image proxy, never at the file store directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub supplier: Option<String>,
    pub disclaimer: Option<String>,
    pub inci: Option<String>,
    pub ingredients: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub alcohol_content: Option<String>,
    pub price: Option<String>,
    pub price_per_unit: Option<String>,
    pub volume: String,
    pub main_image: Option<String>,
    pub main_image_file_name: Option<String>,
    pub nutritional_images: Vec<ProductImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// Raw grid slice of the product tab, for the data-grid preview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGrid {
    pub values: Vec<Vec<String>>,
    pub last_update: String,
    pub row_count: usize,
}
