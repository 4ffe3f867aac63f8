use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Product, ProductCategory, ProductImage};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 3, max = 100, message = "name must be 3 to 100 characters"))]
    pub name: String,
    pub category: ProductCategory,
    #[validate(length(max = 1000, message = "description must stay under 1000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1000000, message = "price out of range"))]
    pub price: i64,
    #[validate(range(min = 0, max = 10000, message = "stock out of range"))]
    pub stock: i32,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 3, max = 100, message = "name must be 3 to 100 characters"))]
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    #[validate(length(max = 1000, message = "description must stay under 1000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1000000, message = "price out of range"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = 10000, message = "stock out of range"))]
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockAdjustRequest {
    pub delta: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddImageRequest {
    pub url: String,
}

/// Catalog entry with its gallery, ordered oldest image first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductDetail>,
}
