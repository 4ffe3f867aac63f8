use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::CartLine;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: i64,
    pub count: i32,
}

/// Per-line availability as re-checked against the live catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct StockCheck {
    pub availability: BTreeMap<Uuid, bool>,
    pub all_available: bool,
}
