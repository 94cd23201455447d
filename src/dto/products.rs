use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub id: String,
    pub name: String,
    pub category1_id: String,
    pub category2_id: String,
    pub unit: String,
    pub supplier: String,
    pub description: Option<String>,
    pub price_per_unit: i64,
    pub order_min_quantity: f64,
    pub order_unit: String,
    pub price_per_min_order: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier: Option<String>,
    pub price_per_unit: Option<i64>,
    pub order_min_quantity: Option<f64>,
    pub order_unit: Option<String>,
    pub price_per_min_order: Option<i64>,
    pub in_stock: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
