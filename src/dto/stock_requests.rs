use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::StockRequest;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStockRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StockRequestList {
    #[schema(value_type = Vec<StockRequest>)]
    pub items: Vec<StockRequest>,
}
