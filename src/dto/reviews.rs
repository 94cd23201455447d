use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Review;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub delivery_slot_key: String,
    pub rating: i32,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<Review>)]
    pub items: Vec<Review>,
}
