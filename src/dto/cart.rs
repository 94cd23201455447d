use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::cart::{CartLine, SlotSelection};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    /// Zero or less removes the line.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectSlotRequest {
    /// `None` clears the selection.
    pub slot_id: Option<String>,
    /// Defaults to today in the business time zone.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct CartCheckoutRequest {
    #[serde(default)]
    pub container_info: Option<super::orders::ContainerInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub selection: Option<SlotSelection>,
    pub total_price: i64,
    pub total_items: i64,
}
