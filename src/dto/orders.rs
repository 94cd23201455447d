use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::orders::{OrderGroup, OrderLine},
    models::{OrderItem, StaffStatusCheck, UserRole},
};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct ContainerInfo {
    pub container_count: i32,
    pub needs_washing: bool,
}

/// Prices are never part of the request; the server looks them up.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLine>,
    pub delivery_date: NaiveDate,
    pub delivery_slot_id: String,
    pub container_info: Option<ContainerInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub delivery_slot_key: String,
    pub total_price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub orders: Vec<OrderItem>,
    pub user_role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderGroupList {
    pub groups: Vec<OrderGroup>,
    pub user_role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelOrderResponse {
    pub delivery_slot_key: String,
    pub deleted_count: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub staff_status_check: StaffStatusCheck,
}
