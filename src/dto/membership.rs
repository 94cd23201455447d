use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ContainerStorageItem;

/// Staff edit of a customer's membership. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMembershipRequest {
    pub delivery_fee: Option<i64>,
    pub refill_tickets: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefillTicketResult {
    pub item: ContainerStorageItem,
    pub remaining_tickets: i32,
}
