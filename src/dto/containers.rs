use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::ledger::StaffTodoSummary,
    dto::orders::ContainerInfo,
    error::{AppError, AppResult},
    models::ContainerStorageItem,
    services::order_service::MAX_CONTAINER_COUNT,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ContainerBalance {
    pub orderer_code: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffTodoData {
    pub container_items: Vec<ContainerStorageItem>,
    pub due_today: Vec<ContainerStorageItem>,
    pub overdue: Vec<ContainerStorageItem>,
    pub summary: StaffTodoSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationResult {
    pub item: ContainerStorageItem,
    pub outgoing_container_id: Option<Uuid>,
}

/// A container pickup without an order, booked into a delivery slot like one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContainerRequest {
    pub delivery_date: NaiveDate,
    pub delivery_slot_id: String,
    pub container_count: i32,
    #[serde(default)]
    pub needs_washing: bool,
}

impl ContainerRequest {
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=MAX_CONTAINER_COUNT).contains(&self.container_count) {
            return Err(AppError::BadRequest(format!(
                "container_count must be between 1 and {MAX_CONTAINER_COUNT}"
            )));
        }
        Ok(())
    }

    pub fn container_info(&self) -> ContainerInfo {
        ContainerInfo {
            container_count: self.container_count,
            needs_washing: self.needs_washing,
        }
    }
}
