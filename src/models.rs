use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Staff => "staff",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "customer" => Ok(UserRole::Customer),
            "staff" => Ok(UserRole::Staff),
            other => Err(AppError::Internal(anyhow::anyhow!("unknown role {other:?}"))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatusCheck {
    Pending,
    Fulfilled,
    Cancelled,
}

impl StaffStatusCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatusCheck::Pending => "pending",
            StaffStatusCheck::Fulfilled => "fulfilled",
            StaffStatusCheck::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(StaffStatusCheck::Pending),
            "fulfilled" => Ok(StaffStatusCheck::Fulfilled),
            "cancelled" => Ok(StaffStatusCheck::Cancelled),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown staff status {other:?}"
            ))),
        }
    }
}

/// What filed a container request row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    #[default]
    Order,
    RefillTicket,
    NewCustomerCall,
}

impl RequestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSource::Order => "order",
            RequestSource::RefillTicket => "refill_ticket",
            RequestSource::NewCustomerCall => "new_customer_call",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "order" => Ok(RequestSource::Order),
            "refill_ticket" => Ok(RequestSource::RefillTicket),
            "new_customer_call" => Ok(RequestSource::NewCustomerCall),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown request source {other:?}"
            ))),
        }
    }
}

/// Which booking day a set of open-hour overrides applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    Today,
    Tomorrow,
}

impl DateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateType::Today => "today",
            DateType::Tomorrow => "tomorrow",
        }
    }

    /// Calendar date this date type points at, given today's business date.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateType::Today => today,
            DateType::Tomorrow => today.succ_opt().unwrap_or(today),
        }
    }

    /// Inverse of [`DateType::resolve`]; `None` when the date is neither today nor tomorrow.
    pub fn from_date(date: NaiveDate, today: NaiveDate) -> Option<Self> {
        [DateType::Today, DateType::Tomorrow]
            .into_iter()
            .find(|dt| dt.resolve(today) == date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TodoKind {
    PreArrival,
    PostArrival,
}

impl TodoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoKind::PreArrival => "pre_arrival",
            TodoKind::PostArrival => "post_arrival",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pre_arrival" => Ok(TodoKind::PreArrival),
            "post_arrival" => Ok(TodoKind::PostArrival),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown todo kind {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub orderer_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Category-prefixed product code; ascending order clusters a category together.
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
    pub in_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One bookable delivery window of a day's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    pub id: String,
    pub label: String,
    pub start_hour: u32,
    pub end_hour: u32,
    pub is_enabled: bool,
    pub comment: String,
    pub reservation_count: i64,
}

/// The part of a [`TimeSlot`] frozen onto orders and ledger rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeliverySlot {
    pub id: String,
    pub label: String,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl From<&TimeSlot> for DeliverySlot {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            id: slot.id.clone(),
            label: slot.label.clone(),
            start_hour: slot.start_hour,
            end_hour: slot.end_hour,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product: Product,
    pub quantity: i32,
    pub item_price: i64,
    pub total_order_price: i64,
    pub orderer_code: String,
    pub order_date: NaiveDate,
    pub delivery_time_slot: DeliverySlot,
    pub delivery_slot_key: String,
    pub staff_status_check: StaffStatusCheck,
    pub created_at: DateTime<Utc>,
}

/// One event of the reusable-container ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContainerStorageItem {
    pub id: Uuid,
    pub orderer_code: String,
    pub order_date: NaiveDate,
    pub delivery_time_slot: DeliverySlot,
    pub delivery_slot_key: String,
    pub requested_container_count: i32,
    pub needs_washing: bool,
    pub actual_container_count: Option<i32>,
    pub is_incoming: bool,
    pub outgoing_container_id: Option<Uuid>,
    pub outgoing_container_count: Option<i32>,
    pub staff_comment: Option<String>,
    pub source: RequestSource,
    pub created_at: DateTime<Utc>,
}

/// Per-customer delivery fee and prepaid refill tickets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Membership {
    pub orderer_code: String,
    pub delivery_fee: i64,
    pub refill_tickets: i32,
}

/// A customer's request to start stocking a product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockRequest {
    pub id: Uuid,
    pub orderer_code: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub orderer_code: String,
    pub delivery_slot_key: String,
    pub order_date: NaiveDate,
    pub delivery_time_slot_label: String,
    pub rating: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoItem {
    pub id: Uuid,
    pub kind: TodoKind,
    pub content: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
