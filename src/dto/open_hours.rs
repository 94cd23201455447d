use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::time_slots::SlotUpdate,
    models::{DateType, TimeSlot},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenHoursQuery {
    pub date_type: Option<DateType>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveOpenHoursRequest {
    pub date_type: DateType,
    pub slots: Vec<SlotUpdate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSlotCatalog {
    pub date_type: DateType,
    pub date: NaiveDate,
    pub is_closed: bool,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveOpenHoursResponse {
    pub date_type: DateType,
    pub saved: usize,
    pub ignored: usize,
}
