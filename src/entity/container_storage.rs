use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "container_storage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub orderer_code: String,
    pub order_date: Date,
    pub delivery_slot_id: String,
    pub delivery_slot_label: String,
    pub delivery_start_hour: i32,
    pub delivery_end_hour: i32,
    pub delivery_slot_key: String,
    pub requested_container_count: i32,
    pub needs_washing: bool,
    pub actual_container_count: Option<i32>,
    pub is_incoming: bool,
    pub outgoing_container_id: Option<Uuid>,
    pub outgoing_container_count: Option<i32>,
    pub staff_comment: Option<String>,
    pub source: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
