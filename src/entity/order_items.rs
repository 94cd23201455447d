use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    /// Full product snapshot taken at checkout.
    pub product: Json,
    pub quantity: i32,
    pub item_price: i64,
    pub total_order_price: i64,
    pub orderer_code: String,
    pub order_date: Date,
    pub delivery_slot_id: String,
    pub delivery_slot_label: String,
    pub delivery_start_hour: i32,
    pub delivery_end_hour: i32,
    pub delivery_slot_key: String,
    pub staff_status_check: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
