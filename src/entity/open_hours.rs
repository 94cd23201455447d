use sea_orm::entity::prelude::*;

/// Staff override of one template slot for a date type ("today" / "tomorrow").
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "open_hours")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_type: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub slot_id: String,
    pub is_enabled: bool,
    pub comment: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
