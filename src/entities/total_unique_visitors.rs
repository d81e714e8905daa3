use sea_orm::entity::prelude::*;

/// Primary key of the single row in this table.
pub const TOTAL_ROW_ID: i32 = 1;

/// Singleton row holding the number of `unique_visitors` rows.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "total_unique_visitors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
