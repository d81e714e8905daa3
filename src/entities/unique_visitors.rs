use sea_orm::entity::prelude::*;

/// One row per distinct non-loopback client address.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "unique_visitors")]
pub struct Model {
    /// Exploded textual form of the address
    #[sea_orm(primary_key, auto_increment = false)]
    pub ip_address: String,

    pub count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
