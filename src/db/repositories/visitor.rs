use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::entities::total_unique_visitors::{self, TOTAL_ROW_ID};
use crate::entities::{prelude::*, unique_visitors};

/// Whether a recorded address had been stored before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    First,
    Repeat,
}

pub struct VisitorRepository {
    conn: DatabaseConnection,
}

impl VisitorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stores one visit from `ip_address` (exploded form).
    ///
    /// A first sighting inserts the row and bumps the persisted total in the
    /// same transaction. The primary key on `ip_address` makes the insert the
    /// arbiter between concurrent first sightings: the loser sees zero rows
    /// affected and falls back to incrementing the existing row.
    pub async fn record(&self, ip_address: &str) -> Result<Sighting> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin visitor transaction")?;

        let inserted = UniqueVisitors::insert(unique_visitors::ActiveModel {
            ip_address: Set(ip_address.to_string()),
            count: Set(1),
        })
        .on_conflict(
            OnConflict::column(unique_visitors::Column::IpAddress)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .context("Failed to insert visitor")?;

        let sighting = if inserted > 0 {
            TotalUniqueVisitors::update_many()
                .col_expr(
                    total_unique_visitors::Column::Count,
                    Expr::col(total_unique_visitors::Column::Count).add(1),
                )
                .filter(total_unique_visitors::Column::Id.eq(TOTAL_ROW_ID))
                .exec(&txn)
                .await
                .context("Failed to increment visitor total")?;
            Sighting::First
        } else {
            UniqueVisitors::update_many()
                .col_expr(
                    unique_visitors::Column::Count,
                    Expr::col(unique_visitors::Column::Count).add(1),
                )
                .filter(unique_visitors::Column::IpAddress.eq(ip_address))
                .exec(&txn)
                .await
                .context("Failed to increment visitor count")?;
            Sighting::Repeat
        };

        txn.commit()
            .await
            .context("Failed to commit visitor transaction")?;

        debug!(ip = %ip_address, ?sighting, "Recorded visit");
        Ok(sighting)
    }

    pub async fn get(&self, ip_address: &str) -> Result<Option<unique_visitors::Model>> {
        UniqueVisitors::find_by_id(ip_address.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query visitor")
    }

    /// Persisted total; zero if the singleton row is missing.
    pub async fn total(&self) -> Result<u64> {
        let row = TotalUniqueVisitors::find_by_id(TOTAL_ROW_ID)
            .one(&self.conn)
            .await
            .context("Failed to query visitor total")?;

        Ok(row.map_or(0, |r| u64::try_from(r.count).unwrap_or(0)))
    }

    /// Number of distinct addresses stored.
    pub async fn count_distinct(&self) -> Result<u64> {
        UniqueVisitors::find()
            .count(&self.conn)
            .await
            .context("Failed to count visitors")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    #[tokio::test]
    async fn test_first_and_repeat_sightings() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = VisitorRepository::new(store.conn.clone());

        assert_eq!(repo.total().await.unwrap(), 0);

        assert_eq!(repo.record("10.0.0.1").await.unwrap(), Sighting::First);
        assert_eq!(repo.record("10.0.0.1").await.unwrap(), Sighting::Repeat);
        assert_eq!(repo.record("10.0.0.2").await.unwrap(), Sighting::First);

        assert_eq!(repo.get("10.0.0.1").await.unwrap().unwrap().count, 2);
        assert_eq!(repo.get("10.0.0.2").await.unwrap().unwrap().count, 1);
        assert!(repo.get("10.0.0.3").await.unwrap().is_none());

        assert_eq!(repo.total().await.unwrap(), 2);
        assert_eq!(repo.count_distinct().await.unwrap(), 2);
    }
}
