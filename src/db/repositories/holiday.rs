use crate::entities::{holidays, prelude::*};
use crate::models::{Holiday, HolidayFilters, HolidayPatch, NewHoliday};
use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

/// Repository for holiday records
pub struct HolidayRepository {
    conn: DatabaseConnection,
}

impl HolidayRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, holiday: NewHoliday) -> Result<Holiday> {
        let active_model = holidays::ActiveModel {
            name: Set(holiday.name),
            date: Set(holiday.date),
            public: Set(holiday.public),
            country: Set(holiday.country),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert holiday")?;

        info!("Created holiday {} ({} {})", model.id, model.country, model.date);
        Ok(model.into())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Holiday>> {
        let model = Holidays::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query holiday by ID")?;

        Ok(model.map(Holiday::from))
    }

    pub async fn list(&self, filters: &HolidayFilters) -> Result<Vec<Holiday>> {
        let rows = Holidays::find()
            .filter(filter_condition(filters))
            .order_by_asc(holidays::Column::Date)
            .order_by_asc(holidays::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query holidays")?;

        Ok(rows.into_iter().map(Holiday::from).collect())
    }

    /// Applies the supplied fields to an existing holiday.
    ///
    /// Returns `None` when no holiday has this id; never inserts.
    pub async fn update(&self, id: i32, changes: HolidayPatch) -> Result<Option<Holiday>> {
        let Some(existing) = Holidays::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query holiday for update")?
        else {
            return Ok(None);
        };

        let mut active: holidays::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(date) = changes.date {
            active.date = Set(date);
        }
        if let Some(public) = changes.public {
            active.public = Set(public);
        }
        if let Some(country) = changes.country {
            active.country = Set(country);
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update holiday")?;

        Ok(Some(model.into()))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Holidays::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete holiday")?;

        if result.rows_affected > 0 {
            info!("Deleted holiday {}", id);
        }

        Ok(result.rows_affected > 0)
    }
}

// ============================================================================
// Filter predicates
// ============================================================================

/// Builds the `WHERE` clause for a holiday query: one predicate per supplied
/// filter, all of which must hold.
#[must_use]
pub fn filter_condition(filters: &HolidayFilters) -> Condition {
    let mut condition = Condition::all()
        .add(country_is(&filters.country))
        .add(year_is(filters.year));

    if let Some(month) = filters.month {
        condition = condition.add(month_is(month));
    }
    if let Some(day) = filters.day {
        condition = condition.add(day_is(day));
    }
    if let Some(public) = filters.public {
        condition = condition.add(public_is(public));
    }

    condition
}

fn country_is(country: &str) -> SimpleExpr {
    holidays::Column::Country.eq(country)
}

fn public_is(public: bool) -> SimpleExpr {
    holidays::Column::Public.eq(public)
}

fn year_is(year: i32) -> SimpleExpr {
    date_part_is("%Y", year)
}

fn month_is(month: i32) -> SimpleExpr {
    date_part_is("%m", month)
}

fn day_is(day: i32) -> SimpleExpr {
    date_part_is("%d", day)
}

/// Dates are stored as `YYYY-MM-DD` text, so the component is pulled out
/// with `strftime` and compared as an integer.
fn date_part_is(format: &str, value: i32) -> SimpleExpr {
    Expr::cust_with_values(
        format!("CAST(strftime('{format}', \"holidays\".\"date\") AS INTEGER) = ?"),
        [value],
    )
}
