//! Domain service for holiday records.

use thiserror::Error;

use crate::models::{Holiday, HolidayFilters, HolidayPatch, NewHoliday};

/// Errors specific to holiday operations.
#[derive(Debug, Error)]
pub enum HolidayError {
    #[error("Holiday not found: {0}")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for HolidayError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for HolidayError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for holidays.
#[async_trait::async_trait]
pub trait HolidayService: Send + Sync {
    async fn create(&self, holiday: NewHoliday) -> Result<Holiday, HolidayError>;

    /// # Errors
    ///
    /// Returns [`HolidayError::NotFound`] if no holiday has this id.
    async fn get(&self, id: i32) -> Result<Holiday, HolidayError>;

    /// Lists holidays matching every supplied filter, ordered by date.
    async fn list(&self, filters: &HolidayFilters) -> Result<Vec<Holiday>, HolidayError>;

    /// Replaces every field of an existing holiday.
    async fn replace(&self, id: i32, holiday: NewHoliday) -> Result<Holiday, HolidayError>;

    /// Applies only the supplied fields.
    async fn update(&self, id: i32, changes: HolidayPatch) -> Result<Holiday, HolidayError>;

    /// # Errors
    ///
    /// Returns [`HolidayError::NotFound`] if the row did not exist, including
    /// on a repeated delete.
    async fn delete(&self, id: i32) -> Result<(), HolidayError>;
}
