//! `SeaORM` implementation of the `HolidayService` trait.

use crate::db::Store;
use crate::models::{Holiday, HolidayFilters, HolidayPatch, NewHoliday};
use crate::services::holiday_service::{HolidayError, HolidayService};
use async_trait::async_trait;

pub struct SeaOrmHolidayService {
    store: Store,
}

impl SeaOrmHolidayService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HolidayService for SeaOrmHolidayService {
    async fn create(&self, holiday: NewHoliday) -> Result<Holiday, HolidayError> {
        Ok(self.store.create_holiday(holiday).await?)
    }

    async fn get(&self, id: i32) -> Result<Holiday, HolidayError> {
        self.store
            .get_holiday(id)
            .await?
            .ok_or(HolidayError::NotFound(id))
    }

    async fn list(&self, filters: &HolidayFilters) -> Result<Vec<Holiday>, HolidayError> {
        if filters.day.is_some() && filters.month.is_none() {
            return Err(HolidayError::Validation(
                "day filter requires month".to_string(),
            ));
        }

        Ok(self.store.list_holidays(filters).await?)
    }

    async fn replace(&self, id: i32, holiday: NewHoliday) -> Result<Holiday, HolidayError> {
        self.update(id, holiday.into()).await
    }

    async fn update(&self, id: i32, changes: HolidayPatch) -> Result<Holiday, HolidayError> {
        self.store
            .update_holiday(id, changes)
            .await?
            .ok_or(HolidayError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> Result<(), HolidayError> {
        if self.store.delete_holiday(id).await? {
            Ok(())
        } else {
            Err(HolidayError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn service() -> SeaOrmHolidayService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        SeaOrmHolidayService::new(store)
    }

    fn christmas() -> NewHoliday {
        NewHoliday {
            name: "Christmas Day".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 12, 25).unwrap(),
            public: true,
            country: "PL".to_string(),
        }
    }

    #[tokio::test]
    async fn test_replace_missing_does_not_create() {
        let service = service().await;

        let result = service.replace(42, christmas()).await;
        assert!(matches!(result, Err(HolidayError::NotFound(42))));

        let all = service
            .list(&HolidayFilters {
                country: "PL".to_string(),
                year: 2020,
                month: None,
                day: None,
                public: None,
            })
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_day_without_month_is_rejected() {
        let service = service().await;

        let result = service
            .list(&HolidayFilters {
                country: "PL".to_string(),
                year: 2020,
                month: None,
                day: Some(25),
                public: None,
            })
            .await;
        assert!(matches!(result, Err(HolidayError::Validation(_))));
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let service = service().await;

        let created = service.create(christmas()).await.unwrap();
        assert!(service.delete(created.id).await.is_ok());
        assert!(matches!(
            service.delete(created.id).await,
            Err(HolidayError::NotFound(_))
        ));
        assert!(matches!(
            service.get(created.id).await,
            Err(HolidayError::NotFound(_))
        ));
    }
}
