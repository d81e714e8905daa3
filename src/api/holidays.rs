use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{validate_holiday_filters, validate_holiday_patch, validate_new_holiday};
use super::{ApiError, AppState};
use crate::models::{Holiday, HolidayFilters, HolidayPatch, NewHoliday};
use crate::services::HolidayError;

impl From<HolidayError> for ApiError {
    fn from(err: HolidayError) -> Self {
        match err {
            HolidayError::NotFound(id) => Self::not_found("Holiday", id),
            HolidayError::Validation(msg) => Self::validation(msg),
            HolidayError::Database(msg) => Self::DatabaseError(msg),
            HolidayError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// `POST /holidays`
pub async fn create_holiday(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewHoliday>, JsonRejection>,
) -> Result<(StatusCode, Json<Holiday>), ApiError> {
    let Json(holiday) = payload?;
    validate_new_holiday(&holiday)?;

    let created = state.holidays.create(holiday).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /holidays/{id}`
pub async fn get_holiday(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Holiday>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.holidays.get(id).await?))
}

/// `GET /holidays?country=&year=&month=&day=&public=`
pub async fn list_holidays(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HolidayFilters>, QueryRejection>,
) -> Result<Json<Vec<Holiday>>, ApiError> {
    let Query(filters) = query?;
    validate_holiday_filters(&filters)?;

    Ok(Json(state.holidays.list(&filters).await?))
}

/// `PUT /holidays/{id}`
pub async fn replace_holiday(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<NewHoliday>, JsonRejection>,
) -> Result<Json<Holiday>, ApiError> {
    let Path(id) = id?;
    let Json(holiday) = payload?;
    validate_new_holiday(&holiday)?;

    Ok(Json(state.holidays.replace(id, holiday).await?))
}

/// `PATCH /holidays/{id}`
pub async fn update_holiday(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<HolidayPatch>, JsonRejection>,
) -> Result<Json<Holiday>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    validate_holiday_patch(&patch)?;

    Ok(Json(state.holidays.update(id, patch).await?))
}

/// `DELETE /holidays/{id}`
pub async fn delete_holiday(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.holidays.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
