use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{validate_new_user, validate_password, validate_user_patch};
use super::{ApiError, AppState};
use crate::models::{NewUser, PasswordChange, User, UserPatch};
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => Self::not_found("User", id),
            UserError::UsernameTaken(username) => {
                Self::Conflict(format!("Username '{}' is already taken", username))
            }
            UserError::PasswordChangeRejected => {
                Self::BadRequest("Failed to change user password".to_string())
            }
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// `POST /users` (open registration)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(user) = payload?;
    validate_new_user(&user)?;

    let created = state.users.register(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /users`
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.users.get(id).await?))
}

/// `PUT /users/{id}`
pub async fn replace_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id?;
    let Json(user) = payload?;
    validate_new_user(&user)?;

    Ok(Json(state.users.replace(id, user).await?))
}

/// `PATCH /users/{id}`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    validate_user_patch(&patch)?;

    Ok(Json(state.users.update(id, patch).await?))
}

/// `PATCH /users/{id}/password`
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(change) = payload?;
    validate_password(&change.new_password)?;

    state.users.change_password(id, change).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
