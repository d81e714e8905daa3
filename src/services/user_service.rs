//! Domain service for user accounts and credential verification.

use thiserror::Error;

use crate::models::{NewUser, PasswordChange, User, UserPatch};

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i32),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Failed to change user password")]
    PasswordChangeRejected,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user, hashing the supplied password.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::UsernameTaken`] if the username is in use.
    async fn register(&self, user: NewUser) -> Result<User, UserError>;

    async fn get(&self, id: i32) -> Result<User, UserError>;

    async fn list(&self) -> Result<Vec<User>, UserError>;

    /// Replaces every field of an existing user, password included.
    async fn replace(&self, id: i32, user: NewUser) -> Result<User, UserError>;

    /// Applies only the supplied fields; a supplied password is re-hashed.
    async fn update(&self, id: i32, changes: UserPatch) -> Result<User, UserError>;

    /// Sets a new password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::PasswordChangeRejected`] for an unknown user or a
    /// wrong current password.
    async fn change_password(&self, id: i32, change: PasswordChange) -> Result<(), UserError>;

    async fn delete(&self, id: i32) -> Result<(), UserError>;

    /// Checks a username/password pair. Unknown users and wrong passwords
    /// both yield `false`.
    async fn verify(&self, username: &str, password: &str) -> Result<bool, UserError>;
}
