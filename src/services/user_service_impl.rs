//! `SeaORM` implementation of the `UserService` trait.

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password, verify_password_hash};
use crate::db::{Store, UserChanges};
use crate::models::{NewUser, PasswordChange, User, UserPatch};
use crate::services::user_service::{UserError, UserService};
use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use tokio::task;
use tracing::debug;

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn hash(&self, password: String) -> Result<String, UserError> {
        let security = self.security.clone();
        let hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;
        Ok(hash)
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), UserError> {
        if self.store.username_taken(username, exclude_id).await? {
            return Err(UserError::UsernameTaken(username.to_string()));
        }
        Ok(())
    }
}

/// The availability check and the write are separate statements, so a
/// concurrent writer can still trip the unique index.
fn map_write_error(err: anyhow::Error, username: Option<&str>) -> UserError {
    let unique_violation = err
        .downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)));

    match username {
        Some(username) if unique_violation => UserError::UsernameTaken(username.to_string()),
        _ => err.into(),
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, user: NewUser) -> Result<User, UserError> {
        self.ensure_username_free(&user.username, None).await?;

        let password_hash = self.hash(user.password).await?;

        self.store
            .create_user(
                &user.first_name,
                &user.last_name,
                &user.username,
                &password_hash,
            )
            .await
            .map_err(|e| map_write_error(e, Some(&user.username)))
    }

    async fn get(&self, id: i32) -> Result<User, UserError> {
        self.store.get_user(id).await?.ok_or(UserError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.list_users().await?)
    }

    async fn replace(&self, id: i32, user: NewUser) -> Result<User, UserError> {
        self.update(id, user.into()).await
    }

    async fn update(&self, id: i32, changes: UserPatch) -> Result<User, UserError> {
        if self.store.get_user(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        if let Some(username) = &changes.username {
            self.ensure_username_free(username, Some(id)).await?;
        }

        let password_hash = match changes.password {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        let username = changes.username.clone();
        self.store
            .update_user(
                id,
                UserChanges {
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    username: changes.username,
                    password_hash,
                },
            )
            .await
            .map_err(|e| map_write_error(e, username.as_deref()))?
            .ok_or(UserError::NotFound(id))
    }

    async fn change_password(&self, id: i32, change: PasswordChange) -> Result<(), UserError> {
        let Some(current_hash) = self.store.get_user_password_hash(id).await? else {
            return Err(UserError::PasswordChangeRejected);
        };

        if !verify_password_hash(&change.current_password, current_hash).await? {
            debug!(user_id = id, "Password change rejected: wrong current password");
            return Err(UserError::PasswordChangeRejected);
        }

        let new_hash = self.hash(change.new_password).await?;

        self.store
            .update_user(
                id,
                UserChanges {
                    password_hash: Some(new_hash),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(UserError::PasswordChangeRejected)?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), UserError> {
        if self.store.delete_user(id).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }

    async fn verify(&self, username: &str, password: &str) -> Result<bool, UserError> {
        Ok(self.store.verify_user_credentials(username, password).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmUserService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        SeaOrmUserService::new(
            store,
            SecurityConfig {
                argon2_memory_cost_kib: 1024,
                argon2_time_cost: 1,
                argon2_parallelism: 1,
            },
        )
    }

    fn jan() -> NewUser {
        NewUser {
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            username: "jan".to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let service = service().await;

        service.register(jan()).await.unwrap();
        let result = service.register(jan()).await;
        assert!(matches!(result, Err(UserError::UsernameTaken(name)) if name == "jan"));
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let service = service().await;
        let user = service.register(jan()).await.unwrap();

        let wrong = service
            .change_password(
                user.id,
                PasswordChange {
                    current_password: "nope".to_string(),
                    new_password: "secret456".to_string(),
                },
            )
            .await;
        assert!(matches!(wrong, Err(UserError::PasswordChangeRejected)));

        service
            .change_password(
                user.id,
                PasswordChange {
                    current_password: "secret123".to_string(),
                    new_password: "secret456".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(!service.verify("jan", "secret123").await.unwrap());
        assert!(service.verify("jan", "secret456").await.unwrap());

        let unknown = service
            .change_password(
                999,
                PasswordChange {
                    current_password: "secret456".to_string(),
                    new_password: "x".to_string(),
                },
            )
            .await;
        assert!(matches!(unknown, Err(UserError::PasswordChangeRejected)));
    }

    #[tokio::test]
    async fn test_patch_keeps_unsupplied_fields() {
        let service = service().await;
        let user = service.register(jan()).await.unwrap();

        let updated = service
            .update(
                user.id,
                UserPatch {
                    first_name: Some("Janek".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Janek");
        assert_eq!(updated.username, "jan");
        assert!(service.verify("jan", "secret123").await.unwrap());

        assert!(matches!(
            service.update(999, UserPatch::default()).await,
            Err(UserError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_update_to_taken_username_conflicts() {
        let service = service().await;
        service.register(jan()).await.unwrap();
        let anna = service
            .register(NewUser {
                username: "anna".to_string(),
                ..jan()
            })
            .await
            .unwrap();

        let result = service
            .update(
                anna.id,
                UserPatch {
                    username: Some("jan".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::UsernameTaken(_))));

        // keeping one's own username is fine
        let result = service
            .update(
                anna.id,
                UserPatch {
                    username: Some("anna".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }
}
