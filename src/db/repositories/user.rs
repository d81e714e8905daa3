use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::models::User;

/// Fields written by a create or update; the password is already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User> {
        let active_model = users::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        info!("Created user {} ({})", model.id, model.username);
        Ok(model.into())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Whether `username` belongs to a user other than `exclude_id`.
    pub async fn username_taken(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(existing.is_some())
    }

    /// Applies the supplied fields to an existing user. Returns `None` when
    /// the user does not exist.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(model.into()))
    }

    pub async fn get_password_hash(&self, id: i32) -> Result<Option<String>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password hash")?;

        Ok(user.map(|u| u.password_hash))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        if result.rows_affected > 0 {
            info!("Deleted user {}", id);
        }

        Ok(result.rows_affected > 0)
    }

    /// Verify the credentials of a Basic auth request.
    ///
    /// The stored username is compared in constant time after lookup, and the
    /// password check runs on the blocking pool since Argon2 is CPU-bound.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        if !constant_time_eq(user.username.as_bytes(), username.as_bytes()) {
            return Ok(false);
        }

        verify_password_hash(password, user.password_hash).await
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, the argon2 crate defaults are used.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check `password` against a stored PHC hash string on the blocking pool.
pub async fn verify_password_hash(password: &str, password_hash: String) -> Result<bool> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        // Params are read back from the PHC string
        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Byte comparison whose running time depends only on the input lengths.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    fn fast_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"admin", b"admin"));
        assert!(!constant_time_eq(b"admin", b"admiN"));
        assert!(!constant_time_eq(b"admin", b"admin2"));
        assert!(constant_time_eq(b"", b""));
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("hunter2", Some(&fast_params())).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_hash("hunter2", hash.clone()).await.unwrap());
        assert!(!verify_password_hash("hunter3", hash).await.unwrap());
    }

    #[test]
    fn test_each_hash_gets_a_fresh_salt() {
        let first = hash_password("hunter2", Some(&fast_params())).unwrap();
        let second = hash_password("hunter2", Some(&fast_params())).unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = UserRepository::new(store.conn.clone());

        let hash = hash_password("secret", Some(&fast_params())).unwrap();
        repo.create("Jan", "Kowalski", "jan", &hash).await.unwrap();

        assert!(repo.verify_credentials("jan", "secret").await.unwrap());
        assert!(!repo.verify_credentials("jan", "wrong").await.unwrap());
        assert!(!repo.verify_credentials("nobody", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_username_taken_excludes_self() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = UserRepository::new(store.conn.clone());

        let user = repo.create("Jan", "Kowalski", "jan", "x").await.unwrap();

        assert!(repo.username_taken("jan", None).await.unwrap());
        assert!(!repo.username_taken("jan", Some(user.id)).await.unwrap());
        assert!(!repo.username_taken("anna", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = UserRepository::new(store.conn.clone());

        let user = repo.create("Jan", "Kowalski", "jan", "x").await.unwrap();

        let updated = repo
            .update(
                user.id,
                UserChanges {
                    last_name: Some("Nowak".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.last_name, "Nowak");
        assert_eq!(updated.first_name, "Jan");

        assert!(repo.update(999, UserChanges::default()).await.unwrap().is_none());

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }
}
