use crate::models::{Holiday, HolidayFilters, HolidayPatch, NewHoliday, User};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::unique_visitors::Model as UniqueVisitor;
pub use repositories::user::UserChanges;
pub use repositories::visitor::Sighting;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        // Every pooled connection to an in-memory database would see its own
        // empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn holiday_repo(&self) -> repositories::holiday::HolidayRepository {
        repositories::holiday::HolidayRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn visitor_repo(&self) -> repositories::visitor::VisitorRepository {
        repositories::visitor::VisitorRepository::new(self.conn.clone())
    }

    // Holidays

    pub async fn create_holiday(&self, holiday: NewHoliday) -> Result<Holiday> {
        self.holiday_repo().create(holiday).await
    }

    pub async fn get_holiday(&self, id: i32) -> Result<Option<Holiday>> {
        self.holiday_repo().get(id).await
    }

    pub async fn list_holidays(&self, filters: &HolidayFilters) -> Result<Vec<Holiday>> {
        self.holiday_repo().list(filters).await
    }

    pub async fn update_holiday(&self, id: i32, changes: HolidayPatch) -> Result<Option<Holiday>> {
        self.holiday_repo().update(id, changes).await
    }

    pub async fn delete_holiday(&self, id: i32) -> Result<bool> {
        self.holiday_repo().delete(id).await
    }

    // Users

    pub async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User> {
        self.user_repo()
            .create(first_name, last_name, username, password_hash)
            .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn username_taken(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.user_repo().username_taken(username, exclude_id).await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        self.user_repo().update(id, changes).await
    }

    pub async fn get_user_password_hash(&self, id: i32) -> Result<Option<String>> {
        self.user_repo().get_password_hash(id).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn verify_user_credentials(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo()
            .verify_credentials(username, password)
            .await
    }

    // Visitors

    pub async fn record_visit(&self, ip_address: &str) -> Result<Sighting> {
        self.visitor_repo().record(ip_address).await
    }

    pub async fn get_visitor(&self, ip_address: &str) -> Result<Option<UniqueVisitor>> {
        self.visitor_repo().get(ip_address).await
    }

    pub async fn total_unique_visitors(&self) -> Result<u64> {
        self.visitor_repo().total().await
    }

    pub async fn count_unique_visitors(&self) -> Result<u64> {
        self.visitor_repo().count_distinct().await
    }
}
