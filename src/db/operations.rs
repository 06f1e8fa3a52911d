use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::db::models::{Cat, CatChanges, NewCat, NewIdentity, UserIdentity};
use crate::db::store::{CatStore, CredentialStore, StoreResult};
use crate::error::{AppError, StoreError};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, refresh_token_hash, created_at, updated_at";
const CAT_COLUMNS: &str = "id, name, age, breed, added_by, created_at, updated_at";

/// Postgres-backed implementation of the store traits.
#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CredentialStore for DbOperations {
    async fn create_identity(&self, new: NewIdentity) -> StoreResult<UserIdentity> {
        let user = UserIdentity::new(new);
        let query = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
            cols = USER_COLUMNS
        );

        let created = sqlx::query_as::<_, UserIdentity>(&query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(&user.refresh_token_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserIdentity>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserIdentity>(&query)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserIdentity>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserIdentity>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<&str>) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn compare_and_set_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        new: Option<&str>,
    ) -> StoreResult<bool> {
        // Single conditional UPDATE; Postgres row locking serialises racing writers.
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $3, updated_at = $4 \
             WHERE id = $1 AND refresh_token_hash = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(new)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl CatStore for DbOperations {
    async fn create_cat(&self, new: NewCat, owner: Uuid) -> StoreResult<Cat> {
        let cat = Cat::new(new, owner);
        let query = format!(
            "INSERT INTO cats ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
            cols = CAT_COLUMNS
        );

        let created = sqlx::query_as::<_, Cat>(&query)
            .bind(cat.id)
            .bind(&cat.name)
            .bind(cat.age)
            .bind(&cat.breed)
            .bind(cat.added_by)
            .bind(cat.created_at)
            .bind(cat.updated_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(created)
    }

    async fn list_cats(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Cat>, i64)> {
        let mut transaction = self.pool.begin().await?;

        let query = format!(
            "SELECT {} FROM cats ORDER BY created_at, id OFFSET $1 LIMIT $2",
            CAT_COLUMNS
        );
        let cats = sqlx::query_as::<_, Cat>(&query)
            .bind(offset)
            .bind(limit)
            .fetch_all(&mut *transaction)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cats")
            .fetch_one(&mut *transaction)
            .await?;

        transaction.commit().await?;
        Ok((cats, total))
    }

    async fn find_cat(&self, id: Uuid) -> StoreResult<Option<Cat>> {
        let query = format!("SELECT {} FROM cats WHERE id = $1", CAT_COLUMNS);
        let cat = sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(cat)
    }

    async fn update_owned_cat(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: CatChanges,
    ) -> StoreResult<Option<Cat>> {
        let query = format!(
            "UPDATE cats SET name = COALESCE($3, name), age = COALESCE($4, age), \
             breed = COALESCE($5, breed), updated_at = $6 \
             WHERE id = $1 AND added_by = $2 RETURNING {}",
            CAT_COLUMNS
        );

        let cat = sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .bind(owner)
            .bind(changes.name)
            .bind(changes.age)
            .bind(changes.breed)
            .bind(Utc::now())
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(cat)
    }

    async fn delete_owned_cat(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cats WHERE id = $1 AND added_by = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
