use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::auth::Role;
use crate::config::DatabaseConfig;
use crate::store::{BrandDeletion, CatalogStore, Profile, ProfileStore, StoreError};

/// Postgres-backed profile store.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

/// Postgres-backed brand/post catalog.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

/// Connect a pool and run migrations; both stores share it.
pub async fn connect(config: &DatabaseConfig) -> Result<(PgProfileStore, PgCatalogStore), StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))?;

    Ok((
        PgProfileStore { pool: pool.clone() },
        PgCatalogStore { pool },
    ))
}

fn row_to_profile(row: sqlx::postgres::PgRow) -> Profile {
    let role: String = row.get("role");
    Profile {
        id: row.get("id"),
        email: row.get("email"),
        // Stored text outside the enumerated set reads as user
        role: Role::normalize(&role),
        push_token: row.get("push_token"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, role, push_token, created_by, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_profile))
    }

    async fn insert(&self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO profiles (id, email, role, push_token, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(&profile.push_token)
        .bind(&profile.created_by)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        sqlx::query("UPDATE profiles SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn push_tokens(&self) -> Result<Vec<String>, StoreError> {
        // Token-only projection; broadcast never needs the full documents
        let rows = sqlx::query(
            "SELECT push_token FROM profiles WHERE push_token IS NOT NULL AND push_token <> ''",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("push_token")).collect())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn post_count(&self, brand_id: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE brand_id = $1")
            .bind(brand_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("n"))
    }

    async fn apply_post_delta(
        &self,
        brand_id: &str,
        delta: i64,
        event_id: Uuid,
        create_if_missing: bool,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The ledger's primary key is the idempotency constraint: a
        // re-delivered event inserts zero rows and applies no delta.
        let marked = sqlx::query(
            "INSERT INTO brand_counter_events (event_id, brand_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .bind(brand_id)
        .execute(&mut *tx)
        .await?;

        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if create_if_missing {
            sqlx::query(
                "INSERT INTO brands (id, post_count) VALUES ($1, $2)
                 ON CONFLICT (id) DO UPDATE SET post_count = brands.post_count + $2",
            )
            .bind(brand_id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;
        } else {
            // Zero rows means the brand row is gone; the delta is dropped
            sqlx::query("UPDATE brands SET post_count = post_count + $2 WHERE id = $1")
                .bind(brand_id)
                .bind(delta)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn brand_post_count(&self, brand_id: &str) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT post_count FROM brands WHERE id = $1")
            .bind(brand_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("post_count")))
    }

    async fn delete_brand_if_empty(&self, brand_id: &str) -> Result<BrandDeletion, StoreError> {
        let mut tx = self.pool.begin().await?;

        let brand = sqlx::query("SELECT id FROM brands WHERE id = $1 FOR UPDATE")
            .bind(brand_id)
            .fetch_optional(&mut *tx)
            .await?;

        if brand.is_none() {
            tx.rollback().await?;
            return Ok(BrandDeletion::AlreadyAbsent);
        }

        // Re-count inside the transaction; the row lock above serializes
        // against a concurrent delete-if-empty on the same brand.
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE brand_id = $1")
            .bind(brand_id)
            .fetch_one(&mut *tx)
            .await?;
        let live: i64 = row.get("n");

        if live > 0 {
            tx.rollback().await?;
            return Ok(BrandDeletion::HasPosts);
        }

        sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(brand_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BrandDeletion::Deleted)
    }
}
