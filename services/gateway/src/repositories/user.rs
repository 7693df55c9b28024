//! PostgreSQL-backed user repository
//!
//! Each user is one row; the favorites list is a JSONB array inside that row
//! and is only ever changed by single-statement conditional updates.

use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{Favorite, NewUser, User};

const USER_COLUMNS: &str =
    "id, email, fullname, password_hash, profile_image_url, favorites, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(row.get("present"))
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DatabaseError> {
    let favorites: Json<Vec<Favorite>> = row
        .try_get("favorites")
        .map_err(|e| DatabaseError::Decode(e.to_string()))?;

    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        email: row.try_get("email").map_err(DatabaseError::Query)?,
        fullname: row.try_get("fullname").map_err(DatabaseError::Query)?,
        password_hash: row.try_get("password_hash").map_err(DatabaseError::Query)?,
        profile_image_url: row
            .try_get("profile_image_url")
            .map_err(DatabaseError::Query)?,
        favorites: favorites.0,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

fn favorites_from_row(row: &PgRow) -> Result<Vec<Favorite>, DatabaseError> {
    let favorites: Json<Vec<Favorite>> = row
        .try_get("favorites")
        .map_err(|e| DatabaseError::Decode(e.to_string()))?;
    Ok(favorites.0)
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        info!("Creating new user: {}", new_user.email);

        let sql = format!(
            r#"
            INSERT INTO users (id, email, fullname, password_hash, profile_image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.fullname)
            .bind(&new_user.password_hash)
            .bind(&new_user.profile_image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::DuplicateEmail
                }
                e => DatabaseError::Query(e).into(),
            })?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn favorites(&self, id: Uuid) -> StoreResult<Vec<Favorite>> {
        let row = sqlx::query("SELECT favorites FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?
            .ok_or(StoreError::NotFound)?;

        Ok(favorites_from_row(&row)?)
    }

    async fn add_favorite(&self, id: Uuid, favorite: Favorite) -> StoreResult<Vec<Favorite>> {
        // Row lock + re-evaluated WHERE make the presence check and the append one step.
        let row = sqlx::query(
            r#"
            UPDATE users
            SET favorites = favorites || jsonb_build_array(
                    jsonb_build_object('artistId', $2::text, 'addedAt', $3::text)
                ),
                updated_at = NOW()
            WHERE id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM jsonb_array_elements(favorites) AS f
                  WHERE f->>'artistId' = $2::text
              )
            RETURNING favorites
            "#,
        )
        .bind(id)
        .bind(&favorite.artist_id)
        .bind(favorite.added_at.to_rfc3339())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        match row {
            Some(row) => Ok(favorites_from_row(&row)?),
            None if self.exists(id).await? => Err(StoreError::DuplicateFavorite),
            None => Err(StoreError::NotFound),
        }
    }

    async fn remove_favorite(&self, id: Uuid, artist_id: &str) -> StoreResult<Vec<Favorite>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET favorites = COALESCE(
                    (
                        SELECT jsonb_agg(e.f ORDER BY e.ord)
                        FROM jsonb_array_elements(favorites) WITH ORDINALITY AS e(f, ord)
                        WHERE e.f->>'artistId' <> $2::text
                    ),
                    '[]'::jsonb
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING favorites
            "#,
        )
        .bind(id)
        .bind(artist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?
        .ok_or(StoreError::NotFound)?;

        Ok(favorites_from_row(&row)?)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(common::database::health_check(&self.pool).await?)
    }
}
