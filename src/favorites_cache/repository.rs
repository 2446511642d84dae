//! Favorites Repository
//!
//! SQLite persistence for the local favorites mirror.

use super::types::*;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Favorites Repository
#[derive(Clone)]
pub struct FavoritesRepository {
    pool: SqlitePool,
}

impl FavoritesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the favorites table if missing
    pub async fn init_schema(&self) -> crate::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                local_id   INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    INTEGER NOT NULL,
                camera_id  INTEGER NOT NULL,
                name       TEXT    NOT NULL,
                address    TEXT    NOT NULL,
                latitude   REAL    NOT NULL,
                longitude  REAL    NOT NULL,
                image      TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| crate::Error::Database(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_favorites_user_camera ON favorites (user_id, camera_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| crate::Error::Database(e.to_string()))?;

        debug!("Favorites schema ready");
        Ok(())
    }

    /// Insert a favorite and return its new local id
    pub async fn insert(&self, favorite: &NewFavorite) -> crate::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites
                (user_id, camera_id, name, address, latitude, longitude, image)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(favorite.user_id)
        .bind(favorite.camera_id)
        .bind(&favorite.name)
        .bind(&favorite.address)
        .bind(favorite.latitude)
        .bind(favorite.longitude)
        .bind(&favorite.image)
        .execute(&self.pool)
        .await
        .map_err(|e| crate::Error::Database(e.to_string()))?;

        let local_id = result.last_insert_rowid();
        debug!(
            local_id = local_id,
            user_id = favorite.user_id,
            camera_id = favorite.camera_id,
            "Inserted favorite"
        );
        Ok(local_id)
    }

    /// All favorites of a user, oldest first
    pub async fn list_by_user(&self, user_id: i64) -> crate::Result<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT local_id, user_id, camera_id, name, address, latitude, longitude, image
            FROM favorites
            WHERE user_id = ?
            ORDER BY local_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| crate::Error::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// First entry (lowest local id) for a user/camera pair
    pub async fn find_first(&self, user_id: i64, camera_id: i64) -> crate::Result<Option<Favorite>> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT local_id, user_id, camera_id, name, address, latitude, longitude, image
            FROM favorites
            WHERE user_id = ? AND camera_id = ?
            ORDER BY local_id ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(camera_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| crate::Error::Database(e.to_string()))?;

        Ok(row.map(|r| r.into()))
    }

    /// Delete one entry by local id. Returns whether a row was removed.
    pub async fn delete_by_local_id(&self, local_id: i64) -> crate::Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE local_id = ?")
            .bind(local_id)
            .execute(&self.pool)
            .await
            .map_err(|e| crate::Error::Database(e.to_string()))?;

        debug!(local_id = local_id, "Deleted favorite");
        Ok(result.rows_affected() > 0)
    }

    /// Remove every favorite of a user
    pub async fn clear_by_user(&self, user_id: i64) -> crate::Result<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| crate::Error::Database(e.to_string()))?;

        info!(user_id = user_id, removed = result.rows_affected(), "Cleared favorites");
        Ok(result.rows_affected())
    }

    /// Replace a user's favorites with the given set, atomically.
    ///
    /// Either the old set or the new set is visible, never a mix.
    pub async fn replace_for_user(
        &self,
        user_id: i64,
        favorites: &[NewFavorite],
    ) -> crate::Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| crate::Error::Database(e.to_string()))?;

        sqlx::query("DELETE FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| crate::Error::Database(e.to_string()))?;

        for favorite in favorites {
            sqlx::query(
                r#"
                INSERT INTO favorites
                    (user_id, camera_id, name, address, latitude, longitude, image)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(favorite.camera_id)
            .bind(&favorite.name)
            .bind(&favorite.address)
            .bind(favorite.latitude)
            .bind(favorite.longitude)
            .bind(&favorite.image)
            .execute(&mut *tx)
            .await
            .map_err(|e| crate::Error::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| crate::Error::Database(e.to_string()))?;

        info!(user_id = user_id, count = favorites.len(), "Replaced favorites");
        Ok(favorites.len())
    }
}
