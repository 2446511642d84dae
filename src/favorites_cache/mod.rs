//! Favorites Cache
//!
//! Local persistent mirror of each user's favorite cameras, stored in SQLite.
//!
//! ## Module layout
//! - `types`: favorite entity and row types
//! - `repository`: SQLite persistence (insert, list, delete, clear, replace)
//!
//! The cache is written only by the sync coordinator. Readers (favorites
//! listing, offline overlay seeding) see it through the repository.

pub mod repository;
pub mod types;

pub use repository::FavoritesRepository;
pub use types::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open (creating if needed) the favorites database.
///
/// A single connection keeps `sqlite::memory:` databases coherent across
/// callers and serializes writers.
pub async fn connect(database_url: &str) -> crate::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| crate::Error::Config(format!("Invalid DATABASE_URL: {}", e)))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| crate::Error::Database(e.to_string()))
}
