//! Database access
//!
//! A single SQLite database holds the upload registry. The pool is
//! created once at startup and shared through `AppState`.

mod uploads;

pub use uploads::{UploadRecord, UploadRepository};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::Result;

/// Create the connection pool, creating the database file on first start.
pub async fn create_pool(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    Ok(pool)
}
