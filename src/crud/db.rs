use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct DB {
    pub(super) pool: SqlitePool,
}

impl DB {
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&db_path.to_string_lossy())?
            .create_if_missing(true);

        Self::connect(options, 5)
            .await
            .with_context(|| format!("Failed to open database at {}", db_path.display()))
    }

    /// Every connection to `sqlite::memory:` is its own database, so the
    /// pool is capped at one.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options, 1).await
    }

    async fn connect(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_missing_database_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("generations.db");

        DB::new(&db_path).await.unwrap();
        assert!(db_path.exists());

        // migrations are idempotent across reopen
        DB::new(&db_path).await.unwrap();
    }
}
