//! Upload registry persistence
//!
//! One table of (filename, upload time, client host, SHA-256) tuples.
//! `file_hash` is deliberately not unique at the schema level: the upload
//! handler skips duplicates itself, and deletion removes every row that
//! carries a hash.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::Result;

/// A registered upload
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UploadRecord {
    pub id: i64,
    pub filename: String,
    pub upload_time: String,
    pub hostname: String,
    pub file_hash: String,
}

/// Repository for upload records
pub struct UploadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UploadRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the uploads table
    ///
    /// Safe to run on every start; never touches existing rows.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS uploads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                upload_time TEXT NOT NULL,
                hostname TEXT NOT NULL,
                file_hash TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_uploads_file_hash ON uploads(file_hash);
            CREATE INDEX IF NOT EXISTS idx_uploads_upload_time ON uploads(upload_time);
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Check whether any record carries this hash
    pub async fn exists(&self, file_hash: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM uploads WHERE file_hash = ?")
            .bind(file_hash)
            .fetch_one(self.pool)
            .await?;

        Ok(row.0 > 0)
    }

    /// Append a new record, returning its id
    ///
    /// Always inserts; the caller decides whether a duplicate hash should
    /// have been skipped.
    pub async fn insert(
        &self,
        filename: &str,
        upload_time: &str,
        hostname: &str,
        file_hash: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO uploads (filename, upload_time, hostname, file_hash)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(filename)
        .bind(upload_time)
        .bind(hostname)
        .bind(file_hash)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get the filename stored under a hash, if any
    ///
    /// If duplicates exist the choice of row is arbitrary.
    pub async fn find_one_by_hash(&self, file_hash: &str) -> Result<Option<String>> {
        let filename = sqlx::query_scalar::<_, String>(
            "SELECT filename FROM uploads WHERE file_hash = ? LIMIT 1",
        )
        .bind(file_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(filename)
    }

    /// List records newest-first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UploadRecord>> {
        let records = sqlx::query_as::<_, UploadRecord>(
            r#"
            SELECT id, filename, upload_time, hostname, file_hash
            FROM uploads
            ORDER BY upload_time DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Delete every record carrying this hash, returning how many went
    pub async fn delete_by_hash(&self, file_hash: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM uploads WHERE file_hash = ?")
            .bind(file_hash)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let repo = UploadRepository::new(&pool);
        repo.init().await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = setup_test_db().await;
        let repo = UploadRepository::new(&pool);

        repo.insert("a.txt", "2026-08-07 10:00:00", "127.0.0.1", "aa")
            .await
            .unwrap();

        // Re-running init must keep existing rows
        repo.init().await.unwrap();
        assert!(repo.exists("aa").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_and_exists() {
        let pool = setup_test_db().await;
        let repo = UploadRepository::new(&pool);

        assert!(!repo.exists("deadbeef").await.unwrap());

        let id = repo
            .insert("report.pdf", "2026-08-07 10:00:00", "10.0.0.5", "deadbeef")
            .await
            .unwrap();
        assert!(id > 0);
        assert!(repo.exists("deadbeef").await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let pool = setup_test_db().await;
        let repo = UploadRepository::new(&pool);

        let first = repo
            .insert("a.txt", "2026-08-07 10:00:00", "127.0.0.1", "aa")
            .await
            .unwrap();
        let second = repo
            .insert("b.txt", "2026-08-07 10:00:01", "127.0.0.1", "bb")
            .await
            .unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_find_one_by_hash() {
        let pool = setup_test_db().await;
        let repo = UploadRepository::new(&pool);

        assert_eq!(repo.find_one_by_hash("cafe").await.unwrap(), None);

        repo.insert("original.bin", "2026-08-07 10:00:00", "127.0.0.1", "cafe")
            .await
            .unwrap();
        assert_eq!(
            repo.find_one_by_hash("cafe").await.unwrap(),
            Some("original.bin".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_newest_first_with_pagination() {
        let pool = setup_test_db().await;
        let repo = UploadRepository::new(&pool);

        repo.insert("oldest.txt", "2026-08-07 09:00:00", "127.0.0.1", "a1")
            .await
            .unwrap();
        repo.insert("middle.txt", "2026-08-07 10:00:00", "127.0.0.1", "b2")
            .await
            .unwrap();
        repo.insert("newest.txt", "2026-08-07 11:00:00", "127.0.0.1", "c3")
            .await
            .unwrap();

        let page = repo.list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].filename, "newest.txt");
        assert_eq!(page[1].filename, "middle.txt");

        let rest = repo.list(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].filename, "oldest.txt");
    }

    #[tokio::test]
    async fn test_delete_by_hash_removes_all_matches() {
        let pool = setup_test_db().await;
        let repo = UploadRepository::new(&pool);

        // Duplicate hashes are possible at the schema level
        repo.insert("one.txt", "2026-08-07 10:00:00", "127.0.0.1", "dd")
            .await
            .unwrap();
        repo.insert("two.txt", "2026-08-07 10:00:01", "127.0.0.1", "dd")
            .await
            .unwrap();
        repo.insert("keep.txt", "2026-08-07 10:00:02", "127.0.0.1", "ee")
            .await
            .unwrap();

        let removed = repo.delete_by_hash("dd").await.unwrap();
        assert_eq!(removed, 2);
        assert!(!repo.exists("dd").await.unwrap());
        assert!(repo.exists("ee").await.unwrap());

        // Unknown hash deletes nothing, silently
        assert_eq!(repo.delete_by_hash("nope").await.unwrap(), 0);
    }
}
