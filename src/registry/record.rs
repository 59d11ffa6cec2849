//! Folder records and their repository.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::path::{self, Status};
use crate::{MediaTreeError, Result};

/// A registered folder.
///
/// A record may exist with zero objects beneath it; that is the entire
/// reason the registry exists. `status` is denormalized from `full_path`
/// and recomputed on every write.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FolderRecord {
    /// Unique record ID.
    pub id: i64,
    /// Namespace root this record belongs to.
    pub namespace_root: String,
    /// Full folder path, starting with `namespace_root/`.
    pub full_path: String,
    /// Derived lifecycle status (second path segment).
    pub status: String,
    /// When the record was created.
    pub created_at: String,
    /// When the record was last touched.
    pub updated_at: String,
}

impl FolderRecord {
    /// The derived status as an enum.
    pub fn status(&self) -> Option<Status> {
        Status::parse(&self.status)
    }

    /// `created_at` as a UTC timestamp. SQLite's `datetime('now')` writes
    /// space-separated UTC without a zone suffix.
    pub fn created_at_datetime(&self) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%d %H:%M:%S")
            .map(|dt| dt.and_utc())
            .unwrap_or_else(|_| Utc::now())
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, namespace_root, full_path, status, created_at, updated_at FROM folders";

/// Escape LIKE wildcards so a prefix with `%` or `_` matches literally.
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Repository for folder records, scoped to one namespace root.
#[derive(Debug, Clone)]
pub struct FolderRegistry {
    pool: SqlitePool,
    namespace_root: String,
}

impl FolderRegistry {
    /// Create a registry over the given pool and namespace root.
    pub fn new(pool: SqlitePool, namespace_root: impl Into<String>) -> Self {
        Self {
            pool,
            namespace_root: namespace_root.into(),
        }
    }

    /// The namespace root this registry is scoped to.
    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    /// Derive the status column value for a path.
    fn derive_status(&self, full_path: &str) -> Result<Status> {
        path::validate(full_path, &self.namespace_root)?;
        if full_path == self.namespace_root {
            return Err(MediaTreeError::Validation(
                "namespace root itself is not a folder record".to_string(),
            ));
        }
        Status::of(full_path).ok_or_else(|| {
            MediaTreeError::Validation(format!("path has no valid status segment: {full_path}"))
        })
    }

    /// Idempotently register a folder path.
    ///
    /// Recomputes `status` from the path and touches `updated_at` when the
    /// record already exists.
    pub async fn upsert(&self, full_path: &str) -> Result<FolderRecord> {
        let status = self.derive_status(full_path)?;

        sqlx::query(
            "INSERT INTO folders (namespace_root, full_path, status)
             VALUES (?, ?, ?)
             ON CONFLICT (namespace_root, full_path)
             DO UPDATE SET status = excluded.status, updated_at = datetime('now')",
        )
        .bind(&self.namespace_root)
        .bind(full_path)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        self.get(full_path)
            .await?
            .ok_or_else(|| MediaTreeError::Database(format!("upserted folder vanished: {full_path}")))
    }

    /// Register a path and every ancestor between it and the namespace root.
    pub async fn upsert_with_ancestors(&self, full_path: &str) -> Result<()> {
        for ancestor in path::ancestors(full_path, &self.namespace_root) {
            self.upsert(&ancestor).await?;
        }
        self.upsert(full_path).await?;
        Ok(())
    }

    /// Get a folder record by path.
    pub async fn get(&self, full_path: &str) -> Result<Option<FolderRecord>> {
        let record = sqlx::query_as::<_, FolderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE namespace_root = ? AND full_path = ?"
        ))
        .bind(&self.namespace_root)
        .bind(full_path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Whether a record exists for the exact path.
    pub async fn exists(&self, full_path: &str) -> Result<bool> {
        Ok(self.get(full_path).await?.is_some())
    }

    /// List every record at or nested under a path prefix, ordered by path.
    pub async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<FolderRecord>> {
        let records = sqlx::query_as::<_, FolderRecord>(&format!(
            "{SELECT_COLUMNS}
             WHERE namespace_root = ? AND (full_path = ? OR full_path LIKE ? || '/%' ESCAPE '\\')
             ORDER BY full_path"
        ))
        .bind(&self.namespace_root)
        .bind(prefix)
        .bind(escape_like(prefix))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Rewrite every record at or under `from` to live under `to`.
    ///
    /// Statuses are recomputed from the rewritten paths. All updates run
    /// inside one transaction. Returns the number of rewritten records.
    pub async fn rewrite_prefix(&self, from: &str, to: &str) -> Result<u64> {
        let records = self.list_by_prefix(from).await?;
        if records.is_empty() {
            return Ok(0);
        }

        let mut rewritten = 0u64;
        let mut tx = self.pool.begin().await?;
        for record in &records {
            let new_path = match path::relative_suffix(&record.full_path, from) {
                Some(suffix) => path::join(to, suffix),
                None => to.to_string(),
            };
            let status = self.derive_status(&new_path)?;

            sqlx::query(
                "UPDATE folders SET full_path = ?, status = ?, updated_at = datetime('now')
                 WHERE id = ?",
            )
            .bind(&new_path)
            .bind(status.as_str())
            .bind(record.id)
            .execute(&mut *tx)
            .await?;
            rewritten += 1;
        }
        tx.commit().await?;

        Ok(rewritten)
    }

    /// Delete the record for the exact path. Folders are never auto-pruned;
    /// this is only reached through an explicit purge.
    pub async fn delete(&self, full_path: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE namespace_root = ? AND full_path = ?")
            .bind(&self.namespace_root)
            .bind(full_path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
