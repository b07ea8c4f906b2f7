//! SQLite-backed blob bucket.

use super::{render_download_url, BlobMetadata, BlobStore, StoragePath};
use crate::tree::{StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const BLOB_META_SQL: &str = "SELECT path, content_type, size_bytes, download_token, created_at FROM blobs";

/// Bucket stored in the `blobs` table of a migrated connection.
pub struct SqliteBlobStore<'conn> {
    conn: &'conn Connection,
    bucket: String,
    download_base_url: String,
}

impl<'conn> SqliteBlobStore<'conn> {
    pub fn new(
        conn: &'conn Connection,
        bucket: impl Into<String>,
        download_base_url: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            bucket: bucket.into(),
            download_base_url: download_base_url.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn metadata(&self, object_name: &str) -> StoreResult<Option<BlobMetadata>> {
        let metadata = self
            .conn
            .query_row(
                &format!("{BLOB_META_SQL} WHERE path = ?1;"),
                [object_name],
                parse_metadata_row,
            )
            .optional()?;
        Ok(metadata)
    }
}

impl BlobStore for SqliteBlobStore<'_> {
    fn put(
        &self,
        path: &StoragePath,
        data: &[u8],
        content_type: &str,
    ) -> StoreResult<BlobMetadata> {
        let object_name = path.object_name();
        let token = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO blobs (path, content_type, data, size_bytes, download_token)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET
                content_type = excluded.content_type,
                data = excluded.data,
                size_bytes = excluded.size_bytes,
                download_token = excluded.download_token,
                created_at = (strftime('%s', 'now') * 1000);",
            params![
                object_name,
                content_type,
                data,
                i64::try_from(data.len()).unwrap_or(i64::MAX),
                token
            ],
        )?;
        debug!(
            "event=blob_put module=blob status=ok size_bytes={} content_type={}",
            data.len(),
            content_type
        );

        self.metadata(&object_name)?.ok_or_else(|| {
            StoreError::InvalidData(format!("uploaded object {path} missing on read-back"))
        })
    }

    fn get(&self, path: &StoragePath) -> StoreResult<Option<(BlobMetadata, Vec<u8>)>> {
        let object_name = path.object_name();
        let found = self
            .conn
            .query_row(
                "SELECT path, content_type, size_bytes, download_token, created_at, data
                 FROM blobs WHERE path = ?1;",
                [object_name],
                |row| Ok((parse_metadata_row(row)?, row.get::<_, Vec<u8>>("data")?)),
            )
            .optional()?;
        Ok(found)
    }

    fn delete(&self, path: &StoragePath) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM blobs WHERE path = ?1;", [path.object_name()])?;
        debug!("event=blob_delete module=blob status=ok rows={changed}");
        Ok(changed > 0)
    }

    fn list(&self, prefix: &StoragePath) -> StoreResult<Vec<BlobMetadata>> {
        let object_prefix = prefix.object_name();
        let lower = format!("{object_prefix}/");
        let upper = format!("{object_prefix}0");
        let mut stmt = self.conn.prepare(&format!(
            "{BLOB_META_SQL} WHERE path >= ?1 AND path < ?2 ORDER BY path;"
        ))?;
        let mut rows = stmt.query(params![lower, upper])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_metadata_row(row)?);
        }
        Ok(items)
    }

    fn download_url(&self, path: &StoragePath) -> StoreResult<Option<String>> {
        Ok(self.metadata(&path.object_name())?.map(|metadata| {
            render_download_url(
                &self.download_base_url,
                &self.bucket,
                &metadata.path,
                &metadata.download_token,
            )
        }))
    }
}

fn parse_metadata_row(row: &Row<'_>) -> rusqlite::Result<BlobMetadata> {
    let size: i64 = row.get("size_bytes")?;
    Ok(BlobMetadata {
        path: row.get("path")?,
        content_type: row.get("content_type")?,
        size_bytes: u64::try_from(size).unwrap_or(0),
        download_token: row.get("download_token")?,
        created_at: row.get("created_at")?,
    })
}
