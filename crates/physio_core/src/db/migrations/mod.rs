//! Numbered schema scripts for the clinic database.
//!
//! Scripts are append-only: a shipped script is never edited, a new
//! number is added instead.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, script)` in ascending version order.
const SCRIPTS: [(u32, &str); 2] = [
    (1, include_str!("0001_tree_nodes.sql")),
    (2, include_str!("0002_blobs.sql")),
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCRIPTS.last().map_or(0, |(version, _)| *version)
}

/// Schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Runs every script newer than the recorded version in one transaction
/// and returns how many ran.
///
/// # Errors
/// - `SchemaTooNew` when the file was upgraded by a newer build.
/// - `Migration` naming the first script that failed.
pub fn migrate(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<&(u32, &str)> = SCRIPTS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, script) in &pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version: *version,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={supported} scripts={}",
        pending.len()
    );
    Ok(pending.len())
}
