//! Connection setup shared by file and in-memory databases.

use super::migrations::migrate;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a writer waits for the lock held by another connection, e.g.
/// two devices allocating keys at once.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

enum Target {
    File(PathBuf),
    Memory,
}

impl Target {
    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens (creating if needed) the clinic database at `path` and upgrades
/// its schema.
///
/// File databases run in WAL mode so readers do not block the counter
/// transactions of other connections.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    connect(Target::File(path.as_ref().to_path_buf()))
}

/// Opens a private in-memory database with the current schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    connect(Target::Memory)
}

fn connect(target: Target) -> DbResult<Connection> {
    let started_at = Instant::now();
    let label = target.label();

    match prepare(&target) {
        Ok((conn, applied)) => {
            info!(
                "event=db_connect module=db status=ok target={label} migrations_applied={applied} elapsed_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_connect module=db status=error target={label} elapsed_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn prepare(target: &Target) -> DbResult<(Connection, usize)> {
    let mut conn = match target {
        Target::File(path) => {
            let conn = Connection::open(path)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn
        }
        Target::Memory => Connection::open_in_memory()?,
    };
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let applied = migrate(&mut conn)?;
    Ok((conn, applied))
}
