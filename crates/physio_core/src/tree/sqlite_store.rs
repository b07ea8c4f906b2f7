//! SQLite-backed record tree.
//!
//! # Responsibility
//! - Persist scalar leaves in `tree_nodes` keyed by full path.
//! - Rebuild subtrees on read and keep writes transactional.
//!
//! # Invariants
//! - A path never holds a leaf and descendants at the same time: writes
//!   clear the target subtree and any scalar ancestors first.
//! - Counter increments run in an immediate transaction so concurrent
//!   connections serialize on the database write lock.

use super::order::{assemble, compare_keys, compare_values, flatten};
use super::{ChildQuery, StoreError, StoreResult, TreePath, TreeStore};
use log::{debug, error};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use serde_json::{Map, Value};

/// Record tree stored in the `tree_nodes` table of a migrated connection.
pub struct SqliteTreeStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTreeStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn begin_write(&self) -> StoreResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl TreeStore for SqliteTreeStore<'_> {
    fn get(&self, path: &TreePath) -> StoreResult<Option<Value>> {
        read_subtree(self.conn, path)
    }

    fn set(&self, path: &TreePath, value: &Value) -> StoreResult<()> {
        let tx = self.begin_write()?;
        write_subtree(&tx, path, value)?;
        tx.commit()?;
        debug!(
            "event=tree_set module=tree status=ok root={} depth={}",
            path.top_level(),
            path.segments().len()
        );
        Ok(())
    }

    fn update(&self, path: &TreePath, fields: &Map<String, Value>) -> StoreResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let tx = self.begin_write()?;
        for (relative, value) in fields {
            write_subtree(&tx, &path.join(relative)?, value)?;
        }
        tx.commit()?;
        debug!(
            "event=tree_update module=tree status=ok root={} fields={}",
            path.top_level(),
            fields.len()
        );
        Ok(())
    }

    fn remove(&self, path: &TreePath) -> StoreResult<bool> {
        let removed = delete_subtree(self.conn, path)?;
        debug!(
            "event=tree_remove module=tree status=ok root={} rows={}",
            path.top_level(),
            removed
        );
        Ok(removed > 0)
    }

    fn query_children(
        &self,
        path: &TreePath,
        query: &ChildQuery,
    ) -> StoreResult<Vec<(String, Value)>> {
        let mut children: Vec<(String, Value)> = match read_subtree(self.conn, path)? {
            Some(Value::Object(map)) => map.into_iter().collect(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Some(_) | None => Vec::new(),
        };

        match query.order_by_child.as_deref() {
            Some(child) => {
                let pointer = format!("/{}", child.trim_matches('/'));
                if let Some(expected) = &query.equal_to {
                    children.retain(|(_, value)| value.pointer(&pointer) == Some(expected));
                }
                children.sort_by(|(key_a, a), (key_b, b)| {
                    compare_values(a.pointer(&pointer), b.pointer(&pointer))
                        .then_with(|| compare_keys(key_a, key_b))
                });
            }
            None => children.sort_by(|(a, _), (b, _)| compare_keys(a, b)),
        }

        if let Some(limit) = query.limit_to_last {
            let keep = usize::try_from(limit).unwrap_or(usize::MAX);
            if children.len() > keep {
                children.drain(..children.len() - keep);
            }
        }

        Ok(children)
    }

    fn increment(&self, path: &TreePath) -> StoreResult<i64> {
        if path.is_root() {
            return Err(StoreError::InvalidPath(
                "counter cannot live at the root".to_string(),
            ));
        }

        let tx = self.begin_write()?;
        let current = match read_subtree(&tx, path)? {
            None => 0,
            Some(Value::Number(number)) => number.as_i64().ok_or_else(|| {
                StoreError::InvalidData(format!("counter at {path} is not an integer"))
            })?,
            Some(_) => {
                error!(
                    "event=tree_increment module=tree status=error root={} error_code=counter_not_numeric",
                    path.top_level()
                );
                return Err(StoreError::InvalidData(format!(
                    "counter at {path} is not a number"
                )));
            }
        };
        let next = current.checked_add(1).ok_or_else(|| {
            StoreError::InvalidData(format!("counter at {path} overflowed"))
        })?;
        write_subtree(&tx, path, &Value::from(next))?;
        tx.commit()?;

        debug!(
            "event=tree_increment module=tree status=ok root={}",
            path.top_level()
        );
        Ok(next)
    }
}

fn read_subtree(conn: &Connection, path: &TreePath) -> StoreResult<Option<Value>> {
    let rows = load_rows(conn, path)?;
    let key = path.storage_key();

    if let Some((_, value)) = rows.iter().find(|(row_path, _)| *row_path == key) {
        if !path.is_root() {
            return Ok(Some(value.clone()));
        }
    }

    let depth = path.segments().len();
    let leaves = rows
        .into_iter()
        .map(|(row_path, value)| {
            let relative = row_path
                .split('/')
                .skip(depth)
                .map(str::to_string)
                .collect::<Vec<_>>();
            (relative, value)
        })
        .collect();
    assemble(leaves)
}

fn load_rows(conn: &Connection, path: &TreePath) -> StoreResult<Vec<(String, Value)>> {
    let mut raw_rows: Vec<(String, String)> = Vec::new();

    if path.is_root() {
        let mut stmt = conn.prepare("SELECT path, value FROM tree_nodes ORDER BY path;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            raw_rows.push((row.get(0)?, row.get(1)?));
        }
    } else {
        let (key, lower, upper) = subtree_bounds(path);
        let mut stmt = conn.prepare(
            "SELECT path, value FROM tree_nodes
             WHERE path = ?1 OR (path >= ?2 AND path < ?3)
             ORDER BY path;",
        )?;
        let mut rows = stmt.query(params![key, lower, upper])?;
        while let Some(row) = rows.next()? {
            raw_rows.push((row.get(0)?, row.get(1)?));
        }
    }

    raw_rows
        .into_iter()
        .map(|(row_path, text)| -> StoreResult<(String, Value)> {
            let value = serde_json::from_str::<Value>(&text).map_err(|err| {
                StoreError::InvalidData(format!("leaf at /{row_path} is not valid JSON: {err}"))
            })?;
            Ok((row_path, value))
        })
        .collect()
}

fn write_subtree(conn: &Connection, path: &TreePath, value: &Value) -> StoreResult<()> {
    let mut leaves = Vec::new();
    flatten(path, value, &mut leaves)?;

    if path.is_root() && leaves.iter().any(|(leaf, _)| leaf.is_root()) {
        return Err(StoreError::InvalidPath(
            "cannot store a scalar at the root".to_string(),
        ));
    }

    delete_subtree(conn, path)?;
    if leaves.is_empty() {
        return Ok(());
    }

    for ancestor in path.ancestors() {
        conn.execute(
            "DELETE FROM tree_nodes WHERE path = ?1;",
            [ancestor.storage_key()],
        )?;
    }

    let mut insert = conn.prepare(
        "INSERT INTO tree_nodes (path, parent, value) VALUES (?1, ?2, ?3);",
    )?;
    for (leaf_path, leaf) in leaves {
        let parent = leaf_path
            .parent()
            .map(|parent| parent.storage_key())
            .unwrap_or_default();
        let encoded = serde_json::to_string(&leaf)
            .map_err(|err| StoreError::InvalidData(format!("cannot encode leaf: {err}")))?;
        insert.execute(params![leaf_path.storage_key(), parent, encoded])?;
    }

    Ok(())
}

fn delete_subtree(conn: &Connection, path: &TreePath) -> StoreResult<usize> {
    if path.is_root() {
        return Ok(conn.execute("DELETE FROM tree_nodes;", [])?);
    }

    let (key, lower, upper) = subtree_bounds(path);
    Ok(conn.execute(
        "DELETE FROM tree_nodes WHERE path = ?1 OR (path >= ?2 AND path < ?3);",
        params![key, lower, upper],
    )?)
}

/// Exact key plus the half-open range covering every descendant.
///
/// `'0'` is the character right after `'/'`, so `[key/, key0)` holds exactly
/// the paths that start with `key/`.
fn subtree_bounds(path: &TreePath) -> (String, String, String) {
    let key = path.storage_key();
    let lower = format!("{key}/");
    let upper = format!("{key}0");
    (key, lower, upper)
}
