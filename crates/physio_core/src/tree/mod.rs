//! Hierarchical key-value record tree.
//!
//! # Responsibility
//! - Define the store contract every repository talks to (`TreeStore`).
//! - Keep path validation, key ordering and flattening rules in one place.
//!
//! # Invariants
//! - Only scalar leaves are persisted; objects exist implicitly through
//!   their descendants, so an empty object is indistinguishable from absence.
//! - Writing `null` removes the addressed subtree.
//! - Child listings follow record-key order (integer keys first, numerically).

use crate::db::DbError;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod order;
pub mod path;
mod sqlite_store;

pub use path::TreePath;
pub use sqlite_store::SqliteTreeStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport and integrity errors raised by tree and blob stores.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidPath(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidPath(message) => write!(f, "invalid store path: {message}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidPath(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Child selection for `TreeStore::query_children`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildQuery {
    /// Orders children by this child field (relative path) instead of by key.
    pub order_by_child: Option<String>,
    /// Keeps only children whose `order_by_child` field equals this value.
    /// Ignored when `order_by_child` is `None`.
    pub equal_to: Option<Value>,
    /// Keeps the last `n` children after ordering.
    pub limit_to_last: Option<u32>,
}

impl ChildQuery {
    /// Matches children whose `child` field equals `value`.
    pub fn child_equals(child: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            order_by_child: Some(child.into()),
            equal_to: Some(value.into()),
            limit_to_last: None,
        }
    }

    /// Keeps the last `limit` children in key order; `None` keeps all.
    pub fn last(limit: Option<u32>) -> Self {
        Self {
            limit_to_last: limit,
            ..Self::default()
        }
    }
}

/// Store contract for the record tree.
///
/// Implementations must make `set`, `update` and `increment` atomic.
pub trait TreeStore {
    /// Reads a scalar leaf or an assembled subtree; `None` when absent.
    fn get(&self, path: &TreePath) -> StoreResult<Option<Value>>;
    /// Replaces the subtree at `path`.
    fn set(&self, path: &TreePath, value: &Value) -> StoreResult<()>;
    /// Replaces each listed child of `path`; keys may be relative paths.
    fn update(&self, path: &TreePath, fields: &Map<String, Value>) -> StoreResult<()>;
    /// Removes the subtree at `path`, returning whether anything existed.
    fn remove(&self, path: &TreePath) -> StoreResult<bool>;
    /// Lists direct children of `path` as `(key, value)` pairs.
    fn query_children(
        &self,
        path: &TreePath,
        query: &ChildQuery,
    ) -> StoreResult<Vec<(String, Value)>>;
    /// Increments the integer counter at `path` and returns the new value.
    fn increment(&self, path: &TreePath) -> StoreResult<i64>;
}
