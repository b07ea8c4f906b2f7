//! Data-access layer over the record tree and the photo bucket.
//!
//! # Responsibility
//! - Map each clinic entity onto its tree location and stored JSON shape.
//! - Turn store transport failures and malformed data into `RepoError`.
//!
//! # Invariants
//! - Reads reject malformed stored records instead of masking them.
//! - Deleting an absent record is `RepoError::NotFound`, never silent.
//! - No referential integrity is enforced here; services add the checks.

use crate::model::Keyed;
use crate::tree::{StoreError, TreePath};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod evaluation_repo;
pub mod keys;
pub mod patient_group_repo;
pub mod patient_repo;
pub mod photo_repo;
pub mod physiotherapist_repo;
pub mod user_repo;

pub const USERS_ROOT: &str = "users";
pub const PHYSIOTHERAPISTS_ROOT: &str = "fisioterapeutas";
pub const PATIENTS_ROOT: &str = "pacientes";
pub const EVALUATIONS_ROOT: &str = "avaliacao";
pub const PATIENT_GROUPS_ROOT: &str = "grupos_pacientes";
pub const KEYS_ROOT: &str = "keys";
pub const EVALUATION_PHOTOS_ROOT: &str = "avaliacoes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and lookups.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// The addressed record does not exist.
    NotFound(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(what) => write!(f, "record not found: {what}"),
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub(crate) fn root_path(root: &str) -> RepoResult<TreePath> {
    Ok(TreePath::parse(root)?)
}

pub(crate) fn record_path(root: &str, keys: &[&str]) -> RepoResult<TreePath> {
    let mut path = TreePath::parse(root)?;
    for key in keys {
        path = path.child(key)?;
    }
    Ok(path)
}

pub(crate) fn encode_record<T: Serialize>(path: &TreePath, record: &T) -> RepoResult<Value> {
    serde_json::to_value(record)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode record at {path}: {err}")))
}

pub(crate) fn decode_record<T: DeserializeOwned>(path: &TreePath, value: Value) -> RepoResult<T> {
    serde_json::from_value(value)
        .map_err(|err| RepoError::InvalidData(format!("malformed record at {path}: {err}")))
}

pub(crate) fn decode_children<T: DeserializeOwned>(
    parent: &TreePath,
    children: Vec<(String, Value)>,
) -> RepoResult<Vec<Keyed<T>>> {
    children
        .into_iter()
        .map(|(key, value)| -> RepoResult<Keyed<T>> {
            let path = parent.child(&key)?;
            Ok(Keyed::new(key, decode_record(&path, value)?))
        })
        .collect()
}

/// `None` and `Some(0)` both mean "no limit".
pub(crate) fn normalize_limit(limit: Option<u32>) -> Option<u32> {
    limit.filter(|value| *value > 0)
}
