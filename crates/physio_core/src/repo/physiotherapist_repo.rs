//! Physiotherapist records at `fisioterapeutas/<key>`.

use super::keys::{KeyAllocator, KeyKind};
use super::{
    decode_children, decode_record, encode_record, normalize_limit, record_path, root_path,
    RepoError, RepoResult, PHYSIOTHERAPISTS_ROOT,
};
use crate::model::physiotherapist::Physiotherapist;
use crate::model::Keyed;
use crate::tree::{ChildQuery, TreeStore};
use log::info;

pub struct PhysiotherapistRepository<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> PhysiotherapistRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Allocates the key for a new physiotherapist.
    pub fn next_key(&self) -> RepoResult<String> {
        KeyAllocator::new(self.store).next_key(KeyKind::Physiotherapist, None)
    }

    /// Creates or replaces the record stored under `key`.
    pub fn save(&self, key: &str, record: &Physiotherapist) -> RepoResult<()> {
        let path = record_path(PHYSIOTHERAPISTS_ROOT, &[key])?;
        self.store.set(&path, &encode_record(&path, record)?)?;
        info!("event=physiotherapist_save module=repo status=ok key={key}");
        Ok(())
    }

    pub fn get(&self, id: &str) -> RepoResult<Option<Physiotherapist>> {
        let path = record_path(PHYSIOTHERAPISTS_ROOT, &[id])?;
        self.store
            .get(&path)?
            .map(|value| decode_record(&path, value))
            .transpose()
    }

    pub fn delete(&self, id: &str) -> RepoResult<()> {
        let path = record_path(PHYSIOTHERAPISTS_ROOT, &[id])?;
        if !self.store.remove(&path)? {
            return Err(RepoError::NotFound(format!("physiotherapist {id}")));
        }
        info!("event=physiotherapist_delete module=repo status=ok key={id}");
        Ok(())
    }

    /// Lists the last `limit` records in key order; `None` lists all.
    pub fn list_recent(&self, limit: Option<u32>) -> RepoResult<Vec<Keyed<Physiotherapist>>> {
        let root = root_path(PHYSIOTHERAPISTS_ROOT)?;
        let children = self
            .store
            .query_children(&root, &ChildQuery::last(normalize_limit(limit)))?;
        decode_children(&root, children)
    }

    /// Finds records whose stored email equals `email` exactly.
    pub fn find_by_email(&self, email: &str) -> RepoResult<Vec<Keyed<Physiotherapist>>> {
        let root = root_path(PHYSIOTHERAPISTS_ROOT)?;
        let children = self
            .store
            .query_children(&root, &ChildQuery::child_equals("email", email))?;
        decode_children(&root, children)
    }
}
