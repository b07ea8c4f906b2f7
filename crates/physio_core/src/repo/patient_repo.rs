//! Patient records at `pacientes/<key>`.

use super::keys::{KeyAllocator, KeyKind};
use super::{
    decode_children, decode_record, encode_record, normalize_limit, record_path, root_path,
    RepoError, RepoResult, PATIENTS_ROOT,
};
use crate::model::patient::{Patient, RESPONSIBLE_FIELD};
use crate::model::Keyed;
use crate::tree::{ChildQuery, TreeStore};
use log::info;

pub struct PatientRepository<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> PatientRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Allocates the key for a new patient.
    pub fn next_key(&self) -> RepoResult<String> {
        KeyAllocator::new(self.store).next_key(KeyKind::Patient, None)
    }

    pub fn save(&self, key: &str, record: &Patient) -> RepoResult<()> {
        let path = record_path(PATIENTS_ROOT, &[key])?;
        self.store.set(&path, &encode_record(&path, record)?)?;
        info!("event=patient_save module=repo status=ok key={key}");
        Ok(())
    }

    pub fn get(&self, id: &str) -> RepoResult<Option<Patient>> {
        let path = record_path(PATIENTS_ROOT, &[id])?;
        self.store
            .get(&path)?
            .map(|value| decode_record(&path, value))
            .transpose()
    }

    pub fn delete(&self, id: &str) -> RepoResult<()> {
        let path = record_path(PATIENTS_ROOT, &[id])?;
        if !self.store.remove(&path)? {
            return Err(RepoError::NotFound(format!("patient {id}")));
        }
        info!("event=patient_delete module=repo status=ok key={id}");
        Ok(())
    }

    /// Lists the last `limit` records in key order; `None` lists all.
    pub fn list_recent(&self, limit: Option<u32>) -> RepoResult<Vec<Keyed<Patient>>> {
        let root = root_path(PATIENTS_ROOT)?;
        let children = self
            .store
            .query_children(&root, &ChildQuery::last(normalize_limit(limit)))?;
        decode_children(&root, children)
    }

    /// Lists patients whose responsible physiotherapist is `physiotherapist_id`.
    pub fn list_by_responsible(&self, physiotherapist_id: &str) -> RepoResult<Vec<Keyed<Patient>>> {
        let root = root_path(PATIENTS_ROOT)?;
        let children = self.store.query_children(
            &root,
            &ChildQuery::child_equals(RESPONSIBLE_FIELD, physiotherapist_id),
        )?;
        decode_children(&root, children)
    }
}
