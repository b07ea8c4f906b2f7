//! Patient group labels at `grupos_pacientes/<code>`.

use super::{
    decode_children, decode_record, encode_record, record_path, root_path, RepoResult,
    PATIENT_GROUPS_ROOT,
};
use crate::model::patient_group::PatientGroup;
use crate::model::Keyed;
use crate::tree::{ChildQuery, TreeStore};

pub struct PatientGroupRepository<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> PatientGroupRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> RepoResult<Vec<Keyed<PatientGroup>>> {
        let root = root_path(PATIENT_GROUPS_ROOT)?;
        let children = self.store.query_children(&root, &ChildQuery::default())?;
        decode_children(&root, children)
    }

    pub fn get(&self, code: &str) -> RepoResult<Option<PatientGroup>> {
        let path = record_path(PATIENT_GROUPS_ROOT, &[code])?;
        self.store
            .get(&path)?
            .map(|value| decode_record(&path, value))
            .transpose()
    }

    pub fn save(&self, code: &str, group: &PatientGroup) -> RepoResult<()> {
        let path = record_path(PATIENT_GROUPS_ROOT, &[code])?;
        self.store.set(&path, &encode_record(&path, group)?)?;
        Ok(())
    }
}
