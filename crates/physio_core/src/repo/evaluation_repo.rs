//! Evaluation records at `avaliacao/<patient>/<key>`.
//!
//! # Invariants
//! - Keys come from a per-patient counter (`keys/avaliacao/<patient>`).
//! - Stored evaluations are JSON objects with at least one non-empty field.

use super::keys::{KeyAllocator, KeyKind};
use super::{decode_record, encode_record, record_path, RepoError, RepoResult, EVALUATIONS_ROOT};
use crate::model::evaluation::Evaluation;
use crate::model::Keyed;
use crate::tree::{ChildQuery, TreeStore};
use log::{info, warn};

pub struct EvaluationRepository<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> EvaluationRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Allocates the next evaluation key for `patient_id`.
    pub fn next_key(&self, patient_id: &str) -> RepoResult<String> {
        KeyAllocator::new(self.store).next_key(KeyKind::Evaluation, Some(patient_id))
    }

    pub fn save(&self, patient_id: &str, key: &str, evaluation: &Evaluation) -> RepoResult<()> {
        if evaluation.is_empty() {
            return Err(RepoError::InvalidData(
                "evaluation must have at least one non-empty field".to_string(),
            ));
        }
        let path = record_path(EVALUATIONS_ROOT, &[patient_id, key])?;
        self.store.set(&path, &encode_record(&path, evaluation)?)?;
        info!("event=evaluation_save module=repo status=ok patient={patient_id} key={key}");
        Ok(())
    }

    pub fn get(&self, patient_id: &str, evaluation_id: &str) -> RepoResult<Option<Evaluation>> {
        let path = record_path(EVALUATIONS_ROOT, &[patient_id, evaluation_id])?;
        self.store
            .get(&path)?
            .map(|value| decode_record(&path, value))
            .transpose()
    }

    pub fn delete(&self, patient_id: &str, evaluation_id: &str) -> RepoResult<()> {
        let path = record_path(EVALUATIONS_ROOT, &[patient_id, evaluation_id])?;
        if !self.store.remove(&path)? {
            return Err(RepoError::NotFound(format!(
                "evaluation {evaluation_id} of patient {patient_id}"
            )));
        }
        info!(
            "event=evaluation_delete module=repo status=ok patient={patient_id} key={evaluation_id}"
        );
        Ok(())
    }

    /// Lists the evaluations of a patient in key order.
    ///
    /// Records that no longer decode are skipped with a warning so one bad
    /// entry does not hide the rest of the history.
    pub fn list_for_patient(&self, patient_id: &str) -> RepoResult<Vec<Keyed<Evaluation>>> {
        let parent = record_path(EVALUATIONS_ROOT, &[patient_id])?;
        let children = self
            .store
            .query_children(&parent, &ChildQuery::default())?;

        let mut evaluations = Vec::with_capacity(children.len());
        for (key, value) in children {
            let path = parent.child(&key)?;
            match decode_record::<Evaluation>(&path, value) {
                Ok(record) => evaluations.push(Keyed::new(key, record)),
                Err(_) => warn!(
                    "event=evaluation_list module=repo status=skipped patient={patient_id} key={key} error_code=malformed_record"
                ),
            }
        }
        Ok(evaluations)
    }
}
