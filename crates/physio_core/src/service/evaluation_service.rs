//! Patient evaluation use cases, including photo attachments.
//!
//! # Invariants
//! - Evaluations are only created for patients that exist at write time.
//! - Photos are only attached to evaluations that exist at write time.
//! - Deleting an evaluation also deletes its photos.

use super::{ServiceError, ServiceResult};
use crate::blob::{BlobMetadata, BlobStore};
use crate::model::evaluation::Evaluation;
use crate::model::Keyed;
use crate::repo::evaluation_repo::EvaluationRepository;
use crate::repo::patient_repo::PatientRepository;
use crate::repo::photo_repo::EvaluationPhotoRepository;
use crate::repo::RepoError;
use crate::tree::TreeStore;
use log::info;

pub struct EvaluationService<'s, S: TreeStore + ?Sized, B: BlobStore + ?Sized> {
    store: &'s S,
    blobs: &'s B,
}

impl<'s, S: TreeStore + ?Sized, B: BlobStore + ?Sized> EvaluationService<'s, S, B> {
    pub fn new(store: &'s S, blobs: &'s B) -> Self {
        Self { store, blobs }
    }

    fn evaluations(&self) -> EvaluationRepository<'s, S> {
        EvaluationRepository::new(self.store)
    }

    fn photos(&self) -> EvaluationPhotoRepository<'s, B> {
        EvaluationPhotoRepository::new(self.blobs)
    }

    fn ensure_patient(&self, patient_id: &str) -> ServiceResult<()> {
        if PatientRepository::new(self.store).get(patient_id)?.is_none() {
            return Err(ServiceError::UnknownPatient(patient_id.to_string()));
        }
        Ok(())
    }

    fn ensure_evaluation(&self, patient_id: &str, evaluation_id: &str) -> ServiceResult<()> {
        if self.evaluations().get(patient_id, evaluation_id)?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "evaluation {evaluation_id} of patient {patient_id}"
            )));
        }
        Ok(())
    }

    /// Records a new evaluation and returns its per-patient key.
    pub fn create(&self, patient_id: &str, evaluation: &Evaluation) -> ServiceResult<String> {
        self.ensure_patient(patient_id)?;
        if evaluation.is_empty() {
            return Err(ServiceError::Repo(RepoError::InvalidData(
                "evaluation must have at least one non-empty field".to_string(),
            )));
        }
        let evaluations = self.evaluations();
        let key = evaluations.next_key(patient_id)?;
        evaluations.save(patient_id, &key, evaluation)?;
        info!("event=evaluation_create module=service status=ok patient={patient_id} key={key}");
        Ok(key)
    }

    /// Replaces the form data of an existing evaluation.
    pub fn update(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        evaluation: &Evaluation,
    ) -> ServiceResult<()> {
        self.ensure_evaluation(patient_id, evaluation_id)?;
        self.evaluations()
            .save(patient_id, evaluation_id, evaluation)?;
        Ok(())
    }

    pub fn get(&self, patient_id: &str, evaluation_id: &str) -> ServiceResult<Option<Evaluation>> {
        Ok(self.evaluations().get(patient_id, evaluation_id)?)
    }

    pub fn list(&self, patient_id: &str) -> ServiceResult<Vec<Keyed<Evaluation>>> {
        Ok(self.evaluations().list_for_patient(patient_id)?)
    }

    /// Deletes an evaluation and its photos, returning how many photos went.
    ///
    /// Photos go first, so a failed run can be retried against the
    /// still-present record.
    pub fn delete(&self, patient_id: &str, evaluation_id: &str) -> ServiceResult<usize> {
        self.ensure_evaluation(patient_id, evaluation_id)?;

        let photos = self.photos();
        let mut removed = 0;
        for photo in photos.list(patient_id, evaluation_id)? {
            let file_name = photo.path.rsplit('/').next().unwrap_or_default();
            match photos.delete(patient_id, evaluation_id, file_name) {
                Ok(()) => removed += 1,
                Err(RepoError::NotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
        self.evaluations().delete(patient_id, evaluation_id)?;

        info!(
            "event=evaluation_delete module=service status=ok patient={patient_id} key={evaluation_id} photos={removed}"
        );
        Ok(removed)
    }

    /// Attaches a base64 (or `data:` URL) photo to an existing evaluation.
    pub fn attach_photo(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        file_name: &str,
        base64: &str,
    ) -> ServiceResult<BlobMetadata> {
        self.ensure_evaluation(patient_id, evaluation_id)?;
        Ok(self
            .photos()
            .save_base64(patient_id, evaluation_id, file_name, base64)?)
    }

    pub fn photo_url(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        file_name: &str,
    ) -> ServiceResult<Option<String>> {
        Ok(self
            .photos()
            .download_url(patient_id, evaluation_id, file_name)?)
    }

    pub fn delete_photo(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        file_name: &str,
    ) -> ServiceResult<()> {
        self.photos().delete(patient_id, evaluation_id, file_name)?;
        Ok(())
    }

    pub fn list_photos(
        &self,
        patient_id: &str,
        evaluation_id: &str,
    ) -> ServiceResult<Vec<BlobMetadata>> {
        Ok(self.photos().list(patient_id, evaluation_id)?)
    }
}
