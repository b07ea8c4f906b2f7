//! Evaluation photos at `avaliacoes/<patient>/<evaluation>/<file>` in the bucket.

use super::{RepoError, RepoResult, EVALUATION_PHOTOS_ROOT};
use crate::blob::{decode_base64_upload, BlobMetadata, BlobStore, StoragePath};
use log::info;

pub struct EvaluationPhotoRepository<'b, B: BlobStore + ?Sized> {
    blobs: &'b B,
}

impl<'b, B: BlobStore + ?Sized> EvaluationPhotoRepository<'b, B> {
    pub fn new(blobs: &'b B) -> Self {
        Self { blobs }
    }

    /// Stores a photo given as raw base64 or a `data:` URL.
    pub fn save_base64(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        file_name: &str,
        base64: &str,
    ) -> RepoResult<BlobMetadata> {
        let path = photo_path(patient_id, evaluation_id, file_name)?;
        let upload = decode_base64_upload(base64)?;
        let metadata = self
            .blobs
            .put(&path, &upload.bytes, &upload.content_type)?;
        info!(
            "event=photo_save module=repo status=ok patient={patient_id} evaluation={evaluation_id} size_bytes={}",
            metadata.size_bytes
        );
        Ok(metadata)
    }

    pub fn get(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        file_name: &str,
    ) -> RepoResult<Option<(BlobMetadata, Vec<u8>)>> {
        let path = photo_path(patient_id, evaluation_id, file_name)?;
        Ok(self.blobs.get(&path)?)
    }

    pub fn download_url(
        &self,
        patient_id: &str,
        evaluation_id: &str,
        file_name: &str,
    ) -> RepoResult<Option<String>> {
        let path = photo_path(patient_id, evaluation_id, file_name)?;
        Ok(self.blobs.download_url(&path)?)
    }

    pub fn delete(&self, patient_id: &str, evaluation_id: &str, file_name: &str) -> RepoResult<()> {
        let path = photo_path(patient_id, evaluation_id, file_name)?;
        if !self.blobs.delete(&path)? {
            return Err(RepoError::NotFound(format!("photo {path}")));
        }
        info!(
            "event=photo_delete module=repo status=ok patient={patient_id} evaluation={evaluation_id}"
        );
        Ok(())
    }

    /// Lists the photos attached to one evaluation, ordered by object name.
    pub fn list(&self, patient_id: &str, evaluation_id: &str) -> RepoResult<Vec<BlobMetadata>> {
        let prefix =
            StoragePath::from_segments([EVALUATION_PHOTOS_ROOT, patient_id, evaluation_id])?;
        Ok(self.blobs.list(&prefix)?)
    }
}

fn photo_path(patient_id: &str, evaluation_id: &str, file_name: &str) -> RepoResult<StoragePath> {
    Ok(StoragePath::from_segments([
        EVALUATION_PHOTOS_ROOT,
        patient_id,
        evaluation_id,
        file_name,
    ])?)
}
