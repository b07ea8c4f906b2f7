//! Core data access and validation for the physiotherapy clinic app.
//! Screens call the services; services call repositories over the record
//! tree and the photo bucket.

pub mod blob;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;
pub mod validation;

pub use blob::{BlobMetadata, BlobStore, SqliteBlobStore, StoragePath};
pub use config::{Backend, BackendConfig, BackendError, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::evaluation::Evaluation;
pub use model::patient::Patient;
pub use model::patient_group::PatientGroup;
pub use model::person::{PersonalData, Sex};
pub use model::physiotherapist::Physiotherapist;
pub use model::timestamp::Timestamp;
pub use model::user::{UserKind, UserRecord};
pub use model::Keyed;
pub use repo::evaluation_repo::EvaluationRepository;
pub use repo::keys::{KeyAllocator, KeyKind};
pub use repo::patient_group_repo::PatientGroupRepository;
pub use repo::patient_repo::PatientRepository;
pub use repo::photo_repo::EvaluationPhotoRepository;
pub use repo::physiotherapist_repo::PhysiotherapistRepository;
pub use repo::user_repo::UserRepository;
pub use repo::{RepoError, RepoResult};
pub use service::evaluation_service::EvaluationService;
pub use service::patient_service::PatientService;
pub use service::physiotherapist_service::PhysiotherapistService;
pub use service::{Profile, ServiceError, ServiceResult};
pub use tree::{ChildQuery, SqliteTreeStore, StoreError, StoreResult, TreePath, TreeStore};
pub use validation::cpf::{format_cpf, is_valid_cpf, strip_cpf};
pub use validation::date::parse_birth_date;
pub use validation::email::is_valid_email;
pub use validation::form::{FormError, PatientForm, PersonForm};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
