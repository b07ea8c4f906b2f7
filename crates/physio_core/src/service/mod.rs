//! Form-driven clinic use cases.
//!
//! # Responsibility
//! - Orchestrate validation, client-side integrity checks and repository
//!   calls for each registration/evaluation screen.
//! - Keep credential records in step with physiotherapist/patient records.
//!
//! # Invariants
//! - Services never bypass form validation before writing.
//! - Integrity checks (unique email, existing foreign keys) are best-effort
//!   reads; they do not lock against concurrent writers.

use crate::repo::RepoError;
use crate::validation::form::FormError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod credentials;
pub mod evaluation_service;
pub mod patient_service;
pub mod physiotherapist_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for clinic use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// A form field failed validation.
    Form(FormError),
    /// The email already belongs to the physiotherapist with this key.
    EmailTaken { owner: String },
    /// The CPF already has a credential linked to another record.
    CpfTaken,
    UnknownPhysiotherapist(String),
    UnknownPatient(String),
    UnknownPatientGroup(String),
    /// The record being edited or deleted does not exist.
    NotFound(String),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::EmailTaken { owner } => write!(
                f,
                "email is already registered for physiotherapist {owner}"
            ),
            Self::CpfTaken => write!(f, "CPF is already registered for another record"),
            Self::UnknownPhysiotherapist(id) => write!(f, "unknown physiotherapist: {id}"),
            Self::UnknownPatient(id) => write!(f, "unknown patient: {id}"),
            Self::UnknownPatientGroup(code) => write!(f, "unknown patient group: {code}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(what) => Self::NotFound(what),
            other => Self::Repo(other),
        }
    }
}

/// Record prepared for an edit screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile<T> {
    pub key: String,
    pub record: T,
    /// CPF with the `XXX.XXX.XXX-XX` mask applied.
    pub formatted_cpf: String,
    /// Credential active flag, falling back to the record's own flag.
    pub active: bool,
}
