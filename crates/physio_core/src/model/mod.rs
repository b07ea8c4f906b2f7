//! Clinic record models and their stored JSON shape.
//!
//! # Responsibility
//! - Define typed records for credentials, physiotherapists, patients,
//!   evaluations and patient groups.
//! - Pin the stored field names, which are shared with existing data.
//!
//! # Invariants
//! - Records carry no key of their own; keys live in the tree path and are
//!   surfaced through `Keyed<T>`.
//! - Foreign keys (`responsible`, evaluated patient) are plain strings.

pub mod evaluation;
pub mod patient;
pub mod patient_group;
pub mod person;
pub mod physiotherapist;
pub mod timestamp;
pub mod user;

/// Record together with the tree key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    pub key: String,
    pub record: T,
}

impl<T> Keyed<T> {
    pub fn new(key: impl Into<String>, record: T) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }
}
