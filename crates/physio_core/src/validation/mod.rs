//! Field-level validation for registration forms.
//!
//! # Responsibility
//! - CPF checksum, masking and normalization.
//! - Email syntax check and birth date parsing.
//! - Ordered form validation producing the first failing field.

pub mod cpf;
pub mod date;
pub mod email;
pub mod form;
