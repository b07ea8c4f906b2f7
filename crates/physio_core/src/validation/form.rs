//! Registration form validation.
//!
//! # Invariants
//! - Fields are checked in a fixed order and only the first failure is
//!   reported, matching what a form shows next to its save button.
//! - A form that validates always converts into a storable record.

use super::cpf::{is_valid_cpf, strip_cpf};
use super::date::parse_birth_date;
use super::email::is_valid_email;
use crate::model::person::{PersonalData, Sex};
use crate::model::timestamp::Timestamp;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First failing field of a registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingName,
    MissingEmail,
    InvalidEmail,
    InvalidBirthDate,
    InvalidCpf,
    MissingAddress,
    MissingPostalCode,
    MissingResponsible,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::MissingName => "name must be filled in",
            Self::MissingEmail => "email must be filled in",
            Self::InvalidEmail => "email is invalid",
            Self::InvalidBirthDate => "birth date is invalid",
            Self::InvalidCpf => "CPF is invalid",
            Self::MissingAddress => "address must be filled in",
            Self::MissingPostalCode => "postal code must be filled in",
            Self::MissingResponsible => "responsible physiotherapist must be selected",
        };
        f.write_str(message)
    }
}

impl Error for FormError {}

/// Raw personal-data fields as typed into a registration screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonForm {
    pub name: String,
    pub email: String,
    pub sex: Sex,
    /// CPF, masked or not.
    pub cpf: String,
    pub address: String,
    pub postal_code: String,
    /// `YYYY-MM-DD` or RFC 3339 date-time.
    pub birth_date: String,
    pub active: bool,
}

impl PersonForm {
    /// Checks name, email, birth date, CPF, address and postal code in order.
    pub fn validate(&self) -> Result<(), FormError> {
        self.to_personal_data().map(|_| ())
    }

    /// Validates and normalizes the form into a storable record
    /// (trimmed text, CPF digits only, birth date at midnight UTC).
    pub fn to_personal_data(&self) -> Result<PersonalData, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(FormError::InvalidEmail);
        }

        let birth_date = parse_birth_date(&self.birth_date).ok_or(FormError::InvalidBirthDate)?;

        if !is_valid_cpf(&self.cpf) {
            return Err(FormError::InvalidCpf);
        }

        let address = self.address.trim();
        if address.is_empty() {
            return Err(FormError::MissingAddress);
        }

        let postal_code = self.postal_code.trim();
        if postal_code.is_empty() {
            return Err(FormError::MissingPostalCode);
        }

        Ok(PersonalData {
            name: name.to_string(),
            email: email.to_string(),
            sex: self.sex,
            cpf: strip_cpf(&self.cpf),
            address: address.to_string(),
            postal_code: postal_code.to_string(),
            birth_date: Timestamp::from_date(birth_date),
            active: self.active,
        })
    }
}

/// Patient registration screen: personal data plus assignment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientForm {
    pub person: PersonForm,
    /// Key of the responsible physiotherapist.
    pub responsible: String,
    pub group: Option<String>,
}

impl PatientForm {
    /// Validates personal data first, then the responsible physiotherapist.
    pub fn validate(&self) -> Result<(), FormError> {
        self.person.validate()?;
        if self.responsible.trim().is_empty() {
            return Err(FormError::MissingResponsible);
        }
        Ok(())
    }
}
