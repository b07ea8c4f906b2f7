//! Personal data shared by physiotherapist and patient records.

use super::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "m")]
    Male,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "sexo")]
    pub sex: Sex,
    /// CPF digits only.
    pub cpf: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "cep")]
    pub postal_code: String,
    #[serde(rename = "dataNascimento")]
    pub birth_date: Timestamp,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
