//! Credential ("auth base") records keyed by CPF.

use serde::{Deserialize, Serialize};

/// Which kind of professional/patient record a credential points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    #[serde(rename = "F")]
    Physiotherapist,
    #[serde(rename = "P")]
    Patient,
}

/// Credential record stored at `users/<cpf>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Key of the linked physiotherapist or patient record.
    pub id: String,
    pub email: String,
    /// Usually blank; sign-in is not handled by this crate.
    #[serde(rename = "senha", default)]
    pub password: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: UserKind,
    #[serde(rename = "ativo")]
    pub active: bool,
}

impl UserRecord {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        kind: UserKind,
        active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password: String::new(),
            name: name.into(),
            kind,
            active,
        }
    }
}
