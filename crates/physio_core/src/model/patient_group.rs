//! Patient group labels stored at `grupos_pacientes/<code>`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientGroup {
    #[serde(rename = "descricao")]
    pub description: String,
}
