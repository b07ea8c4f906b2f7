//! Patient record stored at `pacientes/<key>`.

use super::person::PersonalData;
use serde::{Deserialize, Serialize};

/// Stored field holding the responsible physiotherapist key.
pub const RESPONSIBLE_FIELD: &str = "responsavel";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(flatten)]
    pub personal: PersonalData,
    /// Key of the responsible physiotherapist.
    #[serde(rename = "responsavel")]
    pub responsible: String,
    /// Optional patient group code.
    #[serde(rename = "grupo", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}
