//! Physiotherapist record stored at `fisioterapeutas/<key>`.

use super::person::PersonalData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physiotherapist {
    #[serde(flatten)]
    pub personal: PersonalData,
}
