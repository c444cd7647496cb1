//! Sales representative reference data

use serde::{Deserialize, Serialize};

use super::sale::Office;

/// Sales representative. Managed from the settings screens; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rep {
    pub id: String,
    /// Display name; unique once surrounding whitespace is trimmed.
    pub name: String,
    pub office: Office,
    pub active: bool,
}
