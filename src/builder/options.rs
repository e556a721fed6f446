//! Loadable machine options.

use crate::core::DEFAULT_HISTORY_TABLE;
use serde::{Deserialize, Serialize};

/// Settings that can be supplied from configuration instead of code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Table history records are written to.
    pub history_table: String,
}

impl MachineOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            history_table: DEFAULT_HISTORY_TABLE.to_string(),
        }
    }
}
