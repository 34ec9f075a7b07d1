//! Built-in settings (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuiltinSettings {
    /// Append the bundle report plugin in production (default: false)
    pub report: bool,

    /// Single-line JSON output (default: false)
    pub compact: bool,

    /// Print the resolved envelope instead of the bare configuration (default: false)
    pub envelope: bool,
}

impl BuiltinSettings {
    /// Convert to JSON Value for merging.
    ///
    /// No default mode exists, so `mode` is never set here.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "report": self.report,
            "output": {
                "compact": self.compact,
                "envelope": self.envelope
            }
        })
    }
}
