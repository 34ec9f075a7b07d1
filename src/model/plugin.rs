//! Plugin declarations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A plugin the external engine should instantiate, referenced by package name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Plugin package name (opaque to this crate)
    pub name: String,

    /// Constructor options
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_without_options() {
        let value = serde_json::to_value(Plugin::new("css-minimizer-webpack-plugin")).unwrap();
        assert_eq!(value, json!({"name": "css-minimizer-webpack-plugin"}));
    }

    #[test]
    fn test_serialize_with_options() {
        let plugin = Plugin::new("html-webpack-plugin")
            .with_option("template", "index.html")
            .with_option("filename", "index.html");
        let value = serde_json::to_value(plugin).unwrap();
        assert_eq!(value["options"]["template"], "index.html");
        assert_eq!(value["options"]["filename"], "index.html");
    }
}
