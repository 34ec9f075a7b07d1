//! The configuration tree

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Plugin, Rule};
use crate::error::ConfigurationError;
use packcfg_merge::{merge_maps, ArrayPolicy, ValueKind};

/// Tree-shaped build description: string keys mapping to scalars, arrays or
/// nested objects. Compared structurally.
///
/// Every operation returns a new value; a `Configuration` is never modified
/// after it has been produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    /// Empty configuration
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value; the root must be an object
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConfigurationError::NotAnObject(ValueKind::of(&other))),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a value by path (dot-separated; numeric parts index into arrays)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }

    /// Typed view of `module.rules` (empty when absent)
    pub fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        match self.get("module.rules") {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Typed view of `plugins` (empty when absent)
    pub fn plugins(&self) -> Result<Vec<Plugin>, ConfigurationError> {
        match self.get("plugins") {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Return a copy with `plugin` appended to the plugin sequence
    pub fn with_plugin(&self, plugin: &Plugin) -> Self {
        let mut addition = Map::new();
        addition.insert("plugins".to_string(), serde_json::json!([plugin]));
        let (map, _) = merge_maps(&self.0, &addition, ArrayPolicy::Concat);
        Self(map)
    }

    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl TryFrom<Value> for Configuration {
    type Error = ConfigurationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
