//! File-handling rules
//!
//! A rule maps a file pattern to an ordered loader pipeline. Loader names are
//! opaque tokens: nothing here checks that a named loader exists.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ConfigurationError;

/// A file-matching condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Regular expression tested against the file path
    Regex(String),
    /// Directory prefix, compared component-wise
    Path(String),
}

impl Condition {
    pub fn regex(source: impl Into<String>) -> Self {
        Condition::Regex(source.into())
    }

    pub fn path(prefix: impl Into<String>) -> Self {
        Condition::Path(prefix.into())
    }

    /// Anchored match on a file extension, e.g. `suffix("html")` → `\.html$`
    pub fn suffix(extension: &str) -> Self {
        Condition::Regex(format!(r"\.{}$", regex_lite::escape(extension)))
    }

    /// Test a file path against this condition
    pub fn matches(&self, file: &str) -> Result<bool, ConfigurationError> {
        match self {
            Condition::Regex(source) => {
                let re = Regex::new(source).map_err(|e| ConfigurationError::InvalidPattern {
                    pattern: source.clone(),
                    message: e.to_string(),
                })?;
                Ok(re.is_match(file))
            }
            Condition::Path(prefix) => {
                let file = file.strip_prefix("./").unwrap_or(file);
                let prefix = prefix.strip_prefix("./").unwrap_or(prefix);
                Ok(Path::new(file).starts_with(prefix))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Condition::Regex(source) => format!("/{}/", source),
            Condition::Path(prefix) => format!("path {}", prefix),
        }
    }
}

/// One step of a loader pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseEntry {
    pub loader: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl UseEntry {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: Map::new(),
        }
    }
}

/// Loader ordering category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    Pre,
    Post,
}

/// Built-in asset module handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    /// Inline below the size threshold, emit a file above it
    #[serde(rename = "asset")]
    Auto,
    #[serde(rename = "asset/resource")]
    Resource,
    #[serde(rename = "asset/inline")]
    Inline,
    #[serde(rename = "asset/source")]
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUrlCondition {
    /// Inline threshold in bytes
    pub max_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetParser {
    pub data_url_condition: DataUrlCondition,
}

/// A file pattern mapped to a processing pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Files this rule applies to
    pub test: Condition,

    /// Loader pipeline, in declaration order
    #[serde(rename = "use", default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<UseEntry>,

    /// Only files matching this condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Condition>,

    /// Never files matching this condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<AssetParser>,
}

impl Rule {
    pub fn new(test: Condition) -> Self {
        Self {
            test,
            uses: Vec::new(),
            include: None,
            exclude: None,
            enforce: None,
            asset_type: None,
            parser: None,
        }
    }

    /// Append a loader to the pipeline
    pub fn loader(mut self, name: impl Into<String>) -> Self {
        self.uses.push(UseEntry::new(name));
        self
    }

    /// Append a loader with options to the pipeline
    pub fn loader_with_options(mut self, name: impl Into<String>, options: Map<String, Value>) -> Self {
        self.uses.push(UseEntry {
            loader: name.into(),
            options,
        });
        self
    }

    pub fn include(mut self, condition: Condition) -> Self {
        self.include = Some(condition);
        self
    }

    pub fn exclude(mut self, condition: Condition) -> Self {
        self.exclude = Some(condition);
        self
    }

    pub fn enforce(mut self, enforce: Enforce) -> Self {
        self.enforce = Some(enforce);
        self
    }

    /// Handle matched files as asset modules, inlining those under `inline_limit` bytes
    pub fn asset(mut self, asset_type: AssetType, inline_limit: Option<u64>) -> Self {
        self.asset_type = Some(asset_type);
        self.parser = inline_limit.map(|max_size| AssetParser {
            data_url_condition: DataUrlCondition { max_size },
        });
        self
    }

    pub fn loader_names(&self) -> Vec<&str> {
        self.uses.iter().map(|u| u.loader.as_str()).collect()
    }

    /// Whether this rule handles `file`: test matches, include admits, exclude does not
    pub fn applies_to(&self, file: &str) -> Result<bool, ConfigurationError> {
        if !self.test.matches(file)? {
            return Ok(false);
        }
        if let Some(ref include) = self.include {
            if !include.matches(file)? {
                return Ok(false);
            }
        }
        if let Some(ref exclude) = self.exclude {
            if exclude.matches(file)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
