//! Effective settings with provenance
//!
//! Layers are merged with array replacement, unlike build configurations,
//! where arrays concatenate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinSettings;
use packcfg_merge::{merge_layers, ArrayPolicy};

/// Settings file looked up in the working directory
pub const DEFAULT_FILE: &str = "packcfg.toml";

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    /// Origin of this layer
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Output options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    /// Single-line JSON
    #[serde(default)]
    pub compact: bool,

    /// Print the resolved envelope instead of the bare configuration
    #[serde(default)]
    pub envelope: bool,

    /// Write to this file instead of stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Merged settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Mode used when none is given on the command line or in the environment.
    /// Kept as text; it is checked when the configuration is resolved.
    #[serde(default)]
    pub mode: Option<String>,

    /// Append the bundle report plugin in production
    #[serde(default)]
    pub report: bool,

    #[serde(default)]
    pub output: OutputSettings,
}

/// Effective settings plus the layers that produced them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub settings: Settings,

    /// Contributing layers in precedence order
    pub sources: Vec<SettingsSource>,
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Locate the settings file.
///
/// An explicit path must exist. Otherwise `packcfg.toml` in `dir` is used when
/// present, and no file is fine.
pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Option<PathBuf>, SettingsError> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(SettingsError::NotFound(path.display().to_string())),
        None => {
            let candidate = dir.join(DEFAULT_FILE);
            Ok(candidate.is_file().then_some(candidate))
        }
    }
}

impl EffectiveSettings {
    /// Build effective settings from layers
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinSettings::default().to_value());
        sources.push(SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Settings file
        if let Some(path) = settings_path {
            let (value, digest) = Self::load_toml_file(path)?;
            tracing::debug!(path = %path.display(), %digest, "loaded settings file");
            layers.push(value);
            sources.push(SettingsSource {
                origin: SettingsOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        // Layer 3: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers, ArrayPolicy::Replace);
        if let Some(mismatch) = merged.mismatches.first() {
            return Err(SettingsError::ValidationError(mismatch.to_string()));
        }

        let settings: Settings = serde_json::from_value(merged.value)
            .map_err(|e| SettingsError::ParseError(e.to_string()))?;
        Self::validate(&settings)?;

        Ok(Self { settings, sources })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
        let bytes = fs::read(path).map_err(|e| SettingsError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| SettingsError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => Value::Array(arr.into_iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    fn validate(settings: &Settings) -> Result<(), SettingsError> {
        if let Some(ref mode) = settings.mode {
            if mode.trim().is_empty() {
                return Err(SettingsError::ValidationError(
                    "'mode' must not be empty".to_string(),
                ));
            }
        }

        if let Some(ref file) = settings.output.file {
            if file.as_os_str().is_empty() {
                return Err(SettingsError::ValidationError(
                    "'output.file' must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
