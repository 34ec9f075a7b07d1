//! Mode selection and overlay merging
//!
//! `resolve` builds the base, picks the overlay for the requested mode, merges
//! it, and wraps the result in a [`ResolvedConfig`] envelope carrying the mode,
//! any merge diagnostics, and a content digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use crate::base::build_base;
use crate::error::ConfigurationError;
use crate::model::Configuration;
use crate::overlay::{diagnostic_plugin, Mode, Overlay};
use packcfg_merge::{merge_maps, ArrayPolicy, MergeTypeMismatch};

/// Schema version for the resolved envelope
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "packcfg/resolved_config@1";

/// Per-invocation inputs besides the mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Append the bundle report plugin (production only)
    pub report: bool,
}

/// Result of merging one overlay onto a base
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMerge {
    pub config: Configuration,
    pub mismatches: Vec<MergeTypeMismatch>,
    /// Whether the diagnostic plugin was appended
    pub report_applied: bool,
}

/// Merge `overlay` onto `base`.
///
/// Arrays concatenate (base first), objects recurse, everything else takes the
/// overlay value. Neither input is modified. When `report` is set and the
/// overlay is for production, the diagnostic plugin is appended after the merge;
/// this flag is the only input that changes the result beyond the two trees.
pub fn merge(base: &Configuration, overlay: &Overlay, report: bool) -> OverlayMerge {
    let (map, mismatches) = merge_maps(base.as_map(), overlay.tree().as_map(), ArrayPolicy::Concat);
    let mut config = Configuration::from_map(map);

    let report_applied = report && overlay.mode() == Mode::Production;
    if report_applied {
        config = config.with_plugin(&diagnostic_plugin());
    } else if report {
        tracing::debug!(mode = %overlay.mode(), "report requested outside production; ignored");
    }

    OverlayMerge {
        config,
        mismatches,
        report_applied,
    }
}

/// Resolve the final configuration for `mode`
pub fn resolve(mode: Mode, options: ResolveOptions) -> Result<ResolvedConfig, ConfigurationError> {
    tracing::debug!(%mode, report = options.report, "resolving configuration");

    let base = build_base();
    let overlay = Overlay::for_mode(mode);
    let merged = merge(&base, &overlay, options.report);

    ResolvedConfig::new(mode, merged)
}

/// Resolve from a mode name; unknown names fail before anything is built
pub fn resolve_named(mode: &str, options: ResolveOptions) -> Result<ResolvedConfig, ConfigurationError> {
    let mode: Mode = mode.parse()?;
    resolve(mode, options)
}

/// The final configuration with the context it was produced in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Mode whose overlay was merged
    pub mode: Mode,

    /// Whether the diagnostic plugin is present
    pub report: bool,

    /// SHA-256 of the canonical JSON (RFC 8785) of `config`
    pub digest: String,

    /// Merge diagnostics, in the order encountered
    #[serde(default)]
    pub warnings: Vec<MergeTypeMismatch>,

    /// The configuration handed to the build engine
    pub config: Configuration,
}

impl ResolvedConfig {
    fn new(mode: Mode, merged: OverlayMerge) -> Result<Self, ConfigurationError> {
        let digest = Self::compute_digest(&merged.config)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            mode,
            report: merged.report_applied,
            digest,
            warnings: merged.mismatches,
            config: merged.config,
        })
    }

    /// SHA-256 hex digest of JCS(config)
    pub fn compute_digest(config: &Configuration) -> Result<String, ConfigurationError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(config)
            .map_err(|e| ConfigurationError::Canonicalize(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&serde_json::Value> {
        self.config.get(path)
    }

    /// Serialize the whole envelope to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the envelope to a file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}
