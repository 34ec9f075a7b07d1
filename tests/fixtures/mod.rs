//! Test fixtures for golden-file assertions
//!
//! Each mode has the exact configuration it must resolve to, stored as JSON
//! and compared structurally (key order is irrelevant).

use packcfg::Mode;
use std::path::{Path, PathBuf};

/// Path to the golden configuration for `mode`
pub fn golden_path(mode: Mode) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(format!("{}.json", mode))
}

/// Load the golden configuration for `mode`
pub fn load_golden(mode: Mode) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(golden_path(mode))?;
    Ok(serde_json::from_str(&content)?)
}
