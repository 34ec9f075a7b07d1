//! Mode-specific overlays
//!
//! Each overlay is a partial configuration merged onto the base. Exactly one
//! overlay is applied per resolution; overlays are never merged with each other.

mod mode;

pub use mode::Mode;

use serde_json::{json, Map};

use crate::model::{Condition, Configuration, Plugin, Rule};

/// Source map style for development builds
pub const DEVELOPMENT_DEVTOOL: &str = "eval-cheap-module-source-map";

/// Source map style for production builds
pub const PRODUCTION_DEVTOOL: &str = "cheap-module-source-map";

/// Extracted stylesheet naming for production builds
pub const CSS_FILENAME: &str = "css/[name].[contenthash:8].css";

/// Chunk name for code pulled from third-party dependencies
pub const VENDOR_CHUNK: &str = "vendors";

/// Package name of the bundle report plugin
pub const DIAGNOSTIC_PLUGIN: &str = "webpack-bundle-analyzer";

/// A partial configuration bound to the mode it serves
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    mode: Mode,
    tree: Configuration,
}

impl Overlay {
    pub fn new(mode: Mode, tree: Configuration) -> Self {
        Self { mode, tree }
    }

    /// The built-in overlay for `mode`
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Development => development_overlay(),
            Mode::Production => production_overlay(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tree(&self) -> &Configuration {
        &self.tree
    }
}

/// Style injection through the page, fast rebuild source maps
pub fn development_overlay() -> Overlay {
    let styles = Rule::new(Condition::regex(r"\.css"))
        .loader("style-loader")
        .loader("css-loader")
        .loader("postcss-loader");

    let mut root = Map::new();
    root.insert("module".to_string(), json!({ "rules": [styles] }));
    root.insert("devtool".to_string(), json!(DEVELOPMENT_DEVTOOL));
    root.insert("mode".to_string(), json!(Mode::Development));

    Overlay::new(Mode::Development, Configuration::from_map(root))
}

/// Extracted and minimized stylesheets, a single runtime chunk, and a shared
/// vendor chunk
pub fn production_overlay() -> Overlay {
    let styles = Rule::new(Condition::suffix("css"))
        .loader("mini-css-extract-plugin")
        .loader("css-loader")
        .loader("postcss-loader");

    let plugins = vec![
        Plugin::new("mini-css-extract-plugin").with_option("filename", CSS_FILENAME),
        Plugin::new("css-minimizer-webpack-plugin"),
    ];

    let mut root = Map::new();
    root.insert("output".to_string(), json!({ "clean": true }));
    root.insert("module".to_string(), json!({ "rules": [styles] }));
    root.insert("plugins".to_string(), json!(plugins));
    root.insert(
        "optimization".to_string(),
        json!({
            "runtimeChunk": "single",
            "splitChunks": {
                "chunks": "all",
                "cacheGroups": {
                    "vendor": {
                        "test": Condition::regex(r"[\\/]node_modules[\\/]"),
                        "name": VENDOR_CHUNK
                    }
                }
            }
        }),
    );
    root.insert("devtool".to_string(), json!(PRODUCTION_DEVTOOL));
    root.insert("mode".to_string(), json!(Mode::Production));

    Overlay::new(Mode::Production, Configuration::from_map(root))
}

/// Bundle composition report, appended to production builds on request
pub fn diagnostic_plugin() -> Plugin {
    Plugin::new(DIAGNOSTIC_PLUGIN)
}
