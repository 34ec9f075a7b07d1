//! Mode-independent base configuration
//!
//! The base declares the entry point, hashed output naming, the file-type
//! rules shared by every mode, and the HTML page plugin.
//!
//! No path is validated here. A missing entry file or template is passed
//! through unchanged and only surfaces when the external engine runs.

use serde_json::{json, Map};

use crate::model::{AssetType, Condition, Configuration, Enforce, Plugin, Rule};

/// Single application entry point
pub const ENTRY: &str = "./src/index.js";

/// Output directory
pub const OUTPUT_PATH: &str = "dist";

/// Script bundle naming; the chunk hash changes whenever chunk content changes
pub const OUTPUT_FILENAME: &str = "js/[name].[chunkhash:8].js";

/// Naming for emitted asset files
pub const ASSET_MODULE_FILENAME: &str = "img/[name].[hash:8][ext]";

/// Images at or under this size (bytes) are inlined as data URLs
pub const INLINE_LIMIT_BYTES: u64 = 10 * 1024;

/// Source directory linted before transpilation
pub const SOURCE_DIR: &str = "src";

/// HTML template compiled into the output page
pub const HTML_TEMPLATE: &str = "index.html";

/// Output page filename
pub const HTML_FILENAME: &str = "index.html";

/// The shared rules, in evaluation order
pub fn base_rules() -> Vec<Rule> {
    let mut lint_options = Map::new();
    lint_options.insert("formatter".to_string(), "eslint-friendly-formatter".into());

    vec![
        Rule::new(Condition::suffix("html")).loader("html-loader"),
        Rule::new(Condition::suffix("js"))
            .loader("babel-loader")
            .exclude(Condition::regex("node_modules")),
        Rule::new(Condition::suffix("js"))
            .loader_with_options("eslint-loader", lint_options)
            .enforce(Enforce::Pre)
            .include(Condition::path(SOURCE_DIR)),
        Rule::new(Condition::regex(r"\.(png|svg|jpe?g|gif)$"))
            .asset(AssetType::Auto, Some(INLINE_LIMIT_BYTES)),
    ]
}

/// The shared plugins, in instantiation order
pub fn base_plugins() -> Vec<Plugin> {
    vec![Plugin::new("html-webpack-plugin")
        .with_option("template", HTML_TEMPLATE)
        .with_option("filename", HTML_FILENAME)]
}

/// Build the base configuration.
///
/// Pure and deterministic: every call yields a structurally identical tree.
pub fn build_base() -> Configuration {
    let mut root = Map::new();
    root.insert("entry".to_string(), json!(ENTRY));
    root.insert(
        "output".to_string(),
        json!({
            "filename": OUTPUT_FILENAME,
            "path": OUTPUT_PATH,
            "assetModuleFilename": ASSET_MODULE_FILENAME,
            // Emitted runtime code avoids arrow functions
            "environment": { "arrowFunction": false }
        }),
    );
    root.insert("module".to_string(), json!({ "rules": base_rules() }));
    root.insert("plugins".to_string(), json!(base_plugins()));
    Configuration::from_map(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_base_idempotent() {
        assert_eq!(build_base(), build_base());
    }

    #[test]
    fn test_entry_and_output() {
        let base = build_base();
        assert_eq!(base.get_str("entry"), Some("./src/index.js"));
        assert_eq!(base.get_str("output.filename"), Some("js/[name].[chunkhash:8].js"));
        assert_eq!(base.get_str("output.path"), Some("dist"));
        assert_eq!(
            base.get_str("output.assetModuleFilename"),
            Some("img/[name].[hash:8][ext]")
        );
        assert_eq!(base.get_bool("output.environment.arrowFunction"), Some(false));
        assert!(base.get("output.clean").is_none());
    }

    #[test]
    fn test_output_filename_carries_hash_placeholder() {
        let base = build_base();
        assert!(base.get_str("output.filename").unwrap().contains("hash"));
        assert!(base.get_str("output.assetModuleFilename").unwrap().contains("[hash:8]"));
    }

    #[test]
    fn test_rule_order() {
        let rules = build_base().rules().unwrap();
        let loaders: Vec<Vec<&str>> = rules.iter().map(|r| r.loader_names()).collect();
        assert_eq!(
            loaders,
            vec![
                vec!["html-loader"],
                vec!["babel-loader"],
                vec!["eslint-loader"],
                vec![],
            ]
        );
    }

    #[test]
    fn test_script_rules() {
        let rules = base_rules();
        assert_eq!(rules[1].exclude, Some(Condition::regex("node_modules")));
        assert_eq!(rules[2].enforce, Some(Enforce::Pre));
        assert_eq!(rules[2].include, Some(Condition::path("src")));
        assert_eq!(rules[2].uses[0].options["formatter"], "eslint-friendly-formatter");
    }

    #[test]
    fn test_image_rule_inlines_under_threshold() {
        let rules = base_rules();
        let image = &rules[3];
        assert_eq!(image.asset_type, Some(AssetType::Auto));
        assert_eq!(image.parser.unwrap().data_url_condition.max_size, 10240);
        for file in ["logo.png", "icon.svg", "photo.jpeg", "photo.jpg", "anim.gif"] {
            assert!(image.applies_to(file).unwrap(), "{file} should be an image");
        }
        assert!(!image.applies_to("notes.txt").unwrap());
    }

    #[test]
    fn test_html_plugin() {
        let plugins = build_base().plugins().unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name, "html-webpack-plugin");
        assert_eq!(plugins[0].options["template"], "index.html");
        assert_eq!(plugins[0].options["filename"], "index.html");
    }
}
