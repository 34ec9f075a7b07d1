//! Explain which rules handle a file
//!
//! Walks `module.rules` in order and reports every rule whose test matches
//! the path and whose include/exclude filters admit it, along with the order
//! the engine runs the combined loaders in.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::{AssetType, Configuration, Enforce, Rule};

/// One rule that applies to the explained file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Position in `module.rules`
    pub index: usize,

    /// Human-readable form of the rule's test
    pub test: String,

    /// Loader names in declaration order
    pub loaders: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
}

/// Explain output for a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// The file path that was explained
    pub file: String,

    /// Matching rules, in rule order
    pub matched: Vec<RuleMatch>,

    /// Loaders in the order they run: pre rules, then normal, then post, each
    /// rule's chain applied right to left
    pub execution_order: Vec<String>,

    /// Human-readable explanation
    pub explanation: String,
}

impl Explanation {
    /// Whether any rule handles the file
    pub fn is_handled(&self) -> bool {
        !self.matched.is_empty()
    }

    pub fn to_human(&self) -> String {
        self.explanation.clone()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn generate_explanation(file: &str, matched: &[RuleMatch], execution_order: &[String]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("File: {}", file));
        lines.push(String::new());

        if matched.is_empty() {
            lines.push("No rule matches this file.".to_string());
            return lines.join("\n");
        }

        lines.push(format!("Matching rules ({}):", matched.len()));
        for m in matched {
            let mut line = format!("  [{}] {}", m.index, m.test);
            if let Some(enforce) = m.enforce {
                line.push_str(match enforce {
                    Enforce::Pre => " (pre)",
                    Enforce::Post => " (post)",
                });
            }
            if !m.loaders.is_empty() {
                line.push_str(&format!(" -> {}", m.loaders.join(", ")));
            }
            if let Some(asset_type) = m.asset_type {
                line.push_str(&format!(" -> {}", asset_type_name(asset_type)));
            }
            lines.push(line);
        }

        if !execution_order.is_empty() {
            lines.push(String::new());
            lines.push(format!("Loader execution: {}", execution_order.join(" -> ")));
        }

        lines.join("\n")
    }
}

/// Explain how `config` handles `file`
pub fn explain(config: &Configuration, file: &str) -> Result<Explanation, ConfigurationError> {
    let rules = config.rules()?;

    let mut matched = Vec::new();
    let mut applied: Vec<&Rule> = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        if !rule.applies_to(file)? {
            continue;
        }
        matched.push(RuleMatch {
            index,
            test: rule.test.describe(),
            loaders: rule.loader_names().into_iter().map(String::from).collect(),
            enforce: rule.enforce,
            asset_type: rule.asset_type,
        });
        applied.push(rule);
    }

    let execution_order = execution_order(&applied);
    let explanation = Explanation::generate_explanation(file, &matched, &execution_order);
    tracing::debug!(file, matched = matched.len(), "explained file");

    Ok(Explanation {
        file: file.to_string(),
        matched,
        execution_order,
        explanation,
    })
}

fn execution_order(rules: &[&Rule]) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    for wanted in [Some(Enforce::Post), None, Some(Enforce::Pre)] {
        for rule in rules.iter().filter(|r| r.enforce == wanted) {
            chain.extend(rule.loader_names().into_iter().map(String::from));
        }
    }
    // The engine runs the combined chain back to front
    chain.reverse();
    chain
}

fn asset_type_name(asset_type: AssetType) -> &'static str {
    match asset_type {
        AssetType::Auto => "asset",
        AssetType::Resource => "asset/resource",
        AssetType::Inline => "asset/inline",
        AssetType::Source => "asset/source",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Mode;
    use crate::resolve::{resolve, ResolveOptions};
    use serde_json::json;

    fn config_for(mode: Mode) -> Configuration {
        resolve(mode, ResolveOptions::default()).unwrap().config
    }

    #[test]
    fn test_source_script_is_linted_then_transpiled() {
        let explanation = explain(&config_for(Mode::Development), "src/index.js").unwrap();

        let indices: Vec<usize> = explanation.matched.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(explanation.execution_order, vec!["eslint-loader", "babel-loader"]);
    }

    #[test]
    fn test_dependency_script_is_untouched() {
        let explanation =
            explain(&config_for(Mode::Production), "node_modules/lodash/index.js").unwrap();
        assert!(!explanation.is_handled());
        assert!(explanation.to_human().contains("No rule matches"));
    }

    #[test]
    fn test_stylesheet_chain_per_mode() {
        let dev = explain(&config_for(Mode::Development), "src/app.css").unwrap();
        assert_eq!(
            dev.execution_order,
            vec!["postcss-loader", "css-loader", "style-loader"]
        );

        let prod = explain(&config_for(Mode::Production), "src/app.css").unwrap();
        assert_eq!(
            prod.execution_order,
            vec!["postcss-loader", "css-loader", "mini-css-extract-plugin"]
        );
    }

    #[test]
    fn test_image_is_asset_module() {
        let explanation = explain(&config_for(Mode::Production), "src/logo.png").unwrap();
        assert_eq!(explanation.matched.len(), 1);
        assert_eq!(explanation.matched[0].asset_type, Some(AssetType::Auto));
        assert!(explanation.execution_order.is_empty());
        assert!(explanation.to_human().contains("-> asset"));
    }

    #[test]
    fn test_invalid_pattern_propagates() {
        let config = Configuration::from_value(json!({
            "module": {"rules": [{"test": {"regex": "[unclosed"}}]}
        }))
        .unwrap();
        let err = explain(&config, "a.js").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_json_output() {
        let explanation = explain(&config_for(Mode::Development), "index.html").unwrap();
        let value: serde_json::Value = serde_json::from_str(&explanation.to_json().unwrap()).unwrap();
        assert_eq!(value["file"], "index.html");
        assert_eq!(value["matched"][0]["loaders"], json!(["html-loader"]));
    }
}
