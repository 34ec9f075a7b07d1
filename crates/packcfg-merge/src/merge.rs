//! Merge logic
//!
//! Arrays are matched before the scalar override so that two sequences at the
//! same key path are never silently replaced under [`ArrayPolicy::Concat`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ValueKind;

/// How two arrays at the same key path are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayPolicy {
    /// Base elements followed by overlay elements, order preserved, no dedup
    #[default]
    Concat,
    /// Overlay array wins entirely
    Replace,
}

/// Two values at the same key path whose kinds cannot be merged structurally.
///
/// This is a diagnostic, not a failure: the overlay value is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("type mismatch at `{}`: {base} merged with {overlay}, overlay value used", display_path(.path))]
pub struct MergeTypeMismatch {
    /// Dot-separated key path ("" for the root)
    pub path: String,

    /// Kind of the base value
    pub base: ValueKind,

    /// Kind of the overlay value
    pub overlay: ValueKind,
}

/// Result of a merge: the new tree plus any mismatch diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub value: Value,
    pub mismatches: Vec<MergeTypeMismatch>,
}

impl Merged {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Merge `overlay` onto `base`, returning a fresh tree.
///
/// Merge semantics:
/// - Key only in overlay: copied unchanged
/// - Key only in base: retained unchanged
/// - Both arrays: combined per `policy`
/// - Both objects: recurse
/// - Anything else: overlay wins (mismatched container kinds are reported)
pub fn merge(base: &Value, overlay: &Value, policy: ArrayPolicy) -> Merged {
    let mut mismatches = Vec::new();
    let value = merge_at(base, overlay, policy, "", &mut mismatches);
    Merged { value, mismatches }
}

/// Merge two objects key by key; the result is always an object.
pub fn merge_maps(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
    policy: ArrayPolicy,
) -> (Map<String, Value>, Vec<MergeTypeMismatch>) {
    let mut mismatches = Vec::new();
    let map = merge_entries(base, overlay, policy, "", &mut mismatches);
    (map, mismatches)
}

/// Owned convenience form of [`merge`] with [`ArrayPolicy::Concat`].
///
/// Diagnostics are still logged but not returned.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    merge(&base, &overlay, ArrayPolicy::Concat).value
}

/// Merge multiple layers in order (first is base, last has highest precedence).
///
/// An empty list yields `Value::Null`.
pub fn merge_layers(layers: Vec<Value>, policy: ArrayPolicy) -> Merged {
    let mut layers = layers.into_iter();
    let mut acc = Merged {
        value: layers.next().unwrap_or(Value::Null),
        mismatches: Vec::new(),
    };

    for layer in layers {
        let next = merge(&acc.value, &layer, policy);
        acc.value = next.value;
        acc.mismatches.extend(next.mismatches);
    }

    acc
}

fn merge_at(
    base: &Value,
    overlay: &Value,
    policy: ArrayPolicy,
    path: &str,
    mismatches: &mut Vec<MergeTypeMismatch>,
) -> Value {
    match (base, overlay) {
        (Value::Array(base_items), Value::Array(overlay_items)) => match policy {
            ArrayPolicy::Concat => Value::Array(
                base_items
                    .iter()
                    .chain(overlay_items.iter())
                    .cloned()
                    .collect(),
            ),
            ArrayPolicy::Replace => overlay.clone(),
        },

        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_entries(base_map, overlay_map, policy, path, mismatches))
        }

        _ => {
            let base_kind = ValueKind::of(base);
            let overlay_kind = ValueKind::of(overlay);
            if base_kind != overlay_kind && (base_kind.is_container() || overlay_kind.is_container())
            {
                let mismatch = MergeTypeMismatch {
                    path: path.to_string(),
                    base: base_kind,
                    overlay: overlay_kind,
                };
                tracing::warn!(path = %display_path(path), %base_kind, %overlay_kind, "{}", mismatch);
                mismatches.push(mismatch);
            }
            overlay.clone()
        }
    }
}

fn merge_entries(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
    policy: ArrayPolicy,
    path: &str,
    mismatches: &mut Vec<MergeTypeMismatch>,
) -> Map<String, Value> {
    let mut result = base.clone();
    for (key, overlay_value) in overlay {
        let child_path = join_path(path, key);
        let merged = match base.get(key) {
            Some(base_value) => merge_at(base_value, overlay_value, policy, &child_path, mismatches),
            None => overlay_value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"devtool": "source-map"});
        let overlay = json!({"devtool": "eval"});
        let result = merge(&base, &overlay, ArrayPolicy::Concat);
        assert_eq!(result.value["devtool"], "eval");
        assert!(result.is_clean());
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "output": {
                "filename": "js/[name].js",
                "path": "dist"
            }
        });
        let overlay = json!({
            "output": {
                "clean": true
            }
        });
        let result = merge(&base, &overlay, ArrayPolicy::Concat).value;

        assert_eq!(result["output"]["filename"], "js/[name].js");
        assert_eq!(result["output"]["path"], "dist");
        assert_eq!(result["output"]["clean"], true);
    }

    #[test]
    fn test_array_concat_preserves_order() {
        let base = json!({"rules": ["R1", "R2"]});
        let overlay = json!({"rules": ["R3"]});
        let result = merge(&base, &overlay, ArrayPolicy::Concat).value;

        assert_eq!(result["rules"], json!(["R1", "R2", "R3"]));
    }

    #[test]
    fn test_array_concat_keeps_duplicates() {
        let base = json!({"use": ["css-loader"]});
        let overlay = json!({"use": ["css-loader"]});
        let result = merge(&base, &overlay, ArrayPolicy::Concat).value;

        assert_eq!(result["use"], json!(["css-loader", "css-loader"]));
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"extensions": [".js", ".json", ".wasm"]});
        let overlay = json!({"extensions": [".ts"]});
        let result = merge(&base, &overlay, ArrayPolicy::Replace).value;

        assert_eq!(result["extensions"], json!([".ts"]));
    }

    #[test]
    fn test_nested_arrays_concat() {
        let base = json!({"module": {"rules": [{"test": "html"}]}});
        let overlay = json!({"module": {"rules": [{"test": "css"}]}});
        let result = merge(&base, &overlay, ArrayPolicy::Concat).value;

        let rules = result["module"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["test"], "html");
        assert_eq!(rules[1]["test"], "css");
    }

    #[test]
    fn test_keys_from_both_sides() {
        let base = json!({"a": 1});
        let overlay = json!({"b": 2});
        let result = merge(&base, &overlay, ArrayPolicy::Concat).value;

        assert_eq!(result, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_not_commutative() {
        let base = json!({"x": 1});
        let overlay = json!({"x": 2});

        assert_eq!(merge(&base, &overlay, ArrayPolicy::Concat).value, json!({"x": 2}));
        assert_eq!(merge(&overlay, &base, ArrayPolicy::Concat).value, json!({"x": 1}));
    }

    #[test]
    fn test_inputs_unchanged() {
        let base = json!({"rules": [1], "output": {"path": "dist"}});
        let overlay = json!({"rules": [2], "output": {"clean": true}});
        let base_before = base.clone();
        let overlay_before = overlay.clone();

        let _ = merge(&base, &overlay, ArrayPolicy::Concat);

        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn test_mismatch_array_vs_scalar_reported() {
        let base = json!({"module": {"rules": ["R1"]}});
        let overlay = json!({"module": {"rules": "none"}});
        let result = merge(&base, &overlay, ArrayPolicy::Concat);

        assert_eq!(result.value["module"]["rules"], "none");
        assert_eq!(
            result.mismatches,
            vec![MergeTypeMismatch {
                path: "module.rules".to_string(),
                base: ValueKind::Array,
                overlay: ValueKind::String,
            }]
        );
    }

    #[test]
    fn test_mismatch_object_vs_array_reported() {
        let base = json!({"optimization": {"minimize": true}});
        let overlay = json!({"optimization": [1]});
        let result = merge(&base, &overlay, ArrayPolicy::Concat);

        assert_eq!(result.value["optimization"], json!([1]));
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].base, ValueKind::Object);
        assert_eq!(result.mismatches[0].overlay, ValueKind::Array);
    }

    #[test]
    fn test_scalar_kind_change_not_reported() {
        let base = json!({"devtool": false});
        let overlay = json!({"devtool": "eval"});
        let result = merge(&base, &overlay, ArrayPolicy::Concat);

        assert_eq!(result.value["devtool"], "eval");
        assert!(result.is_clean());
    }

    #[test]
    fn test_mismatch_message() {
        let mismatch = MergeTypeMismatch {
            path: "plugins".to_string(),
            base: ValueKind::Array,
            overlay: ValueKind::Null,
        };
        assert_eq!(
            mismatch.to_string(),
            "type mismatch at `plugins`: array merged with null, overlay value used"
        );

        let root = MergeTypeMismatch {
            path: String::new(),
            base: ValueKind::Object,
            overlay: ValueKind::Number,
        };
        assert!(root.to_string().contains("`<root>`"));
    }

    #[test]
    fn test_merge_maps() {
        let base = json!({"plugins": ["html"], "entry": "./src/index.js"});
        let overlay = json!({"plugins": ["analyzer"]});
        let (map, mismatches) = merge_maps(
            base.as_object().unwrap(),
            overlay.as_object().unwrap(),
            ArrayPolicy::Concat,
        );

        assert_eq!(map["plugins"], json!(["html", "analyzer"]));
        assert_eq!(map["entry"], "./src/index.js");
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_deep_merge_owned() {
        let result = deep_merge(json!({"plugins": ["a"]}), json!({"plugins": ["b"]}));
        assert_eq!(result["plugins"], json!(["a", "b"]));
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({
            "report": false,
            "output": {"compact": false}
        });
        let file = json!({
            "report": true
        });
        let cli = json!({
            "output": {"compact": true}
        });

        let result = merge_layers(vec![builtin, file, cli], ArrayPolicy::Replace);

        assert_eq!(result.value["report"], true);
        assert_eq!(result.value["output"]["compact"], true);
        assert!(result.is_clean());
    }

    #[test]
    fn test_merge_layers_empty() {
        let result = merge_layers(Vec::new(), ArrayPolicy::Concat);
        assert!(result.value.is_null());
    }
}
