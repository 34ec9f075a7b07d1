//! Configuration data model
//!
//! A [`Configuration`] is a JSON object tree handed to the external build
//! engine. [`Rule`] and [`Plugin`] are the typed entries that appear under
//! `module.rules` and `plugins`.

mod configuration;
mod plugin;
mod rule;

pub use configuration::Configuration;
pub use plugin::Plugin;
pub use rule::{AssetParser, AssetType, Condition, DataUrlCondition, Enforce, Rule, UseEntry};
