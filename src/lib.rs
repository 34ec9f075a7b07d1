//! packcfg - mode-aware bundler configuration resolver
//!
//! Builds a mode-independent base configuration, merges exactly one
//! mode-specific overlay onto it, and hands the result to an external build
//! engine. Loaders and plugins are referenced by name only; nothing here runs
//! them or touches the files they would process.

pub mod base;
pub mod error;
pub mod explain;
pub mod model;
pub mod overlay;
pub mod resolve;
pub mod settings;

pub use base::build_base;
pub use error::ConfigurationError;
pub use explain::{explain, Explanation, RuleMatch};
pub use model::{Condition, Configuration, Plugin, Rule, UseEntry};
pub use overlay::{Mode, Overlay};
pub use packcfg_merge::MergeTypeMismatch;
pub use resolve::{merge, resolve, resolve_named, OverlayMerge, ResolveOptions, ResolvedConfig};
pub use settings::{EffectiveSettings, Settings, SettingsError};
