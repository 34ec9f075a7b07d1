//! Tool settings
//!
//! Settings control how the CLI runs, never what a configuration contains.
//! They are merged from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Project settings file (`packcfg.toml`)
//! 3. CLI flags

mod defaults;
mod effective;

pub use defaults::BuiltinSettings;
pub use effective::{
    discover, EffectiveSettings, OutputSettings, Settings, SettingsError, SettingsOrigin,
    SettingsSource, DEFAULT_FILE,
};
