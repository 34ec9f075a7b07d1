//! packcfg CLI
//!
//! Entry point for the `packcfg` command-line tool.

use clap::{ArgAction, Parser, Subcommand};
use packcfg::settings::{self, EffectiveSettings};
use packcfg::{explain, resolve_named, ConfigurationError, ResolveOptions, ResolvedConfig};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable set by `npm run <script> --report`
const REPORT_ENV: &str = "npm_config_report";

#[derive(Parser)]
#[command(name = "packcfg")]
#[command(about = "Resolve bundler configuration for a build mode", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to settings file (default: ./packcfg.toml when present)
    #[arg(long, short = 's', global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the final configuration for a mode
    Resolve {
        /// Build mode: development or production
        #[arg(long, short = 'm', env = "PACKCFG_MODE")]
        mode: Option<String>,

        /// Append the bundle report plugin (production only)
        #[arg(long)]
        report: bool,

        /// Print the resolved envelope (mode, digest, warnings) around the configuration
        #[arg(long)]
        envelope: bool,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,

        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Show which rules and loaders handle a file
    Explain {
        /// Build mode: development or production
        #[arg(long, short = 'm', env = "PACKCFG_MODE")]
        mode: Option<String>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// File path, relative to the project root
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            mode,
            report,
            envelope,
            compact,
            out,
        } => {
            let overrides = CliOverrides {
                mode,
                report: report || report_requested_by_env(),
                envelope,
                compact,
                out,
            };
            run_resolve(cli.settings.as_deref(), overrides);
        }
        Commands::Explain { mode, human, file } => {
            let overrides = CliOverrides {
                mode,
                ..CliOverrides::default()
            };
            run_explain(cli.settings.as_deref(), overrides, human, &file);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("packcfg=warn,packcfg_merge=warn")),
        1 => EnvFilter::new("packcfg=info,packcfg_merge=info"),
        _ => EnvFilter::new("packcfg=debug,packcfg_merge=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// The only place the process environment decides whether a report is wanted
fn report_requested_by_env() -> bool {
    match std::env::var(REPORT_ENV) {
        Ok(value) => is_truthy(&value),
        Err(_) => false,
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Settings given on the command line (highest precedence layer)
#[derive(Default)]
struct CliOverrides {
    mode: Option<String>,
    report: bool,
    envelope: bool,
    compact: bool,
    out: Option<PathBuf>,
}

impl CliOverrides {
    /// Only flags that were actually given appear in the layer
    fn to_value(&self) -> Value {
        let mut root = Map::new();
        let mut output = Map::new();

        if let Some(ref mode) = self.mode {
            root.insert("mode".to_string(), Value::String(mode.clone()));
        }
        if self.report {
            root.insert("report".to_string(), Value::Bool(true));
        }
        if self.envelope {
            output.insert("envelope".to_string(), Value::Bool(true));
        }
        if self.compact {
            output.insert("compact".to_string(), Value::Bool(true));
        }
        if let Some(ref out) = self.out {
            output.insert(
                "file".to_string(),
                Value::String(out.to_string_lossy().to_string()),
            );
        }
        if !output.is_empty() {
            root.insert("output".to_string(), Value::Object(output));
        }

        Value::Object(root)
    }
}

fn load_settings(explicit: Option<&Path>, overrides: &CliOverrides) -> EffectiveSettings {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let result = settings::discover(explicit, &cwd)
        .and_then(|path| EffectiveSettings::build(path.as_deref(), Some(overrides.to_value())));

    match result {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn resolve_or_exit(effective: &EffectiveSettings) -> ResolvedConfig {
    let result = match effective.settings.mode {
        Some(ref mode) => resolve_named(
            mode,
            ResolveOptions {
                report: effective.settings.report,
            },
        ),
        None => Err(ConfigurationError::MissingMode),
    };

    match result {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_resolve(settings_path: Option<&Path>, overrides: CliOverrides) {
    let effective = load_settings(settings_path, &overrides);
    let resolved = resolve_or_exit(&effective);

    for warning in &resolved.warnings {
        eprintln!("warning: {}", warning);
    }

    let output = &effective.settings.output;
    let rendered = match (output.envelope, output.compact) {
        (true, true) => serde_json::to_string(&resolved),
        (true, false) => resolved.to_json(),
        (false, true) => serde_json::to_string(&resolved.config),
        (false, false) => resolved.config.to_json(),
    };

    let json = match rendered {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    };

    match output.file {
        Some(ref path) => {
            if let Err(e) = fs::write(path, format!("{}\n", json)) {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(1);
            }
            tracing::info!(path = %path.display(), digest = %resolved.digest, "wrote configuration");
        }
        None => println!("{}", json),
    }
}

fn run_explain(settings_path: Option<&Path>, overrides: CliOverrides, human: bool, file: &str) {
    let effective = load_settings(settings_path, &overrides);
    let resolved = resolve_or_exit(&effective);

    let explanation = match explain(&resolved.config, file) {
        Ok(explanation) => explanation,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    if human {
        println!("{}", explanation.to_human());
    } else {
        match explanation.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}
