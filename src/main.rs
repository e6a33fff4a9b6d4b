//! Detox config CLI
//!
//! Entry point for the `detox-config` command-line tool.

use chrono::{DateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use detox_config::{compose_detox_config, CliArgs, ComposeOptions, ComposedConfig};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "detox-config")]
#[command(about = "Compose and inspect the Detox test runner configuration", version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the composed configuration as JSON
    Compose {
        #[command(flatten)]
        common: CommonArgs,

        /// JSON object merged over the loaded config file
        #[arg(long, value_name = "JSON")]
        configuration_override: Option<String>,
    },

    /// Check that the configuration composes and print a summary
    Verify {
        #[command(flatten)]
        common: CommonArgs,

        /// Fail when the selected configuration has no binaryPath
        #[arg(long)]
        require_binary: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    #[command(flatten)]
    detox: CliArgs,

    /// Directory to search for the config file from (default: current directory)
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Run start time in milliseconds since the epoch (default: now)
    #[arg(long, env = "DETOX_START_TIMESTAMP")]
    start_timestamp: Option<i64>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    detox_config::logging::init_cli(cli.verbose);

    match cli.command {
        Commands::Compose {
            common,
            configuration_override,
        } => {
            run_compose(common, configuration_override).await;
        }
        Commands::Verify {
            common,
            require_binary,
        } => {
            run_verify(common, require_binary).await;
        }
    }
}

fn start_time(timestamp: Option<i64>) -> DateTime<Utc> {
    match timestamp {
        Some(ms) => match Utc.timestamp_millis_opt(ms).single() {
            Some(time) => time,
            None => {
                eprintln!("Error: invalid start timestamp: {}", ms);
                process::exit(2);
            }
        },
        None => Utc::now(),
    }
}

async fn compose(common: CommonArgs, override_config: Option<serde_json::Value>) -> ComposedConfig {
    let options = ComposeOptions {
        cwd: common.cwd,
        argv: common.detox,
        override_config,
        start_time: start_time(common.start_timestamp),
        ..ComposeOptions::default()
    };

    match compose_detox_config(options).await {
        Ok(composed) => composed,
        Err(e) => {
            eprintln!("{}", e.render());
            process::exit(1);
        }
    }
}

async fn run_compose(common: CommonArgs, configuration_override: Option<String>) {
    let override_config = match configuration_override.as_deref().map(serde_json::from_str) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            eprintln!("Error parsing --configuration-override: {}", e);
            process::exit(2);
        }
    };

    let composed = compose(common, override_config).await;
    match serde_json::to_string_pretty(&composed) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

async fn run_verify(common: CommonArgs, require_binary: bool) {
    let flags = common.detox.provided();
    let composed = compose(common, None).await;

    let binary_path = if require_binary {
        match composed.device_config.require_binary_path() {
            Ok(path) => Some(path.to_string()),
            Err(e) => {
                eprintln!("{}", e.render());
                process::exit(1);
            }
        }
    } else {
        composed.device_config.binary_path.clone()
    };

    println!("Configuration valid: {}", composed.meta.configuration);
    println!();
    match composed.meta.location {
        Some(ref location) => println!("  Location: {}", location.display()),
        None => println!("  Location: (override only)"),
    }
    println!(
        "  Device: {} ({})",
        composed.device_config.device, composed.device_config.device_type
    );
    if let Some(path) = binary_path {
        println!("  Binary: {}", path);
    }
    println!("  Session server: {}", composed.session_config.server);
    println!("  Artifacts root: {}", composed.artifacts_config.root_dir);
    if !flags.is_empty() {
        let flags: Vec<String> = flags
            .into_iter()
            .map(|(name, value)| format!("--{}={}", name, value))
            .collect();
        println!("  Flags: {}", flags.join(" "));
    }
}
