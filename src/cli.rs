// Command-line interface
//
// Runtime flags plus a `config` subcommand for inspecting and editing the
// config file without opening it by hand.

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};

/// Terminal dashboard for the taniclaw farm agent
#[derive(Parser)]
#[command(name = "taniterm")]
#[command(version = VERSION)]
#[command(about = "Terminal dashboard for the taniclaw farm agent", long_about = None)]
pub struct Cli {
    /// Base URL of the taniclaw backend
    #[arg(long)]
    pub api_url: Option<String>,

    /// Run against a canned demo farm, no backend needed
    #[arg(long)]
    pub demo: bool,

    /// Log level for taniterm's own logs
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write logs to ~/.config/taniterm/logs/
    #[arg(long)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Set one key and save: --set KEY=VALUE
        #[arg(long, value_name = "KEY=VALUE")]
        set: Option<String>,
    },
}

/// Handle a subcommand if one was given. Returns true when handled, in
/// which case the caller exits instead of starting the TUI.
pub fn handle_command(cli: &Cli) -> bool {
    match &cli.command {
        Some(Commands::Config {
            show,
            path,
            reset,
            set,
        }) => {
            if *path {
                handle_config_path();
            } else if *show {
                handle_config_show();
            } else if *reset {
                handle_config_reset();
            } else if let Some(assignment) = set {
                handle_config_set(assignment);
            } else {
                println!("Usage: taniterm config [--show|--path|--reset|--set KEY=VALUE]");
            }
            true
        }
        None => false,
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();
    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    if let Err(e) = Config::default().save() {
        eprintln!("Error writing config: {e}");
        std::process::exit(1);
    }
    if let Some(path) = Config::config_path() {
        println!("Config reset to defaults: {}", path.display());
    }
}

fn handle_config_set(assignment: &str) {
    let Some((key, value)) = assignment.split_once('=') else {
        eprintln!("Error: expected KEY=VALUE, got {assignment:?}");
        std::process::exit(1);
    };
    let mut config = Config::from_env();
    if let Err(e) = config.set_key(key.trim(), value.trim()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = config.save() {
        eprintln!("Error writing config: {e}");
        std::process::exit(1);
    }
    println!("{} = {}", key.trim(), value.trim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_fold_into_config() {
        let cli = Cli::parse_from([
            "taniterm",
            "--api-url",
            "http://farm.local:9000",
            "--demo",
            "--log-level",
            "debug",
        ]);
        let mut config = Config::default();
        config.apply_cli(&cli);
        assert_eq!(config.api_url, "http://farm.local:9000");
        assert!(config.demo);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.file);
    }
}
