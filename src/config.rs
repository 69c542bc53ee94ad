// Configuration
//
// Loaded in order of precedence:
// 1. Command-line flags (highest)
// 2. Environment variables (TANITERM_*)
// 3. Config file (~/.config/taniterm/config.toml)
// 4. Built-in defaults (lowest)

use serde::Deserialize;
use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "http://localhost:8420";
const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for the crate's own spans: error, warn, info, debug, trace
    pub level: String,
    /// Also write logs to a file under the config directory
    pub file: bool,
    /// File logs as JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: false,
            json: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the taniclaw backend
    pub api_url: String,
    /// Demo mode: serve a canned farm instead of calling the backend
    pub demo: bool,
    /// Theme name: "dark" or "light"
    pub theme: String,
    /// Show only active plants in the list views
    pub active_only: bool,
    /// How many timeline entries to fetch
    pub history_limit: u32,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            demo: false,
            theme: "dark".to_string(),
            active_only: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            logging: LoggingConfig::default(),
        }
    }
}

/// Config file structure; every key optional so partial files work.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    api_url: Option<String>,
    demo: Option<bool>,
    theme: Option<String>,
    active_only: Option<bool>,
    history_limit: Option<u32>,
    logging: Option<FileLogging>,
}

#[derive(Debug, Deserialize, Default)]
struct FileLogging {
    level: Option<String>,
    file: Option<bool>,
    json: Option<bool>,
}

impl Config {
    /// ~/.config/taniterm/config.toml (Unix-style on all platforms)
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("taniterm").join("config.toml"))
    }

    /// Directory for file logs when [logging].file is on.
    pub fn log_dir() -> Option<PathBuf> {
        Self::config_path().and_then(|p| p.parent().map(|d| d.join("logs")))
    }

    /// Write a commented template on first run so the options are
    /// discoverable. Never overwrites an existing file.
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        // config is optional; a write failure is not fatal
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    // A broken file degrades to defaults; the dashboard
                    // should still come up.
                    eprintln!("Warning: ignoring invalid config {}: {e}", path.display());
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        }
    }

    /// Load configuration: env > file > defaults.
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        let defaults = Config::default();

        let api_url = std::env::var("TANITERM_API_URL")
            .ok()
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        let demo = std::env::var("TANITERM_DEMO")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .or(file.demo)
            .unwrap_or(defaults.demo);

        let theme = std::env::var("TANITERM_THEME")
            .ok()
            .or(file.theme)
            .unwrap_or(defaults.theme);

        let active_only = std::env::var("TANITERM_ACTIVE_ONLY")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .or(file.active_only)
            .unwrap_or(defaults.active_only);

        let history_limit = std::env::var("TANITERM_HISTORY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(file.history_limit)
            .unwrap_or(defaults.history_limit);

        let file_logging = file.logging.unwrap_or_default();
        let logging = LoggingConfig {
            level: std::env::var("TANITERM_LOG_LEVEL")
                .ok()
                .or(file_logging.level)
                .unwrap_or(defaults.logging.level),
            file: std::env::var("TANITERM_LOG_FILE")
                .ok()
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(file_logging.file)
                .unwrap_or(defaults.logging.file),
            json: file_logging.json.unwrap_or(defaults.logging.json),
        };

        Self {
            api_url,
            demo,
            theme,
            active_only,
            history_limit,
            logging,
        }
    }

    /// Fold CLI flags over the loaded config (flags win).
    pub fn apply_cli(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            self.api_url = url.clone();
        }
        if cli.demo {
            self.demo = true;
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
        if cli.log_file {
            self.logging.file = true;
        }
    }

    /// Render as a commented TOML template. Single source of truth for
    /// both the first-run file and `config --reset`.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# taniterm configuration
# Precedence: CLI flags > TANITERM_* env vars > this file > defaults

# Base URL of the taniclaw backend
api_url = "{api_url}"

# Serve a canned demo farm instead of calling the backend
demo = {demo}

# Theme: "dark" or "light"
theme = "{theme}"

# Show only active plants in the list views
active_only = {active_only}

# Timeline entries fetched for the history page
history_limit = {history_limit}

[logging]
# Level for taniterm's own logs: error, warn, info, debug, trace
level = "{level}"
# Also write logs to ~/.config/taniterm/logs/
file = {file}
# File logs as JSON lines
json = {json}
"#,
            api_url = self.api_url,
            demo = self.demo,
            theme = self.theme,
            active_only = self.active_only,
            history_limit = self.history_limit,
            level = self.logging.level,
            file = self.logging.file,
            json = self.logging.json,
        )
    }

    /// Apply a `KEY=VALUE` assignment from `config --set`.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "api_url" => self.api_url = value.to_string(),
            "demo" => self.demo = parse_bool(key, value)?,
            "theme" => self.theme = value.to_string(),
            "active_only" => self.active_only = parse_bool(key, value)?,
            "history_limit" => {
                self.history_limit = value
                    .parse()
                    .map_err(|_| format!("{key} expects a number, got {value:?}"))?;
            }
            "logging.level" => self.logging.level = value.to_string(),
            "logging.file" => self.logging.file = parse_bool(key, value)?,
            "logging.json" => self.logging.json = parse_bool(key, value)?,
            _ => return Err(format!("unknown config key: {key}")),
        }
        Ok(())
    }

    /// Persist the current values to the config file.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        std::fs::write(&path, self.to_toml()).map_err(|e| e.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("{key} expects true/false, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8420");
        assert!(!config.demo);
        assert!(config.active_only);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_template_round_trips_through_parser() {
        let template = Config::default().to_toml();
        let parsed: FileConfig = toml::from_str(&template).unwrap();
        assert_eq!(parsed.api_url.as_deref(), Some("http://localhost:8420"));
        assert_eq!(parsed.history_limit, Some(50));
        assert_eq!(parsed.logging.unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn test_partial_file_fills_from_defaults() {
        let parsed: FileConfig = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(parsed.theme.as_deref(), Some("light"));
        assert!(parsed.api_url.is_none());
    }

    #[test]
    fn test_set_key_validates() {
        let mut config = Config::default();
        config.set_key("history_limit", "25").unwrap();
        assert_eq!(config.history_limit, 25);
        config.set_key("logging.level", "debug").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.set_key("history_limit", "banyak").is_err());
        assert!(config.set_key("demo", "kinda").is_err());
        assert!(config.set_key("nonsense", "x").is_err());
    }
}
