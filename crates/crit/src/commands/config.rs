//! Config command implementation.
//!
//! View configuration settings.
//! Config file is located at ~/.config/crit/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use criteria_rs::EngineSettings;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Parser and plan settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            engine: EngineSettings::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config file path.
///
/// `CRIT_CONFIG` wins, then `$XDG_CONFIG_HOME/crit`, then `~/.config/crit`
/// on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("CRIT_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("crit").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("crit").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    debug!(path = %path.display(), version = config.version, "loaded config");
    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }
    if config.engine.max_depth == 0 {
        return Err(CommandError::Config(
            "engine.max_depth must be at least 1".to_string(),
        ));
    }
    if config.engine.chunk_size == 0 {
        return Err(CommandError::Config(
            "engine.chunk_size must be at least 1".to_string(),
        ));
    }

    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("[engine]");
        println!("  max_depth: {}", config.engine.max_depth);
        println!("  chunk_size: {}", config.engine.chunk_size);

        println!("\n[output]");
        match config.output.color {
            Some(color) => println!("  color: {}", color),
            None => println!("  color: (default)"),
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn with_config_file<T>(contents: &str, f: impl FnOnce() -> T) -> T {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        env::set_var("CRIT_CONFIG", file.path());
        let result = f();
        env::remove_var("CRIT_CONFIG");
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.engine, EngineSettings::default());
        assert!(config.output.color.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            version: CONFIG_VERSION,
            engine: EngineSettings::default().with_chunk_size(25),
            output: OutputConfig { color: Some(false) },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("chunk_size = 25"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("color = false"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[engine]\nchunk_size = 10\n").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.engine.chunk_size, 10);
        assert_eq!(config.engine.max_depth, criteria_rs::config::DEFAULT_MAX_DEPTH);
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        env::set_var("CRIT_CONFIG", "/tmp/crit-test/config.toml");
        let path = get_config_path().unwrap();
        env::remove_var("CRIT_CONFIG");
        assert_eq!(path, PathBuf::from("/tmp/crit-test/config.toml"));
    }

    #[test]
    #[serial]
    fn test_config_path_from_xdg() {
        env::remove_var("CRIT_CONFIG");
        env::set_var("XDG_CONFIG_HOME", "/tmp/xdg");
        let path = get_config_path().unwrap();
        env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/xdg/crit/config.toml"));
    }

    #[test]
    #[serial]
    fn test_load_missing_config_is_default() {
        env::set_var("CRIT_CONFIG", "/nonexistent/crit/config.toml");
        let config = load_config().unwrap();
        env::remove_var("CRIT_CONFIG");
        assert_eq!(config.engine, EngineSettings::default());
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        let config = with_config_file(
            "version = 1\n[engine]\nmax_depth = 8\n[output]\ncolor = false\n",
            load_config,
        )
        .unwrap();
        assert_eq!(config.engine.max_depth, 8);
        assert_eq!(config.output.color, Some(false));
    }

    #[test]
    #[serial]
    fn test_load_invalid_toml() {
        let err = with_config_file("engine = [", load_config).unwrap_err();
        assert!(matches!(err, CommandError::Config(msg) if msg.contains("parse")));
    }

    #[test]
    #[serial]
    fn test_load_rejects_zero_chunk_size() {
        let err = with_config_file("[engine]\nchunk_size = 0\n", load_config).unwrap_err();
        assert!(matches!(err, CommandError::Config(msg) if msg.contains("chunk_size")));
    }

    #[test]
    fn test_migrate_rejects_newer_version() {
        let config = Config {
            version: CONFIG_VERSION + 1,
            ..Config::default()
        };
        assert!(migrate_config(config).is_err());
    }
}
