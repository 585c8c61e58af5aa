//! Configuration file management for daytrip.
//!
//! Provides a TOML-based config file at `~/.config/daytrip/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub providers: ProvidersSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProvidersSection {
    /// API key for the events search provider.
    pub events_api_key: String,
    /// API key for the plan-generation model.
    pub generation_api_key: String,
    /// API key for the geocoding/directions provider.
    pub maps_api_key: String,
    /// Generation model override; the adapter default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the daytrip config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/daytrip` or `~/.config/daytrip`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("daytrip");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("daytrip")
}

/// Return the path to the daytrip config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix; it holds API keys.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct DaytripConfig {
    pub events_api_key: String,
    pub generation_api_key: String,
    pub maps_api_key: String,
    pub generation_model: Option<String>,
    pub bind: String,
    pub port: u16,
}

impl DaytripConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > default.
    ///
    /// - API keys: `DAYTRIP_EVENTS_API_KEY` / `DAYTRIP_GENERATION_API_KEY` /
    ///   `DAYTRIP_MAPS_API_KEY` env > config file > error.
    /// - Bind/port: CLI flag > config file > `127.0.0.1:8000`.
    pub fn resolve(cli_bind: Option<&str>, cli_port: Option<u16>) -> Result<Self> {
        let file_config = load_config().ok();

        let key = |env_name: &str, from_file: Option<&str>| -> Result<String> {
            if let Ok(value) = std::env::var(env_name) {
                return Ok(value);
            }
            match from_file {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => bail!(
                    "{env_name} not set and no key in the config file; \
                     run `daytrip init` or export {env_name}"
                ),
            }
        };

        let providers = file_config.as_ref().map(|c| &c.providers);
        let events_api_key = key(
            "DAYTRIP_EVENTS_API_KEY",
            providers.map(|p| p.events_api_key.as_str()),
        )?;
        let generation_api_key = key(
            "DAYTRIP_GENERATION_API_KEY",
            providers.map(|p| p.generation_api_key.as_str()),
        )?;
        let maps_api_key = key(
            "DAYTRIP_MAPS_API_KEY",
            providers.map(|p| p.maps_api_key.as_str()),
        )?;
        let generation_model = std::env::var("DAYTRIP_GENERATION_MODEL")
            .ok()
            .or_else(|| providers.and_then(|p| p.generation_model.clone()));

        let server = file_config.map(|c| c.server).unwrap_or_default();
        let bind = match cli_bind {
            Some(b) => b.to_string(),
            None => server.bind,
        };
        let port = cli_port.unwrap_or(server.port);

        Ok(Self {
            events_api_key,
            generation_api_key,
            maps_api_key,
            generation_model,
            bind,
            port,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
