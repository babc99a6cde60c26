//! Configuration file management for studyplan.
//!
//! Provides a TOML-based config file at `~/.config/studyplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use studyplan_core::provider::ProviderConfig;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "STUDYPLAN_MODEL";
pub const PROVIDER_URL_ENV: &str = "STUDYPLAN_PROVIDER_URL";
pub const TIMEOUT_ENV: &str = "STUDYPLAN_TIMEOUT_SECS";
pub const ALLOWED_ORIGIN_ENV: &str = "STUDYPLAN_ALLOWED_ORIGIN";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origin: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the studyplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/studyplan` or `~/.config/studyplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("studyplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("studyplan")
}

/// Return the path to the studyplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Load the default config file if it exists.
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    load_config_from(&path).map(Some)
}

/// Serialize and write a config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file holds the API key.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Settings passed on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub allowed_origin: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// The single browser origin allowed to call the relay.
    pub allowed_origin: String,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 3001;
    pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::DEFAULT_BIND.to_string(),
            port: Self::DEFAULT_PORT,
            allowed_origin: Self::DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct StudyplanConfig {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
}

impl StudyplanConfig {
    /// Resolve configuration from CLI flags, the environment, and the
    /// default config file.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file_config = load_config()?;
        Self::resolve_with(cli, file_config.as_ref())
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `--api-key` > `GEMINI_API_KEY` > `provider.api_key` > error
    /// - Model: `--model` > `STUDYPLAN_MODEL` > `provider.model` > `gemini-2.5-flash`
    /// - Base URL: `STUDYPLAN_PROVIDER_URL` > `provider.base_url` > Gemini v1beta
    /// - Timeout: `--timeout` > `STUDYPLAN_TIMEOUT_SECS` > `provider.timeout_secs` > 60
    /// - Allowed origin: `--allowed-origin` > `STUDYPLAN_ALLOWED_ORIGIN` > `server.allowed_origin` > default
    pub fn resolve_with(cli: &CliOverrides, file_config: Option<&ConfigFile>) -> Result<Self> {
        let provider_file = file_config.map(|c| &c.provider);
        let server_file = file_config.map(|c| &c.server);

        let Some(api_key) = first_non_empty([
            cli.api_key.clone(),
            env_var(API_KEY_ENV),
            provider_file.and_then(|p| p.api_key.clone()),
        ]) else {
            bail!(
                "{API_KEY_ENV} is not set; pass --api-key, export {API_KEY_ENV}, \
                 or run `studyplan init --api-key <KEY>`"
            );
        };

        let mut provider = ProviderConfig::new(api_key);

        if let Some(model) = first_non_empty([
            cli.model.clone(),
            env_var(MODEL_ENV),
            provider_file.and_then(|p| p.model.clone()),
        ]) {
            provider = provider.with_model(model);
        }

        if let Some(url) = first_non_empty([
            env_var(PROVIDER_URL_ENV),
            provider_file.and_then(|p| p.base_url.clone()),
        ]) {
            provider = provider.with_base_url(url);
        }

        let timeout_secs = match cli.timeout_secs {
            Some(secs) => Some(secs),
            None => match env_var(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
                Some(raw) => Some(
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{TIMEOUT_ENV} is not a number: {raw:?}"))?,
                ),
                None => provider_file.and_then(|p| p.timeout_secs),
            },
        };
        if let Some(secs) = timeout_secs {
            if secs == 0 {
                bail!("provider timeout must be at least 1 second");
            }
            provider = provider.with_timeout(Duration::from_secs(secs));
        }

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind: first_non_empty([
                cli.bind.clone(),
                server_file.and_then(|s| s.bind.clone()),
            ])
            .unwrap_or(defaults.bind),
            port: cli
                .port
                .or_else(|| server_file.and_then(|s| s.port))
                .unwrap_or(defaults.port),
            allowed_origin: first_non_empty([
                cli.allowed_origin.clone(),
                env_var(ALLOWED_ORIGIN_ENV),
                server_file.and_then(|s| s.allowed_origin.clone()),
            ])
            .unwrap_or(defaults.allowed_origin),
        };

        Ok(Self { provider, server })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// First candidate that is present and not blank.
fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        for name in [
            API_KEY_ENV,
            MODEL_ENV,
            PROVIDER_URL_ENV,
            TIMEOUT_ENV,
            ALLOWED_ORIGIN_ENV,
        ] {
            unsafe { std::env::remove_var(name) };
        }
    }

    fn file_with_key(key: &str) -> ConfigFile {
        ConfigFile {
            provider: ProviderSection {
                api_key: Some(key.to_string()),
                model: Some("file-model".to_string()),
                base_url: None,
                timeout_secs: Some(30),
            },
            server: ServerSection {
                bind: Some("0.0.0.0".to_string()),
                port: Some(8080),
                allowed_origin: Some("https://file.example".to_string()),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("studyplan").join("config.toml");

        let original = file_with_key("file-key");
        save_config_to(&path, &original).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.provider.api_key.as_deref(), Some("file-key"));
        assert_eq!(loaded.provider.timeout_secs, Some(30));
        assert_eq!(loaded.server.port, Some(8080));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&path, &file_with_key("k")).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn partial_config_file_parses() {
        let config: ConfigFile = toml::from_str("[provider]\napi_key = \"abc\"\n").unwrap();
        assert_eq!(config.provider.api_key.as_deref(), Some("abc"));
        assert!(config.server.port.is_none());
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[provider\napi_key = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn resolve_uses_defaults_with_only_a_key() {
        let _lock = lock_env();
        clear_env();

        let cli = CliOverrides {
            api_key: Some("cli-key".to_string()),
            ..Default::default()
        };
        let config = StudyplanConfig::resolve_with(&cli, None).unwrap();

        assert_eq!(config.provider.api_key, "cli-key");
        assert_eq!(config.provider.model, ProviderConfig::DEFAULT_MODEL);
        assert_eq!(config.provider.timeout, Duration::from_secs(60));
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
        unsafe { std::env::set_var(MODEL_ENV, "env-model") };

        let cli = CliOverrides {
            api_key: Some("cli-key".to_string()),
            model: Some("cli-model".to_string()),
            timeout_secs: Some(5),
            port: Some(9999),
            ..Default::default()
        };
        let file = file_with_key("file-key");
        let config = StudyplanConfig::resolve_with(&cli, Some(&file)).unwrap();

        assert_eq!(config.provider.api_key, "cli-key");
        assert_eq!(config.provider.model, "cli-model");
        assert_eq!(config.provider.timeout, Duration::from_secs(5));
        assert_eq!(config.server.port, 9999);

        clear_env();
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
        unsafe { std::env::set_var(TIMEOUT_ENV, "15") };
        unsafe { std::env::set_var(ALLOWED_ORIGIN_ENV, "https://env.example") };
        unsafe { std::env::set_var(PROVIDER_URL_ENV, "http://127.0.0.1:9000/v1beta/") };

        let file = file_with_key("file-key");
        let config = StudyplanConfig::resolve_with(&CliOverrides::default(), Some(&file)).unwrap();

        assert_eq!(config.provider.api_key, "env-key");
        assert_eq!(config.provider.model, "file-model");
        assert_eq!(config.provider.timeout, Duration::from_secs(15));
        assert_eq!(config.provider.base_url, "http://127.0.0.1:9000/v1beta");
        assert_eq!(config.server.allowed_origin, "https://env.example");
        assert_eq!(config.server.bind, "0.0.0.0");

        clear_env();
    }

    #[test]
    fn resolve_falls_back_to_config_file() {
        let _lock = lock_env();
        clear_env();

        let file = file_with_key("file-key");
        let config = StudyplanConfig::resolve_with(&CliOverrides::default(), Some(&file)).unwrap();

        assert_eq!(config.provider.api_key, "file-key");
        assert_eq!(config.provider.timeout, Duration::from_secs(30));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.allowed_origin, "https://file.example");
    }

    #[test]
    fn resolve_errors_when_no_api_key() {
        let _lock = lock_env();
        clear_env();

        let result = StudyplanConfig::resolve_with(&CliOverrides::default(), None);

        assert!(result.is_err(), "should error when no API key");
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("GEMINI_API_KEY is not set"), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_treats_blank_api_key_as_missing() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(API_KEY_ENV, "   ") };

        let result = StudyplanConfig::resolve_with(&CliOverrides::default(), None);
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn resolve_rejects_non_numeric_timeout() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(TIMEOUT_ENV, "soon") };

        let cli = CliOverrides {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let err = StudyplanConfig::resolve_with(&cli, None).unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_ENV), "unexpected error: {err}");

        clear_env();
    }

    #[test]
    fn resolve_ignores_blank_timeout_env() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(TIMEOUT_ENV, "  ") };

        let cli = CliOverrides {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let file = file_with_key("file-key");
        let config = StudyplanConfig::resolve_with(&cli, Some(&file)).unwrap();
        assert_eq!(config.provider.timeout, Duration::from_secs(30));

        clear_env();
    }

    #[test]
    fn resolve_rejects_zero_timeout() {
        let _lock = lock_env();
        clear_env();

        let cli = CliOverrides {
            api_key: Some("k".to_string()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(StudyplanConfig::resolve_with(&cli, None).is_err());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("studyplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
