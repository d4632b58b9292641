//! Configuration management for ieum.
//!
//! Loads configuration from ${IEUM_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured backend URL.
pub const BASE_URL_ENV: &str = "IEUM_BASE_URL";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Re-renders the commented template with every key set in `user_config`.
///
/// All settings are top-level, so keys are copied over as whole items.
fn apply_to_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    for (key, item) in user_doc.iter() {
        doc[key] = item.clone();
    }
    Ok(doc.to_string())
}

pub mod paths {
    //! Path resolution for ieum configuration and data directories.
    //!
    //! IEUM_HOME resolution order:
    //! 1. IEUM_HOME environment variable (if set)
    //! 2. ~/.config/ieum (default)

    use std::path::PathBuf;

    /// Returns the ieum home directory.
    pub fn ieum_home() -> PathBuf {
        if let Ok(home) = std::env::var("IEUM_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map_or_else(|| PathBuf::from(".ieum"), |h| h.join(".config").join("ieum"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        ieum_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        ieum_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat backend base URL
    pub base_url: Option<String>,

    /// Timeout for backend requests in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Log filter directive (e.g. "info", "ieum_core=debug")
    pub log_level: Option<String>,

    /// Directory for saved transcripts
    pub export_dir: Option<String>,
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the backend URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid URL.
    pub fn effective_base_url(&self) -> Result<String> {
        resolve_base_url(
            std::env::var(BASE_URL_ENV).ok().as_deref(),
            self.base_url.as_deref(),
        )
    }

    /// Returns the request timeout, or None if disabled (0).
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.request_timeout_secs)))
    }

    /// Returns the log filter directive.
    pub fn log_filter(&self) -> &str {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(Self::DEFAULT_LOG_LEVEL)
    }

    /// Returns the transcript export directory (`~` is expanded).
    pub fn export_dir(&self) -> PathBuf {
        match self.export_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => expand_home(dir),
            _ => PathBuf::from("."),
        }
    }

    /// Saves only the base_url field to the default config file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or written.
    pub fn save_base_url(url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), url)
    }

    /// Saves only the base_url field to a specific config file path.
    ///
    /// Creates the file with the default template if it doesn't exist.
    /// An existing file is rewritten from the template with its values kept.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_base_url_to(path: &Path, url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        validate_url(url.trim())?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            apply_to_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        doc["base_url"] = value(url.trim());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes through a sibling temp file so a failed write leaves the old
    /// config in place.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Resolves a base URL with precedence: env > config > default.
///
/// Blank values are skipped.
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_base_url(env_value: Option<&str>, config_value: Option<&str>) -> Result<String> {
    for candidate in [env_value, config_value].into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }
    Ok(Config::DEFAULT_BASE_URL.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {url}"))?;
    Ok(())
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url, None);
        assert_eq!(config.request_timeout_secs, 0);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "base_url = \"http://policy.example\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://policy.example"));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_load_invalid_toml_errors() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "base_url = [").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# ieum Configuration"));
        assert!(contents.contains("# base_url ="));
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.request_timeout_secs, 0);
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_request_timeout_zero_disables() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);

        let config = Config {
            request_timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://env"), Some("http://config")).unwrap(),
            "http://env"
        );
        assert_eq!(
            resolve_base_url(Some("  "), Some("http://config")).unwrap(),
            "http://config"
        );
        assert_eq!(
            resolve_base_url(None, None).unwrap(),
            Config::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_resolve_base_url_rejects_garbage() {
        assert!(resolve_base_url(None, Some("not a url")).is_err());
    }

    #[test]
    fn test_save_base_url_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "request_timeout_secs = 15\nlog_level = \"debug\"\n",
        )
        .unwrap();

        Config::save_base_url_to(&config_path, "http://localhost:9000").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.log_filter(), "debug");
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# ieum Configuration"));
    }

    #[test]
    fn test_save_base_url_rejects_invalid() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        assert!(Config::save_base_url_to(&config_path, "::nope").is_err());
        assert!(!config_path.exists());
    }

    #[test]
    fn test_export_dir_defaults_to_cwd() {
        assert_eq!(Config::default().export_dir(), PathBuf::from("."));
        let config = Config {
            export_dir: Some("/tmp/ieum".to_string()),
            ..Default::default()
        };
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/ieum"));
    }
}
