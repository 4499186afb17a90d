use crate::api::DEFAULT_BACKEND_URL;
use crate::core::error::{Error, Result};
use crate::core::objects::SHARED_LOCATION;
use crate::utils::get_data_dir;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured backend origin
pub const BACKEND_URL_ENV: &str = "PANCTL_BACKEND_URL";

const MAX_TIMEOUT_SECS: u64 = 300;

/// Persisted console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the policy backend, e.g. `http://127.0.0.1:8000`
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Device group new service objects and address groups are created in
    #[serde(default = "default_device_group")]
    pub default_device_group: String,
    /// Per-request timeout (clamped to 1..=300 seconds)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub theme_choice: crate::theme::ThemeChoice,
    /// Append create requests to the audit log
    #[serde(default = "default_true")]
    pub enable_audit_log: bool,
    /// Origin from `--backend` or `PANCTL_BACKEND_URL`; never written back
    #[serde(skip)]
    pub backend_override: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            default_device_group: default_device_group(),
            request_timeout_secs: default_timeout(),
            theme_choice: crate::theme::ThemeChoice::default(),
            enable_audit_log: true,
            backend_override: None,
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_device_group() -> String {
    SHARED_LOCATION.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Applies the backend origin overrides: flag beats environment beats file.
    #[must_use]
    pub fn with_backend_override(mut self, env: Option<String>, flag: Option<String>) -> Self {
        if let Some(url) = flag.or(env).filter(|u| !u.trim().is_empty()) {
            self.backend_override = Some(url.trim().to_string());
        }
        self
    }

    /// Backend origin in effect for this run
    pub fn backend(&self) -> &str {
        self.backend_override.as_deref().unwrap_or(&self.backend_url)
    }

    /// Reads `PANCTL_BACKEND_URL` and applies it together with `flag`
    #[must_use]
    pub fn with_overrides(self, flag: Option<String>) -> Self {
        let env = std::env::var(BACKEND_URL_ENV).ok();
        self.with_backend_override(env, flag)
    }

    /// Rejects settings the client cannot work with and clamps the timeout
    pub fn validated(mut self) -> Result<Self> {
        let url = self.backend().trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend_url must start with http:// or https:// (got '{url}')"
            )));
        }
        if self.default_device_group.trim().is_empty() {
            self.default_device_group = default_device_group();
        }
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, MAX_TIMEOUT_SECS);
        Ok(self)
    }
}

/// Saves the config to disk using an atomic write pattern.
/// 1. Writes to a temporary file.
/// 2. Sets restrictive permissions (0o600).
/// 3. Atomically renames to the target path.
pub async fn save_config(config: &AppConfig) -> std::io::Result<()> {
    if let Some(mut path) = get_data_dir() {
        let json = serde_json::to_string_pretty(config)?;

        let mut temp_path = path.clone();
        temp_path.push("config.json.tmp");
        path.push("config.json");

        #[cfg(unix)]
        {
            use tokio::fs::OpenOptions;
            use tokio::io::AsyncWriteExt;

            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .mode(0o600)
                .open(&temp_path)
                .await?;

            file.write_all(json.as_bytes()).await?;
            file.sync_all().await?;
        }

        #[cfg(not(unix))]
        {
            use tokio::io::AsyncWriteExt;

            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(json.as_bytes()).await?;
            file.sync_all().await?;
        }

        tokio::fs::rename(temp_path, path).await?;
    }
    Ok(())
}

fn parse_or_default(json: &str) -> AppConfig {
    match serde_json::from_str::<AppConfig>(json) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring unreadable config.json: {e}");
            AppConfig::default()
        }
    }
}

/// Loads the config at startup, or returns defaults if missing or unreadable.
pub fn load_config_blocking() -> AppConfig {
    if let Some(mut path) = get_data_dir() {
        path.push("config.json");
        if let Ok(json) = std::fs::read_to_string(&path) {
            return parse_or_default(&json);
        }
    }
    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"backend_url":"http://pano:9000"}"#).unwrap();
        assert_eq!(config.backend_url, "http://pano:9000");
        assert_eq!(config.default_device_group, "shared");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.enable_audit_log);
    }

    #[test]
    fn test_flag_beats_env() {
        let config = AppConfig::default().with_backend_override(
            Some("http://from-env:8000".into()),
            Some("http://from-flag:8000".into()),
        );
        assert_eq!(config.backend(), "http://from-flag:8000");

        let config = AppConfig::default()
            .with_backend_override(Some("http://from-env:8000".into()), None);
        assert_eq!(config.backend(), "http://from-env:8000");

        let config = AppConfig::default().with_backend_override(Some("  ".into()), None);
        assert_eq!(config.backend(), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_override_is_not_persisted() {
        let file = parse_or_default(r#"{"backend_url":"http://pano:9000"}"#);
        let mut config = file
            .with_backend_override(None, Some("http://one-off:8000".into()))
            .validated()
            .unwrap();
        config.theme_choice = crate::theme::ThemeChoice::Gruvbox;

        let saved: serde_json::Value =
            serde_json::from_str(&serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(saved["backend_url"], "http://pano:9000");
        assert!(saved.get("backend_override").is_none());

        let reloaded = parse_or_default(&serde_json::to_string(&config).unwrap());
        assert_eq!(reloaded.backend(), "http://pano:9000");
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let config = AppConfig::default().with_backend_override(None, Some("pano:9000".into()));
        assert!(matches!(config.validated(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validated_rejects_bad_scheme() {
        let config = AppConfig {
            backend_url: "127.0.0.1:8000".into(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validated(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validated_clamps_timeout() {
        let config = AppConfig {
            request_timeout_secs: 0,
            default_device_group: String::new(),
            ..AppConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.request_timeout_secs, 1);
        assert_eq!(config.default_device_group, "shared");

        let config = AppConfig {
            request_timeout_secs: 10_000,
            ..AppConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_garbage_config_falls_back() {
        assert_eq!(parse_or_default("{not json"), AppConfig::default());
    }
}
