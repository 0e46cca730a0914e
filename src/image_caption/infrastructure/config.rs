use super::error::InfrastructureError;
use crate::domain::catalog::Catalog;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration. Read from an optional JSON file named by
/// `CAPTION_CONFIG`, then overridden field by field from `CAPTION_*` env vars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub assets_dir: PathBuf,
    pub frontend_dir: PathBuf,
    /// Caption font. The embedded DejaVu Sans Bold is used when unset.
    pub font_path: Option<PathBuf>,
    /// JSON file replacing the default background catalog.
    pub catalog_path: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Editor sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
    pub max_sessions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3300)),
            assets_dir: PathBuf::from("public"),
            frontend_dir: PathBuf::from("frontend/build"),
            font_path: None,
            catalog_path: None,
            fetch_timeout_secs: 10,
            max_upload_bytes: 10 * 1024 * 1024,
            session_idle_secs: 30 * 60,
            max_sessions: 1000,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, InfrastructureError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable variable lookup.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InfrastructureError> {
        let mut config = match lookup("CAPTION_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(value) = lookup("CAPTION_BIND_ADDR") {
            config.bind_addr = parse_var("CAPTION_BIND_ADDR", &value)?;
        }
        if let Some(value) = lookup("CAPTION_ASSETS_DIR") {
            config.assets_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("CAPTION_FRONTEND_DIR") {
            config.frontend_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("CAPTION_FONT_PATH") {
            config.font_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("CAPTION_CATALOG_PATH") {
            config.catalog_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("CAPTION_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = parse_var("CAPTION_FETCH_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("CAPTION_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_var("CAPTION_MAX_UPLOAD_BYTES", &value)?;
        }
        if let Some(value) = lookup("CAPTION_SESSION_IDLE_SECS") {
            config.session_idle_secs = parse_var("CAPTION_SESSION_IDLE_SECS", &value)?;
        }
        if let Some(value) = lookup("CAPTION_MAX_SESSIONS") {
            config.max_sessions = parse_var("CAPTION_MAX_SESSIONS", &value)?;
        }

        if config.fetch_timeout_secs == 0 {
            return Err(InfrastructureError::ConfigError("fetch timeout must be at least one second".to_string()));
        }
        if config.session_idle_secs == 0 || config.max_sessions == 0 {
            return Err(InfrastructureError::ConfigError(
                "session idle time and session limit must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, InfrastructureError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InfrastructureError::ConfigError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| InfrastructureError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub async fn load_catalog(&self) -> Result<Catalog, InfrastructureError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::default());
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| InfrastructureError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let catalog: Catalog = serde_json::from_str(&raw)
            .map_err(|e| InfrastructureError::ConfigError(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), images = catalog.len(), "loaded background catalog");
        Ok(catalog)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, InfrastructureError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| InfrastructureError::ConfigError(format!("{}={:?}: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::load_from(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.port(), 3300);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load_from(lookup(&[
            ("CAPTION_BIND_ADDR", "127.0.0.1:8080"),
            ("CAPTION_ASSETS_DIR", "/srv/cards"),
            ("CAPTION_FETCH_TIMEOUT_SECS", "3"),
            ("CAPTION_FONT_PATH", "/fonts/Amiri.ttf"),
            ("CAPTION_SESSION_IDLE_SECS", "60"),
            ("CAPTION_MAX_SESSIONS", "25"),
        ]))
        .unwrap();
        assert_eq!(config.session_idle_ttl(), Duration::from_secs(60));
        assert_eq!(config.max_sessions, 25);
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.assets_dir, PathBuf::from("/srv/cards"));
        assert_eq!(config.fetch_timeout_secs, 3);
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/Amiri.ttf")));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let bad_addr = AppConfig::load_from(lookup(&[("CAPTION_BIND_ADDR", "not an address")]));
        assert!(matches!(bad_addr, Err(InfrastructureError::ConfigError(_))));

        let zero_timeout = AppConfig::load_from(lookup(&[("CAPTION_FETCH_TIMEOUT_SECS", "0")]));
        assert!(matches!(zero_timeout, Err(InfrastructureError::ConfigError(_))));

        let no_sessions = AppConfig::load_from(lookup(&[("CAPTION_MAX_SESSIONS", "0")]));
        assert!(matches!(no_sessions, Err(InfrastructureError::ConfigError(_))));
    }

    #[test]
    fn test_config_file_then_env() {
        let path = std::env::temp_dir().join(format!("image_caption_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"assetsDir": "cards", "maxUploadBytes": 1024}"#).unwrap();

        let config = AppConfig::load_from(lookup(&[
            ("CAPTION_CONFIG", path.to_str().unwrap()),
            ("CAPTION_MAX_UPLOAD_BYTES", "2048"),
        ]))
        .unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("cards"));
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.bind_addr.port(), 3300);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_default_catalog_without_path() {
        let catalog = AppConfig::default().load_catalog().await.unwrap();
        assert_eq!(catalog, Catalog::default());
    }
}
