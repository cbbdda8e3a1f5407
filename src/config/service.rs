use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, ProgressError};

const APP_DIR: &str = "com.learnmate.progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ProgressError::new(
                format!("Unknown log format '{}'", other),
                ErrorKind::Config,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_path: PathBuf,
    pub log_format: LogFormat,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8001,
            data_path: app_data_dir().join("data").join("state.json"),
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Defaults, then the TOML file (if any), then environment overrides.
    pub fn load() -> Result<Self, ProgressError> {
        let path = std::env::var_os("PROGRESS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path);
        let mut config = Self::from_file(&path)?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file. A missing file is not an error.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ProgressError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<ServiceConfig>(&content)
                .map(Some)
                .map_err(|e| ProgressError::from(e).with_context(format!("path: {:?}", path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProgressError::new(
                format!("Failed to read config file: {}", e),
                ErrorKind::Config,
            )
            .with_context(format!("path: {:?}", path))),
        }
    }

    /// Apply `PROGRESS_*` overrides from `lookup` (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ProgressError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("PROGRESS_HOST") {
            self.host = host.trim().parse().map_err(|_| {
                ProgressError::new(format!("Invalid PROGRESS_HOST '{}'", host), ErrorKind::Config)
            })?;
        }
        if let Some(port) = non_empty("PROGRESS_PORT").or_else(|| non_empty("PORT")) {
            self.port = port.trim().parse().map_err(|_| {
                ProgressError::new(format!("Invalid port '{}'", port), ErrorKind::Config)
            })?;
        }
        if let Some(path) = non_empty("PROGRESS_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(format) = non_empty("PROGRESS_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        if let Some(level) = non_empty("RUST_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Platform-specific application data directory.
pub fn app_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_DIR);
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_DIR);
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_DIR);
            return dir;
        }
    }

    // Fallback
    PathBuf::from(".").join(APP_DIR)
}

fn default_config_path() -> PathBuf {
    app_data_dir().join("progress.toml")
}
