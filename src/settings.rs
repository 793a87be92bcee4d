use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default)]
    pub user_currencies: Vec<String>,
    #[serde(default)]
    pub user_stocks: Vec<String>,
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            user_currencies: Vec::new(),
            user_stocks: Vec::new(),
        }
    }
}

impl Settings {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.data_dir))
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir().join("report")
    }

    /// Market symbols are required for a snapshot; both lists must be non-empty.
    pub fn has_market_symbols(&self) -> bool {
        !self.user_currencies.is_empty() && !self.user_stocks.is_empty()
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendlens")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("user_settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("spendlens")
}

/// Read settings from `path`. A missing or malformed file yields defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            tracing::warn!(path = %path.display(), "settings file not found, using defaults");
            return Settings::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), "malformed settings file: {e}");
            Settings::default()
        }
    }
}

pub fn load_settings(path: Option<&Path>) -> Settings {
    match path {
        Some(p) => load_settings_from(p),
        None => load_settings_from(&settings_path()),
    }
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SpendError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            user_currencies: vec!["USD".into(), "EUR".into()],
            user_stocks: vec!["AAPL".into()],
        };
        save_settings(&settings, &path).unwrap();
        let loaded = load_settings(Some(&path));
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.user_currencies, vec!["USD", "EUR"]);
        assert_eq!(loaded.user_stocks, vec!["AAPL"]);
        assert_eq!(loaded.reports_dir(), PathBuf::from("/tmp/test/report"));
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("user_settings.json"));
        assert!(s.user_currencies.is_empty());
        assert!(!s.has_market_symbols());
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_load_returns_defaults_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_settings.json");
        std::fs::write(&path, "invalid json").unwrap();
        let s = load_settings_from(&path);
        assert!(s.user_stocks.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"user_currencies": ["USD"], "user_stocks": ["AAPL", "TSLA"]}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert!(!s.data_dir.is_empty());
        assert!(s.has_market_symbols());
        assert_eq!(s.user_stocks.len(), 2);
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("user_settings.json");
        save_settings(&Settings::default(), &path).unwrap();
        assert!(path.exists());
    }
}
