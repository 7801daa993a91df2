// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub enabled: bool,
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Proxy URL to use, if the proxy is switched on and set.
    pub fn active_url(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.https.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    /// Minimum trimmed length (in characters) of text submitted for detection.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,
    /// When false, detection always uses the local heuristic.
    #[serde(default = "default_true")]
    pub use_remote: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 50,
            remote_timeout_secs: 60,
            use_remote: true,
        }
    }
}

fn default_min_content_chars() -> usize { 50 }
fn default_remote_timeout() -> u64 { 60 }
fn default_true() -> bool { true }

/// A single user-facing edit to the stored configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEdit {
    SetApiKey(String),
    ClearApiKey,
    SetModel(String),
    SetBaseUrl(String),
}

impl ConfigEdit {
    /// Map a `config` subcommand (`set-key`, `clear-key`, `set-model`,
    /// `set-url`) and its argument to an edit.
    pub fn parse(action: &str, value: Option<&str>) -> Result<Self, String> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let required = |v: Option<&str>| {
            v.map(str::to_string)
                .ok_or_else(|| format!("config {} needs a value", action))
        };
        match action {
            "set-key" => required(value).map(Self::SetApiKey),
            "clear-key" => Ok(Self::ClearApiKey),
            "set-model" => required(value).map(Self::SetModel),
            "set-url" => required(value).map(Self::SetBaseUrl),
            other => Err(format!("unknown config action: {}", other)),
        }
    }
}

impl AppConfig {
    pub fn apply(&mut self, edit: ConfigEdit) {
        match edit {
            ConfigEdit::SetApiKey(key) => {
                self.api_keys.insert(OPENAI_PROVIDER.to_string(), key);
            }
            ConfigEdit::ClearApiKey => {
                self.api_keys.remove(OPENAI_PROVIDER);
            }
            ConfigEdit::SetModel(model) => self.openai.model = Some(model),
            ConfigEdit::SetBaseUrl(url) => self.openai.base_url = Some(url),
        }
    }
}

const OPENAI_PROVIDER: &str = "openai";
const BACKUPS_TO_KEEP: usize = 10;
const BACKUP_PREFIX: &str = "config_";

/// `config.json` under a config directory, with rotated copies in `backups/`.
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("academicflow"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    fn backup_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }

    /// A missing file is the default config; an unreadable one is an error.
    pub fn load(&self) -> Result<AppConfig, String> {
        let path = self.config_file();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Like `load`, but a missing or unparseable file yields the default
    /// config with a warning instead of an error.
    pub fn load_or_default(&self) -> AppConfig {
        self.load().unwrap_or_else(|e| {
            warn!("[CONFIG] {}, using default config", e);
            AppConfig::default()
        })
    }

    /// Load, apply one edit, write back (backing up the previous file).
    pub fn update(&self, edit: ConfigEdit) -> Result<AppConfig, String> {
        let mut config = self.load()?;
        config.apply(edit);
        self.save(&config)?;
        Ok(config)
    }

    /// Write through a temp file so a crash never leaves half a config behind.
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create {}: {}", self.config_dir.display(), e))?;

        let path = self.config_file();
        if path.exists() {
            self.backup(&path)?;
        }

        let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &path).map_err(|e| format!("Failed to replace {}: {}", path.display(), e))
    }

    fn backup(&self, current: &Path) -> Result<(), String> {
        let dir = self.backup_dir();
        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let target = dir.join(format!("{}{}.json", BACKUP_PREFIX, stamp));
        fs::copy(current, &target).map_err(|e| format!("Failed to back up config: {}", e))?;

        prune_backups(&dir, BACKUPS_TO_KEEP);
        Ok(())
    }

    pub fn list_backups(&self) -> Vec<PathBuf> {
        backup_names(&self.backup_dir())
    }
}

/// Backup paths, oldest first. Timestamped names sort chronologically.
fn backup_names(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".json"))
        })
        .collect();
    paths.sort();
    paths
}

fn prune_backups(dir: &Path, keep: usize) {
    let paths = backup_names(dir);
    let excess = paths.len().saturating_sub(keep);
    for path in paths.into_iter().take(excess) {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> ConfigStore {
        let dir = std::env::temp_dir().join(format!(
            "academicflow_cfg_{}_{}",
            name,
            uuid::Uuid::new_v4()
        ));
        ConfigStore::new(dir)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.min_content_chars, 50);
        assert_eq!(config.detection.remote_timeout_secs, 60);
        assert!(config.detection.use_remote);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"version":"1.0.0","detection":{"remoteTimeoutSecs":5}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.detection.remote_timeout_secs, 5);
        assert_eq!(config.detection.min_content_chars, 50);
        assert!(config.openai.model.is_none());
    }

    #[test]
    fn test_missing_file_loads_default() {
        let store = temp_store("missing");
        let config = store.load().unwrap();
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let store = temp_store("corrupt");
        fs::create_dir_all(&store.config_dir).unwrap();
        fs::write(store.config_file(), "{ not json").unwrap();
        assert!(store.load().unwrap_err().contains("Failed to parse"));
        let fallback = store.load_or_default();
        assert!(fallback.detection.use_remote);
        assert!(fallback.proxy.is_none());
        let _ = fs::remove_dir_all(&store.config_dir);
    }

    #[test]
    fn test_config_edit_parse() {
        assert_eq!(
            ConfigEdit::parse("set-key", Some(" sk-1 ")),
            Ok(ConfigEdit::SetApiKey("sk-1".to_string()))
        );
        assert_eq!(ConfigEdit::parse("clear-key", None), Ok(ConfigEdit::ClearApiKey));
        assert!(ConfigEdit::parse("set-model", Some("  ")).is_err());
        assert!(ConfigEdit::parse("set-colour", Some("red")).is_err());
    }

    #[test]
    fn test_update_persists_and_backs_up() {
        let store = temp_store("update");
        store.update(ConfigEdit::SetApiKey("sk-one".to_string())).unwrap();
        assert!(store.list_backups().is_empty());

        store.update(ConfigEdit::SetModel("gpt-4o-mini".to_string())).unwrap();
        store.update(ConfigEdit::SetBaseUrl("http://localhost:8080/v1".to_string())).unwrap();
        let config = store.load().unwrap();
        assert_eq!(config.api_keys.get("openai").map(String::as_str), Some("sk-one"));
        assert_eq!(config.openai.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.openai.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(store.list_backups().len(), 2);

        let config = store.update(ConfigEdit::ClearApiKey).unwrap();
        assert!(config.api_keys.is_empty());
        assert!(store.load().unwrap().api_keys.is_empty());
        let _ = fs::remove_dir_all(&store.config_dir);
    }

    #[test]
    fn test_prune_backups_keeps_newest() {
        let store = temp_store("prune");
        let dir = store.backup_dir();
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            fs::write(dir.join(format!("{}2024010{}.json", BACKUP_PREFIX, i)), "{}").unwrap();
        }
        prune_backups(&dir, 2);
        let names: Vec<_> = store
            .list_backups()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        assert_eq!(names, vec!["config_20240103.json", "config_20240104.json"]);
        let _ = fs::remove_dir_all(&store.config_dir);
    }

    #[test]
    fn test_proxy_active_url() {
        let proxy = ProxyConfig { enabled: false, https: Some("http://proxy:8080".to_string()) };
        assert_eq!(proxy.active_url(), None);
        let proxy = ProxyConfig { enabled: true, ..proxy };
        assert_eq!(proxy.active_url(), Some("http://proxy:8080"));
    }
}
