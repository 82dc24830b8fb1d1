//! Engine configuration: endpoints plus every timing knob the
//! synchronizer and dispatcher consult.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vitrine_model::PaginationState;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the dashboarding platform.
    pub base_url: String,
    /// Application namespace theme actions are issued under.
    pub source_app: String,
    /// Path of the static catalog document, relative to `base_url`.
    pub catalog_path: String,
    /// Session token sent as a bearer header on service API calls.
    pub session_token: Option<String>,
    pub sync: SyncTunables,
}

/// Timing knobs. All recommended values from the protocol design are the
/// defaults; tests shrink them for determinism.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTunables {
    /// Hard ceiling before a load/save settles as failure/empty.
    pub settle_timeout_ms: u64,
    /// How long the primary transport stays unchallenged on load.
    pub fallback_grace_ms: u64,
    /// Same, for saves.
    pub save_grace_ms: u64,
    /// Delay before the post-save reconciling reload.
    pub reconcile_delay_ms: u64,
    /// Debounce window for search-text keystrokes.
    pub search_debounce_ms: u64,
    /// Minimum display duration of one apply/remove progress step.
    pub progress_floor_ms: u64,
    pub page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            source_app: "theme_gallery".to_string(),
            catalog_path: "/static/themes_metadata.json".to_string(),
            session_token: None,
            sync: SyncTunables::default(),
        }
    }
}

impl Default for SyncTunables {
    fn default() -> Self {
        Self {
            settle_timeout_ms: 3000,
            fallback_grace_ms: 1000,
            save_grace_ms: 1000,
            reconcile_delay_ms: 1000,
            search_debounce_ms: 300,
            progress_floor_ms: 500,
            page_size: PaginationState::DEFAULT_PAGE_SIZE,
        }
    }
}

impl SyncTunables {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn fallback_grace(&self) -> Duration {
        Duration::from_millis(self.fallback_grace_ms)
    }

    pub fn save_grace(&self) -> Duration {
        Duration::from_millis(self.save_grace_ms)
    }

    pub fn reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.reconcile_delay_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn progress_floor(&self) -> Duration {
        Duration::from_millis(self.progress_floor_ms)
    }
}

impl EngineConfig {
    /// Load from the per-user config file, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load() -> Self {
        if let Some(path) = Self::default_path()
            && path.exists()
            && let Ok(config) = Self::load_from(&path)
        {
            return config;
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("read {}: {err}", path.display())))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> EngineResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| EngineError::Config("no config directory available".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| EngineError::Config(format!("create {}: {err}", parent.display())))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|err| EngineError::Config(format!("write {}: {err}", path.display())))
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vitrine").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_recommendations() {
        let tunables = SyncTunables::default();
        assert_eq!(tunables.settle_timeout(), Duration::from_millis(3000));
        assert_eq!(tunables.fallback_grace(), Duration::from_millis(1000));
        assert_eq!(tunables.search_debounce(), Duration::from_millis(300));
        assert_eq!(tunables.page_size, 50);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");

        let mut config = EngineConfig::default();
        config.base_url = "https://dash.example.com".to_string();
        config.session_token = Some("s3cret".to_string());
        config.sync.settle_timeout_ms = 1234;
        config.save_to(&path).expect("save");

        let loaded = EngineConfig::load_from(&path).expect("load");
        assert_eq!(loaded.base_url, "https://dash.example.com");
        assert_eq!(loaded.session_token.as_deref(), Some("s3cret"));
        assert_eq!(loaded.sync.settle_timeout_ms, 1234);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").expect("write");

        assert!(matches!(
            EngineConfig::load_from(&path),
            Err(EngineError::Parse(_))
        ));
    }
}
