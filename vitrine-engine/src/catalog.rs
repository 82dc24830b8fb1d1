//! Catalog store: the immutable theme list, fetched once per session.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::RwLock;
use vitrine_model::{CatalogDocument, ThemeId, ThemeRecord};

use crate::error::{EngineError, EngineResult};

/// Feature list served when a theme carries none of its own, or when a
/// details lookup misses entirely.
pub const GENERIC_FEATURES: [&str; 4] = [
    "Professional color scheme",
    "Optimized for dashboard clarity",
    "Consistent visual hierarchy",
    "Enhanced user experience",
];

/// Where the catalog document comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> EngineResult<CatalogDocument>;
}

/// Fetches the static JSON catalog document over HTTP. The document lives
/// outside the versioned API prefix.
#[derive(Debug)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: &str, catalog_path: &str) -> EngineResult<Self> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{base}/{}", catalog_path.trim_start_matches('/'));
        url::Url::parse(&url)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(EngineError::from)?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> EngineResult<CatalogDocument> {
        debug!("[Catalog] GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Network(format!(
                "catalog fetch failed with status {status}"
            )));
        }
        Ok(response.json::<CatalogDocument>().await?)
    }
}

/// Terminal state of the one-shot catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    Pending,
    Loaded,
    /// Zero themes; the error text is surfaced in the gallery view.
    Failed(String),
}

/// Everything a details view needs; lookups never error, an unknown id
/// degrades to a generic feature list.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDetails {
    pub id: ThemeId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub features: Vec<String>,
}

/// Owns the `ThemeRecord`s exclusively; read-only to every consumer.
#[derive(Debug)]
pub struct CatalogStore {
    themes: RwLock<Arc<Vec<ThemeRecord>>>,
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            themes: RwLock::new(Arc::new(Vec::new())),
            state: RwLock::new(CatalogState::Pending),
        }
    }

    /// Fetch the catalog. A fetch or parse failure leaves zero themes and a
    /// visible error state instead of propagating.
    pub async fn load(&self, source: &dyn CatalogSource) {
        match source.fetch_catalog().await {
            Ok(document) => {
                info!("[Catalog] loaded {} themes", document.themes.len());
                *self.themes.write() = Arc::new(document.themes);
                *self.state.write() = CatalogState::Loaded;
            }
            Err(err) => {
                warn!("[Catalog] load failed: {err}");
                *self.themes.write() = Arc::new(Vec::new());
                *self.state.write() = CatalogState::Failed(err.to_string());
            }
        }
    }

    /// Whether the load reached a terminal state (loaded or failed).
    pub fn is_settled(&self) -> bool {
        *self.state.read() != CatalogState::Pending
    }

    pub fn state(&self) -> CatalogState {
        self.state.read().clone()
    }

    pub fn error(&self) -> Option<String> {
        match &*self.state.read() {
            CatalogState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Cheap shared snapshot of the record list.
    pub fn snapshot(&self) -> Arc<Vec<ThemeRecord>> {
        Arc::clone(&self.themes.read())
    }

    pub fn len(&self) -> usize {
        self.themes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.read().is_empty()
    }

    pub fn find(&self, id: &ThemeId) -> Option<ThemeRecord> {
        self.themes.read().iter().find(|t| &t.id == id).cloned()
    }

    /// Details lookup. An unknown id is not an error for the details view.
    pub fn details(&self, id: &ThemeId) -> ThemeDetails {
        let generic = || GENERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        match self.find(id) {
            Some(record) => ThemeDetails {
                id: record.id,
                name: record.name,
                description: record.description,
                image: record.image,
                features: record.features.unwrap_or_else(generic),
            },
            None => {
                warn!("[Catalog] unknown theme {id}; serving generic details");
                ThemeDetails {
                    id: id.clone(),
                    name: id.to_string(),
                    description: String::new(),
                    image: String::new(),
                    features: generic(),
                }
            }
        }
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::builders::theme;
    use crate::testing::stubs::ScriptedCatalogSource;

    #[tokio::test]
    async fn failed_fetch_leaves_zero_themes_and_error_state() {
        let store = CatalogStore::new();
        assert!(!store.is_settled());

        store
            .load(&ScriptedCatalogSource::failing("connection refused"))
            .await;

        assert!(store.is_settled());
        assert!(store.is_empty());
        let message = store.error().expect("error surfaced");
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn details_degrade_to_generic_features() {
        let store = CatalogStore::new();
        store
            .load(&ScriptedCatalogSource::ok(vec![theme(
                "ink", "Ink", "dark", "minimal", 1,
            )]))
            .await;

        let known = store.details(&ThemeId::from("ink"));
        assert_eq!(known.name, "Ink");
        assert_eq!(known.features.len(), GENERIC_FEATURES.len());

        let unknown = store.details(&ThemeId::from("missing"));
        assert_eq!(unknown.name, "missing");
        assert_eq!(unknown.features.len(), GENERIC_FEATURES.len());
    }

    #[tokio::test]
    async fn explicit_features_win_over_generic() {
        let mut record = theme("ink", "Ink", "dark", "minimal", 1);
        record.features = Some(vec!["Dimmed panels".to_string()]);

        let store = CatalogStore::new();
        store.load(&ScriptedCatalogSource::ok(vec![record])).await;

        let details = store.details(&ThemeId::from("ink"));
        assert_eq!(details.features, vec!["Dimmed panels".to_string()]);
    }
}
