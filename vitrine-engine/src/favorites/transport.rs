//! Preference transports: the primary service channel and the plain REST
//! fallback it races against.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::api_client::ApiClient;
use crate::error::{EngineError, EngineResult};

/// Persisted preference payload. A missing `favorites` field means the user
/// has never saved any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(default)]
    pub favorites: Option<String>,
}

/// One way of reaching the persisted favorites string.
#[async_trait]
pub trait PreferenceTransport: Send + Sync {
    /// Short name used in log lines.
    fn label(&self) -> &'static str;

    async fn load_preferences(&self) -> EngineResult<PreferenceRecord>;

    async fn save_preferences(&self, favorites: &str) -> EngineResult<()>;
}

const PREFERENCES_PATH: &str = "preferences/gallery";

/// Primary transport: the versioned service API, enveloped responses.
#[derive(Debug, Clone)]
pub struct ServicePreferenceStore {
    api: ApiClient,
}

impl ServicePreferenceStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PreferenceTransport for ServicePreferenceStore {
    fn label(&self) -> &'static str {
        "service"
    }

    async fn load_preferences(&self) -> EngineResult<PreferenceRecord> {
        self.api.get(PREFERENCES_PATH).await
    }

    async fn save_preferences(&self, favorites: &str) -> EngineResult<()> {
        let record = PreferenceRecord {
            favorites: Some(favorites.to_string()),
        };
        self.api.post_no_content(PREFERENCES_PATH, &record).await
    }
}

/// Fallback transport: the flat REST endpoint, un-enveloped JSON on reads
/// and form-encoded writes.
#[derive(Debug)]
pub struct RestPreferenceStore {
    client: reqwest::Client,
    url: String,
}

impl RestPreferenceStore {
    pub fn new(base_url: &str) -> EngineResult<Self> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{base}/services/{PREFERENCES_PATH}");
        url::Url::parse(&url)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(EngineError::from)?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl PreferenceTransport for RestPreferenceStore {
    fn label(&self) -> &'static str {
        "rest"
    }

    async fn load_preferences(&self) -> EngineResult<PreferenceRecord> {
        debug!("[Favorites] GET {} (fallback)", self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&[("output_mode", "json")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Network(format!(
                "fallback load failed with status {status}"
            )));
        }
        Ok(response.json::<PreferenceRecord>().await?)
    }

    async fn save_preferences(&self, favorites: &str) -> EngineResult<()> {
        debug!("[Favorites] POST {} (fallback)", self.url);
        let response = self
            .client
            .post(&self.url)
            .query(&[("output_mode", "json")])
            .form(&[("favorites", favorites)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Network(format!(
                "fallback save failed with status {status}"
            )));
        }
        Ok(())
    }
}
