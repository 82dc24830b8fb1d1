//! HTTP client for the platform's versioned service API.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{EngineError, EngineResult};

/// Envelope the structured service wraps payloads in.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
}

/// API client with session authentication support.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_version: String,
    session_token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("has_token", &self.session_token.read().is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(base_url: impl Into<String>) -> EngineResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(EngineError::from)?;

        info!("[ApiClient] created for base URL {base_url}");

        Ok(Self {
            client,
            base_url,
            api_version: "v1".to_string(),
            session_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Build a versioned API URL. Absolute URLs and already-versioned paths
    /// pass through untouched.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        let trimmed = p.trim_start_matches('/');
        if trimmed.contains("api/v1/") {
            format!("{}/{}", self.base_url, trimmed)
        } else {
            format!("{}/api/{}/{}", self.base_url, self.api_version, trimmed)
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the session token sent with every request.
    pub fn set_session_token(&self, token: Option<String>) {
        *self.session_token.write() = token;
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.session_token.read().as_ref() {
            builder.header("Authorization", format!("Bearer {token}"))
        } else {
            builder
        }
    }

    /// Execute a request and unwrap the data envelope.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> EngineResult<T> {
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => {
                let envelope: ApiResponse<T> = response.json().await?;
                envelope
                    .data
                    .ok_or_else(|| EngineError::Parse("empty data envelope".to_string()))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(EngineError::Network(format!(
                    "request failed with status {status}: {body}"
                )))
            }
        }
    }

    /// GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> EngineResult<T> {
        let url = self.build_url(path);
        debug!("[ApiClient] GET {url}");

        let request = self.authorize(self.client.get(&url));
        self.execute(request).await
    }

    /// POST request for endpoints that answer 200/204 with no body.
    pub async fn post_no_content<T: Serialize>(&self, path: &str, body: &T) -> EngineResult<()> {
        let url = self.build_url(path);
        debug!("[ApiClient] POST (no content) {url}");

        let request = self.authorize(self.client.post(&url).json(body));
        let response = request.send().await?;
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(EngineError::Network(format!(
                    "request failed with status {status}: {body}"
                )))
            }
        }
    }

    /// POST a form, success/failure only.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> EngineResult<()> {
        let url = self.build_url(path);
        debug!("[ApiClient] POST (form) {url}");

        let request = self.authorize(self.client.post(&url).form(form));
        let response = request.send().await?;
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(EngineError::Network(format!(
                    "request failed with status {status}: {body}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_versions_relative_paths() {
        let client = ApiClient::new("http://localhost:8000").expect("client");
        assert_eq!(
            client.build_url("preferences/gallery"),
            "http://localhost:8000/api/v1/preferences/gallery"
        );
        assert_eq!(
            client.build_url("/preferences/gallery"),
            "http://localhost:8000/api/v1/preferences/gallery"
        );
    }

    #[test]
    fn build_url_passes_absolute_and_versioned_through() {
        let client = ApiClient::new("http://localhost:8000/").expect("client");
        assert_eq!(
            client.build_url("https://elsewhere.example.com/x"),
            "https://elsewhere.example.com/x"
        );
        assert_eq!(
            client.build_url("api/v1/themes/apply"),
            "http://localhost:8000/api/v1/themes/apply"
        );
    }

    #[test]
    fn session_token_is_shared_across_clones() {
        let client = ApiClient::new("http://localhost:8000").expect("client");
        assert!(format!("{client:?}").contains("has_token: false"));

        client.set_session_token(Some("s3cret".to_string()));
        assert!(format!("{client:?}").contains("has_token: true"));

        let clone = client.clone();
        clone.set_session_token(None);
        assert!(format!("{client:?}").contains("has_token: false"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(EngineError::Config(_))
        ));
    }
}
