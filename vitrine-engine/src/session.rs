//! One gallery session: owns the stores, the synchronizer, and the
//! dispatcher, and wires background settlements back into renders.

use std::sync::Arc;

use log::info;
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};

use crate::api_client::ApiClient;
use crate::catalog::{CatalogSource, CatalogStore, HttpCatalogSource};
use crate::config::EngineConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::EngineResult;
use crate::favorites::{
    FavoritesSynchronizer, PreferenceTransport, RestPreferenceStore, ServicePreferenceStore,
};
use crate::render::{GalleryView, RenderCoordinator, UiState};
use crate::theming::{HttpThemingApi, ThemingApi};

/// All engine state for one open gallery. Drop it and every background task
/// winds down with it.
pub struct GallerySession {
    config: EngineConfig,
    catalog_source: Arc<dyn CatalogSource>,
    catalog: Arc<CatalogStore>,
    favorites: FavoritesSynchronizer,
    render: Arc<RenderCoordinator>,
    dispatcher: ActionDispatcher,
}

impl std::fmt::Debug for GallerySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GallerySession")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl GallerySession {
    /// Build a session against live HTTP endpoints. Must be called from
    /// within a tokio runtime.
    pub fn connect(config: EngineConfig) -> EngineResult<Self> {
        let api = ApiClient::new(&config.base_url)?;
        if let Some(token) = &config.session_token {
            api.set_session_token(Some(token.clone()));
        }
        let catalog_source = Arc::new(HttpCatalogSource::new(
            &config.base_url,
            &config.catalog_path,
        )?);
        let primary = Arc::new(ServicePreferenceStore::new(api.clone()));
        let fallback = Arc::new(RestPreferenceStore::new(&config.base_url)?);
        let theming = Arc::new(HttpThemingApi::new(api));

        Ok(Self::with_components(
            config,
            catalog_source,
            primary,
            fallback,
            theming,
        ))
    }

    /// Build a session from explicit components. This is the seam tests use
    /// to drive the engine against scripted transports.
    pub fn with_components(
        config: EngineConfig,
        catalog_source: Arc<dyn CatalogSource>,
        primary: Arc<dyn PreferenceTransport>,
        fallback: Arc<dyn PreferenceTransport>,
        theming: Arc<dyn ThemingApi>,
    ) -> Self {
        let catalog = Arc::new(CatalogStore::new());

        let (nudge_tx, mut nudge_rx) = mpsc::unbounded_channel();
        let favorites =
            FavoritesSynchronizer::new(primary, fallback, config.sync.clone(), nudge_tx);

        let ui = Arc::new(RwLock::new(UiState::new(config.sync.page_size)));
        let render = Arc::new(RenderCoordinator::new(
            Arc::clone(&catalog),
            favorites.clone(),
            Arc::clone(&ui),
        ));

        // Background settlements (rollbacks, reconciling reloads) re-render
        // without any caller involved.
        {
            let render = Arc::clone(&render);
            tokio::spawn(async move {
                while nudge_rx.recv().await.is_some() {
                    render.render();
                }
            });
        }

        let dispatcher = ActionDispatcher::new(
            Arc::clone(&catalog),
            favorites.clone(),
            ui,
            Arc::clone(&render),
            theming,
            config.source_app.clone(),
            &config.sync,
        );

        Self {
            config,
            catalog_source,
            catalog,
            favorites,
            render,
            dispatcher,
        }
    }

    /// Load the catalog and favorites concurrently, then render the first
    /// view. Returns that view; `None` only if a render gate was still
    /// closed, which cannot happen after both loads settle.
    pub async fn initialize(&self) -> Option<GalleryView> {
        info!("[Session] initializing against {}", self.config.base_url);
        tokio::join!(
            self.catalog.load(self.catalog_source.as_ref()),
            self.favorites.load(),
        );
        self.render.render();
        self.render.current_view()
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GalleryView>> {
        self.render.subscribe()
    }

    pub fn view(&self) -> Option<GalleryView> {
        self.render.current_view()
    }

    pub fn favorites(&self) -> &FavoritesSynchronizer {
        &self.favorites
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
