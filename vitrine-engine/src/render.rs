//! Gated, idempotent production of the gallery view.

use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use tokio::sync::watch;
use vitrine_model::{FavoriteSet, FilterState, ThemeRecord};

use crate::catalog::CatalogStore;
use crate::favorites::FavoritesSynchronizer;
use crate::filter::compute_visible;
use crate::pagination::PaginationController;

/// Mutable view state: what the user is filtering on and which page they are
/// looking at.
#[derive(Debug)]
pub struct UiState {
    pub filter: FilterState,
    pub pagination: PaginationController,
}

impl UiState {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter: FilterState::default(),
            pagination: PaginationController::new(page_size),
        }
    }
}

/// One complete rendering of the gallery. Owned data, detached from the
/// stores that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryView {
    /// The current page of the visible list.
    pub items: Vec<ThemeRecord>,
    pub favorites: FavoriteSet,
    pub current_page: u32,
    pub total_pages: u32,
    /// Size of the whole visible (filtered) list.
    pub visible_count: usize,
    /// Size of the catalog.
    pub total_count: usize,
    /// Featured themes drawn from the visible list.
    pub featured: Vec<ThemeRecord>,
    /// Editor picks drawn from the visible list.
    pub editor_picks: Vec<ThemeRecord>,
    /// Set when the catalog load failed; the gallery shows it instead of
    /// pretending the catalog is empty by choice.
    pub catalog_error: Option<String>,
}

/// Renders iff both the catalog and the favorites have settled; callers may
/// invoke it as often as they like.
#[derive(Debug)]
pub struct RenderCoordinator {
    catalog: Arc<CatalogStore>,
    favorites: FavoritesSynchronizer,
    ui: Arc<RwLock<UiState>>,
    view_tx: watch::Sender<Option<GalleryView>>,
}

impl RenderCoordinator {
    pub fn new(
        catalog: Arc<CatalogStore>,
        favorites: FavoritesSynchronizer,
        ui: Arc<RwLock<UiState>>,
    ) -> Self {
        let (view_tx, _) = watch::channel(None);
        Self {
            catalog,
            favorites,
            ui,
            view_tx,
        }
    }

    /// Produce and publish a view. Returns false without rendering while
    /// either input is still unsettled.
    pub fn render(&self) -> bool {
        if !self.catalog.is_settled() || !self.favorites.is_settled() {
            debug!("[Render] skipped; inputs not settled yet");
            return false;
        }

        let snapshot = self.catalog.snapshot();
        let favorites = self.favorites.snapshot();

        let view = {
            let mut ui = self.ui.write();
            let visible = compute_visible(&snapshot, &ui.filter);
            let page = ui.pagination.page(&visible);

            GalleryView {
                items: page.items.iter().map(|t| (*t).clone()).collect(),
                favorites,
                current_page: page.current_page,
                total_pages: page.total_pages,
                visible_count: visible.len(),
                total_count: snapshot.len(),
                featured: visible
                    .iter()
                    .filter(|t| t.featured)
                    .map(|t| (*t).clone())
                    .collect(),
                editor_picks: visible
                    .iter()
                    .filter(|t| t.editor_pick)
                    .map(|t| (*t).clone())
                    .collect(),
                catalog_error: self.catalog.error(),
            }
        };

        self.view_tx.send_replace(Some(view));
        true
    }

    /// Completion signal. Receivers see `Some(view)` once the first render
    /// lands, then every subsequent view.
    pub fn subscribe(&self) -> watch::Receiver<Option<GalleryView>> {
        self.view_tx.subscribe()
    }

    pub fn current_view(&self) -> Option<GalleryView> {
        self.view_tx.borrow().clone()
    }
}
