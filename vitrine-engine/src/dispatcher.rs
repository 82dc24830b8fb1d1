//! Translates user intents into state changes, network requests, and
//! re-renders.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, warn};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::sleep;
use vitrine_model::{Selection, ThemeId};

use crate::catalog::{CatalogStore, ThemeDetails};
use crate::config::SyncTunables;
use crate::error::EngineError;
use crate::favorites::FavoritesSynchronizer;
use crate::filter::compute_visible;
use crate::render::{RenderCoordinator, UiState};
use crate::theming::{
    ActionStep, ProgressEvent, StepStage, ThemeAction, ThemeActionRequest, ThemingApi,
};

/// Entry point for everything the UI can ask the engine to do. Cloneable;
/// clones share all state.
#[derive(Clone)]
pub struct ActionDispatcher {
    catalog: Arc<CatalogStore>,
    favorites: FavoritesSynchronizer,
    ui: Arc<RwLock<UiState>>,
    render: Arc<RenderCoordinator>,
    theming: Arc<dyn ThemingApi>,
    source_app: String,
    debounce: Duration,
    progress_floor: Duration,
    search_generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("source_app", &self.source_app)
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    pub fn new(
        catalog: Arc<CatalogStore>,
        favorites: FavoritesSynchronizer,
        ui: Arc<RwLock<UiState>>,
        render: Arc<RenderCoordinator>,
        theming: Arc<dyn ThemingApi>,
        source_app: String,
        tunables: &SyncTunables,
    ) -> Self {
        Self {
            catalog,
            favorites,
            ui,
            render,
            theming,
            source_app,
            debounce: tunables.search_debounce(),
            progress_floor: tunables.progress_floor(),
            search_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set_mode_filter(&self, mode: Selection) {
        {
            let mut ui = self.ui.write();
            ui.filter.mode = mode;
            ui.pagination.reset();
        }
        self.render.render();
    }

    pub fn set_category_filter(&self, category: Selection) {
        {
            let mut ui = self.ui.write();
            ui.filter.category = category;
            ui.pagination.reset();
        }
        self.render.render();
    }

    /// Debounced search. Only the last text within a debounce window is
    /// committed; earlier keystrokes are superseded and never render.
    pub fn set_search_text(&self, text: String) {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let this = self.clone();
        tokio::spawn(async move {
            sleep(this.debounce).await;
            if this.search_generation.load(Ordering::SeqCst) != generation {
                return;
            }
            debug!("[Dispatch] committing search {text:?}");
            {
                let mut ui = this.ui.write();
                ui.filter.search = text;
                ui.pagination.reset();
            }
            this.render.render();
        });
    }

    pub fn first_page(&self) {
        self.ui.write().pagination.first_page();
        self.render.render();
    }

    pub fn prev_page(&self) {
        self.ui.write().pagination.prev_page();
        self.render.render();
    }

    pub fn next_page(&self) {
        let snapshot = self.catalog.snapshot();
        {
            let mut ui = self.ui.write();
            let visible_len = compute_visible(&snapshot, &ui.filter).len();
            ui.pagination.next_page(visible_len);
        }
        self.render.render();
    }

    pub fn last_page(&self) {
        let snapshot = self.catalog.snapshot();
        {
            let mut ui = self.ui.write();
            let visible_len = compute_visible(&snapshot, &ui.filter).len();
            ui.pagination.last_page(visible_len);
        }
        self.render.render();
    }

    pub fn go_to_page(&self, page: u32) {
        let snapshot = self.catalog.snapshot();
        {
            let mut ui = self.ui.write();
            let visible_len = compute_visible(&snapshot, &ui.filter).len();
            ui.pagination.go_to(page, visible_len);
        }
        self.render.render();
    }

    /// Optimistic toggle: the local flip renders before the save is even
    /// spawned. Rollback, if needed, arrives via the synchronizer's reload.
    pub fn toggle_favorite(&self, id: &ThemeId) {
        let snapshot = self.favorites.toggle_local(id);
        self.render.render();
        self.favorites.spawn_save(snapshot);
    }

    pub fn theme_details(&self, id: &ThemeId) -> ThemeDetails {
        self.catalog.details(id)
    }

    /// Apply `theme_id` to `dashboard`, streaming progress events.
    pub fn apply_theme(
        &self,
        dashboard: &str,
        theme_id: &ThemeId,
    ) -> mpsc::UnboundedReceiver<ProgressEvent> {
        self.run_action(ThemeActionRequest {
            dashboard: dashboard.to_string(),
            source_app: self.source_app.clone(),
            theme_id: Some(theme_id.clone()),
            action: ThemeAction::Apply,
        })
    }

    /// Restore `dashboard` to its unthemed state, streaming progress events.
    pub fn remove_theme(&self, dashboard: &str) -> mpsc::UnboundedReceiver<ProgressEvent> {
        self.run_action(ThemeActionRequest {
            dashboard: dashboard.to_string(),
            source_app: self.source_app.clone(),
            theme_id: None,
            action: ThemeAction::Remove,
        })
    }

    fn run_action(&self, request: ThemeActionRequest) -> mpsc::UnboundedReceiver<ProgressEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let this = self.clone();
        tokio::spawn(async move {
            this.drive_action(request, tx).await;
        });
        rx
    }

    /// Steps advance with the real request lifecycle. The floor only keeps a
    /// step visible long enough to read, it never fakes completion.
    async fn drive_action(
        &self,
        request: ThemeActionRequest,
        tx: mpsc::UnboundedSender<ProgressEvent>,
    ) {
        let emit = |event: ProgressEvent| {
            let _ = tx.send(event);
        };
        let step = |step: ActionStep, stage: StepStage| ProgressEvent::Step { step, stage };

        for s in ActionStep::ALL {
            emit(step(s, StepStage::Pending));
        }

        emit(step(ActionStep::Prepare, StepStage::Active));
        if let Some(theme_id) = &request.theme_id
            && self.catalog.find(theme_id).is_none()
        {
            let error = EngineError::NotFound(theme_id.clone());
            warn!("[Dispatch] {error}");
            emit(ProgressEvent::Failed {
                step: ActionStep::Prepare,
                error: error.to_string(),
            });
            return;
        }
        sleep(self.progress_floor).await;
        emit(step(ActionStep::Prepare, StepStage::Completed));

        emit(step(ActionStep::Submit, StepStage::Active));
        let (submitted, ()) = tokio::join!(
            self.theming.submit(&request),
            sleep(self.progress_floor)
        );
        if let Err(err) = submitted {
            warn!("[Dispatch] theme {} failed: {err}", request.action.as_str());
            emit(ProgressEvent::Failed {
                step: ActionStep::Submit,
                error: err.to_string(),
            });
            return;
        }
        emit(step(ActionStep::Submit, StepStage::Completed));

        emit(step(ActionStep::Refresh, StepStage::Active));
        self.render.render();
        sleep(self.progress_floor).await;
        emit(step(ActionStep::Refresh, StepStage::Completed));

        emit(ProgressEvent::Completed);
    }
}
