//! Client-side synchronization engine for a dashboard theme gallery.
//!
//! The engine reconciles local UI state (filters, pagination, favorites)
//! against an unreliable remote preference store reachable over two
//! competing transports. Rendering is a snapshot broadcast; the host
//! front-end listens and paints.

pub mod api_client;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod pagination;
pub mod render;
pub mod session;
pub mod testing;
pub mod theming;

pub use vitrine_model as model;

pub use api_client::{ApiClient, ApiResponse};
pub use catalog::{CatalogSource, CatalogState, CatalogStore, HttpCatalogSource, ThemeDetails};
pub use config::{EngineConfig, SyncTunables};
pub use dispatcher::ActionDispatcher;
pub use error::{EngineError, EngineResult};
pub use favorites::transport::{
    PreferenceRecord, PreferenceTransport, RestPreferenceStore, ServicePreferenceStore,
};
pub use favorites::{FavoritesSynchronizer, SyncOutcome, SyncPhase};
pub use filter::compute_visible;
pub use pagination::{PageView, PaginationController};
pub use render::{GalleryView, RenderCoordinator, UiState};
pub use session::GallerySession;
pub use theming::{
    ActionStep, HttpThemingApi, ProgressEvent, StepStage, ThemeAction, ThemeActionRequest,
    ThemingApi,
};
