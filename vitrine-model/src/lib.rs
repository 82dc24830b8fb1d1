//! Core data model definitions shared across Vitrine crates.
#![allow(missing_docs)]

pub mod favorites;
pub mod filter;
pub mod ids;
pub mod pagination;
pub mod prelude;
pub mod theme;

// Intentionally curated re-exports for downstream consumers.
pub use favorites::FavoriteSet;
pub use filter::{FilterState, Selection};
pub use ids::ThemeId;
pub use pagination::PaginationState;
pub use theme::{CatalogDocument, ThemeRecord};
