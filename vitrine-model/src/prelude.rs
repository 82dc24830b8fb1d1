//! Convenience re-exports for consumers of the model crate.

pub use crate::favorites::FavoriteSet;
pub use crate::filter::{FilterState, Selection};
pub use crate::ids::ThemeId;
pub use crate::pagination::PaginationState;
pub use crate::theme::{CatalogDocument, ThemeRecord};
