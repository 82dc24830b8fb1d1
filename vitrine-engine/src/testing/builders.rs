//! Fixture builders.

use vitrine_model::{ThemeId, ThemeRecord};

/// Minimal theme record; tests override fields they care about.
pub fn theme(id: &str, name: &str, mode: &str, category: &str, rank: i64) -> ThemeRecord {
    ThemeRecord {
        id: ThemeId::from(id),
        name: name.to_string(),
        description: format!("{name} theme"),
        mode: mode.to_string(),
        category: category.to_string(),
        image: format!("{id}.png"),
        rank,
        featured: false,
        editor_pick: false,
        features: None,
    }
}
