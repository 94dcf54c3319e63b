//! Theme catalogue and persisted theme preference.
//!
//! Four themes are declared in a fixed order; cycling walks that order and
//! wraps around. Unknown ids (stale storage, typos) fall back to the first
//! theme.

use super::storage::{KeyValueStore, THEME_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeId {
    #[default]
    Light,
    Dark,
    DarkGray,
    Nativa,
}

impl ThemeId {
    /// Value written to `data-theme` and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Light => "light",
            ThemeId::Dark => "dark",
            ThemeId::DarkGray => "dark-gray",
            ThemeId::Nativa => "nativa",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeId::Light => "Claro",
            ThemeId::Dark => "Escuro",
            ThemeId::DarkGray => "Cinza",
            ThemeId::Nativa => "Nativa",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ThemeId::Light => "☀️",
            ThemeId::Dark => "🌙",
            ThemeId::DarkGray => "🌑",
            ThemeId::Nativa => "🌲",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ThemeId::Light => "Tema claro padrão",
            ThemeId::Dark => "Tema escuro azulado",
            ThemeId::DarkGray => "Estilo ChatGPT/Gemini",
            ThemeId::Nativa => "Verde floresta",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeId::Dark | ThemeId::DarkGray)
    }

    pub fn from_id(s: &str) -> Self {
        Self::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .unwrap_or_default()
    }

    pub fn all() -> [ThemeId; 4] {
        [ThemeId::Light, ThemeId::Dark, ThemeId::DarkGray, ThemeId::Nativa]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|t| t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

/// Theme preference bound to a store.
pub struct ThemePreference<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ThemePreference<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> ThemeId {
        self.store
            .get(THEME_KEY)
            .map(|s| ThemeId::from_id(&s))
            .unwrap_or_default()
    }

    pub fn save(&self, theme: ThemeId) {
        self.store.set(THEME_KEY, theme.as_str());
    }

    /// Advances from the stored theme and persists the result.
    pub fn cycle(&self) -> ThemeId {
        let next = self.load().next();
        self.save(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::storage::MemoryStore;

    #[test]
    fn test_cycle_visits_all_themes_in_order() {
        let mut visited = vec![ThemeId::Light];
        let mut current = ThemeId::Light;
        for _ in 0..4 {
            current = current.next();
            visited.push(current);
        }
        assert_eq!(
            visited,
            vec![
                ThemeId::Light,
                ThemeId::Dark,
                ThemeId::DarkGray,
                ThemeId::Nativa,
                ThemeId::Light
            ]
        );
    }

    #[test]
    fn test_persisted_theme_survives_reload() {
        let store = MemoryStore::new();
        let prefs = ThemePreference::new(&store);
        prefs.save(ThemeId::DarkGray);
        assert_eq!(prefs.cycle(), ThemeId::Nativa);

        let reloaded = ThemePreference::new(&store);
        assert_eq!(reloaded.load(), ThemeId::Nativa);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("nativa"));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_light() {
        assert_eq!(ThemeId::from_id("forest"), ThemeId::Light);
        assert_eq!(ThemeId::from_id("dark-gray"), ThemeId::DarkGray);
    }
}
