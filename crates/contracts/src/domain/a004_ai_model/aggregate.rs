use serde::{Deserialize, Serialize};

use crate::shared::storage::{KeyValueStore, SELECTED_MODEL_KEY, SELECTED_MODEL_NAME_KEY};

pub const DEFAULT_MODEL_ID: &str = "arcee-ai/trinity-mini:free";
pub const DEFAULT_MODEL_NAME: &str = "Trinity Mini";

/// Entry of `GET /api/ia/models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context_window: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<AiModel>,
    #[serde(default)]
    pub default: Option<String>,
}

impl ModelsResponse {
    pub fn find(&self, id: &str) -> Option<&AiModel> {
        self.models.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedModel {
    pub id: String,
    pub name: String,
}

impl Default for SelectedModel {
    fn default() -> Self {
        Self {
            id: DEFAULT_MODEL_ID.to_string(),
            name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl SelectedModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Last globally selected model, persisted across page loads.
pub struct ModelPreference<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ModelPreference<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored selection, if any. A missing name falls back to the id.
    pub fn stored(&self) -> Option<SelectedModel> {
        let id = self.store.get(SELECTED_MODEL_KEY).filter(|s| !s.is_empty())?;
        let name = self
            .store
            .get(SELECTED_MODEL_NAME_KEY)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.clone());
        Some(SelectedModel { id, name })
    }

    pub fn load(&self) -> SelectedModel {
        self.stored().unwrap_or_default()
    }

    /// Resolves the selection against a loaded catalogue: stored id first,
    /// then the server default, then the built-in default.
    pub fn resolve(&self, catalogue: &ModelsResponse) -> SelectedModel {
        let id = self
            .store
            .get(SELECTED_MODEL_KEY)
            .or_else(|| catalogue.default.clone());
        match id {
            Some(id) => match catalogue.find(&id) {
                Some(model) => SelectedModel::new(&model.id, &model.name),
                None => SelectedModel::new(id, DEFAULT_MODEL_NAME),
            },
            None => SelectedModel::default(),
        }
    }

    pub fn save(&self, model: &SelectedModel) {
        self.store.set(SELECTED_MODEL_KEY, &model.id);
        self.store.set(SELECTED_MODEL_NAME_KEY, &model.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::storage::MemoryStore;

    fn catalogue() -> ModelsResponse {
        serde_json::from_str(
            r#"{"models": [
                {"id": "a/x", "name": "X", "icon": "🤖", "tier": "free", "description": "", "context_window": 8000},
                {"id": "b/y", "name": "Y", "icon": "🧠", "tier": "pro", "description": ""}
            ], "default": "b/y"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_when_nothing_stored() {
        let store = MemoryStore::new();
        let pref = ModelPreference::new(&store);
        assert_eq!(pref.load(), SelectedModel::default());
        assert_eq!(pref.resolve(&catalogue()).id, "b/y");
    }

    #[test]
    fn test_saved_selection_wins() {
        let store = MemoryStore::new();
        ModelPreference::new(&store).save(&SelectedModel::new("a/x", "X"));
        let pref = ModelPreference::new(&store);
        assert_eq!(pref.load(), SelectedModel::new("a/x", "X"));
        assert_eq!(pref.resolve(&catalogue()).name, "X");
    }
}
