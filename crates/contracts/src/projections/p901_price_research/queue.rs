//! Pending search queue persisted between visits.

use serde::{Deserialize, Serialize};

use crate::shared::storage::{get_json, set_json, KeyValueStore, PRICE_QUEUE_KEY};
use crate::usecases::common::{UseCaseError, UseCaseResult};

pub const QUEUE_PREVIEW_LEN: usize = 5;
pub const EMPTY_QUEUE_MESSAGE: &str = "Fila vazia!";
pub const CLEAR_QUEUE_CONFIRM: &str = "Limpar toda a fila?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedSearch {
    #[serde(deserialize_with = "code_as_string")]
    pub codigo: String,
    #[serde(default)]
    pub descricao: String,
}

impl QueuedSearch {
    pub fn new(codigo: impl Into<String>, descricao: impl Into<String>) -> Self {
        Self {
            codigo: codigo.into(),
            descricao: descricao.into(),
        }
    }
}

pub struct SearchQueue<S> {
    store: S,
}

impl<S: KeyValueStore> SearchQueue<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn items(&self) -> Vec<QueuedSearch> {
        get_json(&self.store, PRICE_QUEUE_KEY).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Appends entries whose code is not queued yet. Returns how many were added.
    pub fn add(&self, entries: impl IntoIterator<Item = QueuedSearch>) -> usize {
        let mut queue = self.items();
        let before = queue.len();
        for entry in entries {
            if !queue.iter().any(|q| same_code(&q.codigo, &entry.codigo)) {
                queue.push(entry);
            }
        }
        let added = queue.len() - before;
        set_json(&self.store, PRICE_QUEUE_KEY, &queue);
        added
    }

    pub fn remove(&self, codigo: &str) {
        let queue: Vec<QueuedSearch> = self
            .items()
            .into_iter()
            .filter(|q| !same_code(&q.codigo, codigo))
            .collect();
        set_json(&self.store, PRICE_QUEUE_KEY, &queue);
    }

    /// Peeks the head. The entry stays queued until removed.
    pub fn next(&self) -> UseCaseResult<QueuedSearch> {
        self.items()
            .into_iter()
            .next()
            .ok_or_else(|| UseCaseError::validation(EMPTY_QUEUE_MESSAGE))
    }

    pub fn clear(&self) {
        self.store.remove(PRICE_QUEUE_KEY);
    }

    /// First entries for the chip strip and the count of hidden ones.
    pub fn preview(&self) -> (Vec<QueuedSearch>, usize) {
        let items = self.items();
        let hidden = items.len().saturating_sub(QUEUE_PREVIEW_LEN);
        (items.into_iter().take(QUEUE_PREVIEW_LEN).collect(), hidden)
    }
}

/// Codes compare numerically when both parse, so "0150" and "150" match.
fn same_code(a: &str, b: &str) -> bool {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a.trim() == b.trim(),
    }
}

fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::storage::MemoryStore;

    #[test]
    fn test_add_dedupes_by_code() {
        let store = MemoryStore::new();
        let queue = SearchQueue::new(&store);
        assert_eq!(
            queue.add(vec![QueuedSearch::new("150", "Papel"), QueuedSearch::new("200", "Caneta")]),
            2
        );
        assert_eq!(queue.add(vec![QueuedSearch::new("0150", "Papel A4")]), 0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_next_remove_clear() {
        let store = MemoryStore::new();
        let queue = SearchQueue::new(&store);
        assert_eq!(queue.next().unwrap_err().message, EMPTY_QUEUE_MESSAGE);

        queue.add(vec![QueuedSearch::new("1", "a"), QueuedSearch::new("2", "b")]);
        assert_eq!(queue.next().unwrap().codigo, "1");
        queue.remove("1");
        assert_eq!(queue.next().unwrap().codigo, "2");
        queue.clear();
        assert!(queue.is_empty());
        assert!(store.get(PRICE_QUEUE_KEY).is_none());
    }

    #[test]
    fn test_preview_and_persistence() {
        let store = MemoryStore::new();
        store.set(PRICE_QUEUE_KEY, r#"[{"codigo": 1, "descricao": "x"}]"#);
        let queue = SearchQueue::new(&store);
        assert_eq!(queue.items()[0].codigo, "1");

        queue.add((2..=7).map(|i| QueuedSearch::new(i.to_string(), "")));
        let (head, hidden) = SearchQueue::new(&store).preview();
        assert_eq!(head.len(), QUEUE_PREVIEW_LEN);
        assert_eq!(hidden, 2);
    }
}
