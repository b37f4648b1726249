use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::KvStore;

/// Storage key holding the JSON-serialized checklist array.
pub const CHECKLIST_KEY: &str = "checklist";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id:         String,
    pub title:      String,
    pub done:       bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(), title: title.to_owned(),
            done: false, created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub done:  Option<bool>,
}

// ─── Checklist ────────────────────────────────────────────────────────────────

/// Newest-first checklist. Each mutation writes the whole list back to the
/// store; persistence is best effort.
pub struct TodoList<S: KvStore> {
    store: S,
    items: Vec<Todo>,
}

impl<S: KvStore> TodoList<S> {
    /// Missing or unreadable data yields an empty list.
    pub fn load(store: S) -> Self {
        let items = match store.get(CHECKLIST_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("stored checklist is corrupt, starting empty: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e)   => {
                tracing::warn!("could not read checklist: {e}");
                Vec::new()
            }
        };
        Self { store, items }
    }

    pub fn items(&self) -> &[Todo] { &self.items }

    pub fn open_items(&self) -> impl Iterator<Item = &Todo> {
        self.items.iter().filter(|t| !t.done)
    }

    /// The single item whose id starts with `prefix`, if exactly one does.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&Todo> {
        if prefix.is_empty() { return None; }
        let mut hits = self.items.iter().filter(|t| t.id.starts_with(prefix));
        match (hits.next(), hits.next()) {
            (Some(t), None) => Some(t),
            _               => None,
        }
    }

    pub fn add(&mut self, title: &str) -> Option<&Todo> {
        let title = title.trim();
        if title.is_empty() { return None; }
        self.items.insert(0, Todo::new(title));
        self.persist();
        self.items.first()
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(t) = self.items.iter_mut().find(|t| t.id == id) else { return false };
        t.done = !t.done;
        self.persist();
        true
    }

    pub fn update(&mut self, id: &str, patch: TodoPatch) -> bool {
        let Some(t) = self.items.iter_mut().find(|t| t.id == id) else { return false };
        if let Some(title) = patch.title { t.title = title; }
        if let Some(done)  = patch.done  { t.done  = done; }
        self.persist();
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(idx) = self.items.iter().position(|t| t.id == id) else { return false };
        self.items.remove(idx);
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    #[cfg(test)]
    pub fn into_store(self) -> S { self.store }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(j)  => j,
            Err(e) => { tracing::warn!("could not serialize checklist: {e}"); return; }
        };
        if let Err(e) = self.store.set(CHECKLIST_KEY, &json) {
            tracing::warn!("could not save checklist: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::other("disk on fire").into())
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    fn empty() -> TodoList<MemoryStore> {
        TodoList::load(MemoryStore::default())
    }

    #[test]
    fn add_toggle_remove_leaves_the_list_empty() {
        let mut list = empty();
        let id = list.add("Read Ch.3").expect("added").id.clone();
        assert!(list.toggle(&id));
        assert!(list.items()[0].done);
        assert!(list.remove(&id));
        assert!(list.items().is_empty());
    }

    #[test]
    fn blank_titles_are_ignored() {
        let mut list = empty();
        assert!(list.add("").is_none());
        assert!(list.add("   \t").is_none());
        assert!(list.items().is_empty());
        assert_eq!(list.into_store().get(CHECKLIST_KEY).expect("get"), None);
    }

    #[test]
    fn newest_items_come_first_and_titles_are_trimmed() {
        let mut list = empty();
        list.add("first");
        list.add("  second  ");
        let titles: Vec<_> = list.items().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert!(list.items().iter().all(|t| !t.done));
        assert_ne!(list.items()[0].id, list.items()[1].id);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut list = empty();
        list.add("keep me");
        assert!(!list.toggle("nope"));
        assert!(!list.remove("nope"));
        assert!(!list.update("nope", TodoPatch { title: Some("x".into()), done: None }));
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].title, "keep me");
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut list = empty();
        let id = list.add("draft").expect("added").id.clone();
        assert!(list.update(&id, TodoPatch { title: Some("final".into()), done: None }));
        assert_eq!(list.items()[0].title, "final");
        assert!(!list.items()[0].done);
        assert!(list.update(&id, TodoPatch { title: None, done: Some(true) }));
        assert_eq!(list.items()[0].title, "final");
        assert!(list.items()[0].done);
    }

    #[test]
    fn mutations_are_persisted_and_reloaded() {
        let mut list = empty();
        let id = list.add("a").expect("added").id.clone();
        list.add("b");
        list.toggle(&id);

        let reloaded = TodoList::load(list.into_store());
        let items = reloaded.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "b");
        assert!(items[1].done);
        assert_eq!(reloaded.open_items().count(), 1);
    }

    #[test]
    fn stored_json_uses_camel_case_created_at() {
        let mut list = empty();
        list.add("x");
        let raw = list.into_store().get(CHECKLIST_KEY).expect("get").expect("stored");
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"done\":false"));
    }

    #[test]
    fn clear_empties_and_persists() {
        let mut list = empty();
        list.add("a");
        list.add("b");
        list.clear();
        let reloaded = TodoList::load(list.into_store());
        assert!(reloaded.items().is_empty());
    }

    #[test]
    fn corrupt_data_loads_as_empty() {
        let mut store = MemoryStore::default();
        store.set(CHECKLIST_KEY, "{not json").expect("set");
        assert!(TodoList::load(store).items().is_empty());
    }

    #[test]
    fn store_failures_do_not_block_mutations() {
        let mut list = TodoList::load(BrokenStore);
        assert!(list.items().is_empty());
        let id = list.add("still works").expect("added").id.clone();
        assert!(list.toggle(&id));
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn prefix_lookup_requires_a_unique_match() {
        let mut store = MemoryStore::default();
        store.set(CHECKLIST_KEY, r#"[
            {"id":"abc-1","title":"one","done":false,"createdAt":"2026-10-16T10:00:00Z"},
            {"id":"abd-2","title":"two","done":true,"createdAt":"2026-10-15T10:00:00.123Z"}
        ]"#).expect("set");
        let list = TodoList::load(store);
        assert_eq!(list.find_by_prefix("abc").map(|t| t.title.as_str()), Some("one"));
        assert!(list.find_by_prefix("ab").is_none());
        assert!(list.find_by_prefix("").is_none());
        assert!(list.find_by_prefix("zzz").is_none());
    }
}
