use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::trie::Trie;
use crate::value::{StateValue, SubscriptionId};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Per-path state store with pattern-routed change notifications.
///
/// The view-model writes with `set`; the UI reads with `get`/`get_as` and
/// observes with `subscribe`. Handlers run synchronously on the writer's
/// thread, after the value lock is released, so a handler may read the
/// store again.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: Trie<HandlerEntry>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: Trie::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store `value` at `path` and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    /// Store `value` only if it differs from what is there now.
    /// Returns whether subscribers were notified.
    pub fn set_if_changed<T: Any + Send + Sync + PartialEq>(&self, path: &str, value: T) -> bool {
        let unchanged = self
            .get(path)
            .is_some_and(|old| old.downcast_ref::<T>() == Some(&value));
        if unchanged {
            return false;
        }
        self.set(path, value);
        true
    }

    pub fn set_value(&self, path: &str, value: StateValue) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), value.clone());
        for entry in self.handlers.match_topic(path) {
            (entry.handler)(path, &value);
        }
    }

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Typed read: clone the value at `path` out as `T`.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.downcast_cloned::<T>())
    }

    /// Remove the value at `path` without notifying.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    /// Entries strictly under `{prefix}/`, ordered by path.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let child_prefix = format!("{}/", prefix);
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .range(child_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&child_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe writes to paths matching `pattern` (`+` and `#` wildcards).
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            HandlerEntry {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    /// Returns whether a subscription was actually removed.
    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) -> bool {
        self.handlers.remove(pattern, |entry| entry.id == id)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Footer {
        Loading,
        End,
    }

    #[test]
    fn set_then_get_typed() {
        let store = StateStore::new();
        store.set("feed/footer", Footer::End);

        assert_eq!(store.get_as::<Footer>("feed/footer"), Some(Footer::End));
        assert_eq!(store.get_as::<String>("feed/footer"), None);
        assert!(store.get("feed/detail").is_none());
    }

    #[test]
    fn overwrite_replaces() {
        let store = StateStore::new();
        store.set("feed/footer", Footer::Loading);
        store.set("feed/footer", Footer::End);
        assert_eq!(store.get_as::<Footer>("feed/footer"), Some(Footer::End));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn subscribers_see_matching_writes_only() {
        let store = StateStore::new();
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));

        let s = seen.clone();
        store.subscribe("feed/sheet/#", move |path, _| {
            s.lock().unwrap().push(path.to_string());
        });

        store.set("feed/sheet/replies", 1u32);
        store.set("feed/sheet/footer", Footer::End);
        store.set("feed/replies", 2u32);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["feed/sheet/replies", "feed/sheet/footer"]
        );
    }

    #[test]
    fn handler_receives_new_value_and_can_reread() {
        let store = Arc::new(StateStore::new());
        let got = Arc::new(Mutex::new(None::<Footer>));

        let (g, inner) = (got.clone(), store.clone());
        store.subscribe("feed/footer", move |path, value| {
            assert_eq!(value.downcast_ref::<Footer>(), Some(&Footer::End));
            // Value lock is not held while handlers run.
            *g.lock().unwrap() = inner.get_as::<Footer>(path);
        });

        store.set("feed/footer", Footer::End);
        assert_eq!(*got.lock().unwrap(), Some(Footer::End));
    }

    #[test]
    fn set_if_changed_skips_equal_values() {
        let store = StateStore::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        store.subscribe("feed/flags", move |_, _| {
            h.fetch_add(1, Ordering::Relaxed);
        });

        assert!(store.set_if_changed("feed/flags", true));
        assert!(!store.set_if_changed("feed/flags", true));
        assert!(store.set_if_changed("feed/flags", false));
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = StateStore::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        let id = store.subscribe("feed/+", move |_, _| {
            h.fetch_add(1, Ordering::Relaxed);
        });

        store.set("feed/toast", "a".to_string());
        assert!(store.unsubscribe("feed/+", id));
        assert!(!store.unsubscribe("feed/+", id));
        store.set("feed/toast", "b".to_string());

        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn scan_lists_children_only() {
        let store = StateStore::new();
        store.set("feed", 0u8);
        store.set("feed/detail", 1u8);
        store.set("feed/sheet/replies", 2u8);
        store.set("feedback", 3u8);

        let paths: Vec<String> = store.scan("feed").into_iter().map(|(k, _)| k).collect();
        assert_eq!(paths, vec!["feed/detail", "feed/sheet/replies"]);
        assert!(store.contains("feedback"));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn remove_is_silent() {
        let store = StateStore::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        store.subscribe("#", move |_, _| {
            h.fetch_add(1, Ordering::Relaxed);
        });
        store.set("x", 1u8);
        assert!(store.remove("x").is_some());
        assert!(store.is_empty());
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }
}
