use std::any::{Any, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::warn;

use crate::store::StateStore;
use crate::trie::Trie;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Type-erased request payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

type ErasedHandler = Arc<dyn Fn(String, Payload, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Request router: maps path patterns to async handlers.
///
/// Every handler whose pattern matches a dispatched path runs, one after
/// another, in match order. A path with no handler is a silent no-op.
pub struct Router {
    trie: Trie<ErasedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { trie: Trie::new() }
    }

    /// Register a handler that receives the raw payload.
    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: ErasedHandler = Arc::new(
            move |path: String, payload: Payload, store: Arc<StateStore>| -> BoxFuture {
                Box::pin(handler(path, payload, store))
            },
        );
        self.trie.insert(pattern, handler);
    }

    /// Register a handler for payloads of type `T`.
    ///
    /// A dispatch carrying any other type is logged and skipped instead of
    /// reaching the handler.
    pub fn on_typed<T, F, Fut>(&self, pattern: &str, handler: F)
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.on(pattern, move |path, payload: Payload, store| {
            let handler = handler.clone();
            async move {
                match payload.downcast::<T>() {
                    Ok(typed) => handler(typed, store).await,
                    Err(_) => warn!("request {} dropped: payload is not {}", path, type_name::<T>()),
                }
            }
        });
    }

    /// Run every handler matching `path`.
    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) {
        for handler in self.trie.match_topic(path) {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
    }

    /// Whether a handler is registered under exactly `pattern`.
    pub fn has_handler(&self, pattern: &str) -> bool {
        self.trie.has_pattern(pattern)
    }

    /// Whether dispatching `path` would reach any handler.
    pub fn matches(&self, path: &str) -> bool {
        !self.trie.match_topic(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn store() -> Arc<StateStore> {
        Arc::new(StateStore::new())
    }

    #[tokio::test]
    async fn dispatch_reaches_exact_and_wildcard_handlers() {
        let router = Router::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (pattern, tag) in [("feed/refresh", "exact"), ("feed/#", "all")] {
            let order = order.clone();
            router.on(pattern, move |_, _, _| {
                let order = order.clone();
                async move { order.lock().unwrap().push(tag) }
            });
        }

        router.dispatch("feed/refresh", Arc::new(()), store()).await;
        assert_eq!(*order.lock().unwrap(), vec!["exact", "all"]);
    }

    #[tokio::test]
    async fn unmatched_path_is_noop() {
        let router = Router::new();
        router.dispatch("feed/nothing", Arc::new(()), store()).await;
        assert!(!router.matches("feed/nothing"));
    }

    #[tokio::test]
    async fn typed_handler_gets_payload() {
        #[derive(Debug)]
        struct DeleteReq {
            id: String,
        }

        let router = Router::new();
        router.on_typed::<DeleteReq, _, _>("feed/delete", |req, store| async move {
            store.set("feed/toast", format!("deleted {}", req.id));
        });

        let s = store();
        router
            .dispatch("feed/delete", Arc::new(DeleteReq { id: "9".into() }), s.clone())
            .await;
        assert_eq!(s.get_as::<String>("feed/toast").as_deref(), Some("deleted 9"));
    }

    #[tokio::test]
    async fn typed_handler_skips_wrong_payload() {
        let router = Router::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        router.on_typed::<u32, _, _>("feed/like", move |_, _| {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::Relaxed);
            }
        });

        router.dispatch("feed/like", Arc::new("nope"), store()).await;
        router.dispatch("feed/like", Arc::new(7u32), store()).await;
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn has_handler_vs_matches() {
        let router = Router::new();
        router.on("feed/+", |_, _, _| async {});

        assert!(router.has_handler("feed/+"));
        assert!(!router.has_handler("feed/refresh"));
        assert!(router.matches("feed/refresh"));
        assert!(!router.matches("feed/sheet/refresh"));
    }
}
