use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use crate::router::{Payload, Router};
use crate::store::StateStore;
use crate::value::{StateValue, SubscriptionId};

/// Flux ties a [`StateStore`] to a [`Router`].
///
/// The platform shell only ever talks to this type:
/// - `get(path)` / `get_as(path)` to read what the view-model published
/// - `emit(path, payload)` to send a user action
/// - `subscribe(pattern, ..)` to re-render on change
///
/// ```ignore
/// let flux = Flux::new();
/// flux.on_typed::<LoadMore, _, _>("feed/load-more", move |_, _| {
///     let vm = vm.clone();
///     async move { vm.load_more().await }
/// });
/// flux.subscribe("feed/#", |path, _| redraw(path));
/// flux.emit("feed/load-more", LoadMore).await;
/// ```
pub struct Flux {
    store: Arc<StateStore>,
    router: Router,
}

impl Flux {
    pub fn new() -> Self {
        Self::with_store(Arc::new(StateStore::new()))
    }

    /// Build around an existing store, e.g. one a view-model already writes to.
    pub fn with_store(store: Arc<StateStore>) -> Self {
        Self {
            store,
            router: Router::new(),
        }
    }

    // ====================================================================
    // State
    // ====================================================================

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.store.get(path)
    }

    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.store.get_as(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.store.contains(path)
    }

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        self.store.subscribe(pattern, handler)
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) -> bool {
        self.store.unsubscribe(pattern, id)
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    // ====================================================================
    // Requests
    // ====================================================================

    /// Send a request and wait for every matching handler to finish.
    pub async fn emit<T: Any + Send + Sync>(&self, path: &str, payload: T) {
        self.emit_arc(path, Arc::new(payload)).await;
    }

    pub async fn emit_arc(&self, path: &str, payload: Payload) {
        self.router
            .dispatch(path, payload, Arc::clone(&self.store))
            .await;
    }

    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.router.on(pattern, handler);
    }

    pub fn on_typed<T, F, Fut>(&self, pattern: &str, handler: F)
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.router.on_typed(pattern, handler);
    }

    pub fn has_handler(&self, path: &str) -> bool {
        self.router.matches(path)
    }
}

impl Default for Flux {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Loading {
        Loading,
        Success(Vec<String>),
    }

    #[tokio::test]
    async fn request_updates_state_and_notifies() {
        let flux = Flux::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        flux.subscribe("feed/#", move |path, value| {
            s.lock()
                .unwrap()
                .push((path.to_string(), value.downcast_cloned::<Loading>()));
        });

        flux.on("feed/refresh", |_, _, store: Arc<StateStore>| async move {
            store.set("feed/replies", Loading::Loading);
            store.set("feed/replies", Loading::Success(vec!["r1".into()]));
        });

        flux.emit("feed/refresh", ()).await;

        assert_eq!(
            flux.get_as::<Loading>("feed/replies"),
            Some(Loading::Success(vec!["r1".into()]))
        );
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, Some(Loading::Loading));
    }

    #[tokio::test]
    async fn shared_store_is_visible_both_ways() {
        let store = Arc::new(StateStore::new());
        let flux = Flux::with_store(store.clone());

        store.set("feed/toast", "hi".to_string());
        assert!(flux.contains("feed/toast"));

        flux.on_typed::<String, _, _>("feed/toast/set", |msg, store| async move {
            store.set("feed/toast", (*msg).clone());
        });
        flux.emit("feed/toast/set", "bye".to_string()).await;
        assert_eq!(store.get_as::<String>("feed/toast").as_deref(), Some("bye"));
    }

    #[test]
    fn has_handler_uses_matching() {
        let flux = Flux::new();
        flux.on("feed/#", |_, _, _| async {});
        assert!(flux.has_handler("feed/like"));
        assert!(!flux.has_handler("home/like"));
    }

    fn _assert_flux_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Flux>();
    }
}
