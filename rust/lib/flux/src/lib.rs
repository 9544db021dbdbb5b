//! Flux: the reactive state layer between the feed view-models and the UI.
//!
//! Rust owns all state and logic; the platform shell renders whatever is
//! published and sends user actions back as requests.
//!
//! - `get(path)` reads state at a path (Arc clone, no data copy)
//! - `emit(path, payload)` sends a request, routed to matching handlers
//! - `subscribe(pattern)` observes state writes
//!
//! Paths are `/`-separated (`feed/replies`, `feed/sheet/footer`). Patterns
//! add MQTT-style wildcards: `+` for one segment, `#` for the rest.

pub mod app;
pub mod router;
pub mod store;
pub mod trie;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Payload, Router};
pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
