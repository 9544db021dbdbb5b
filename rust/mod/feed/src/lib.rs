//! Feed detail screen: reply-tree reconciliation, paging and local lists.
//!
//! [`FeedViewModel`] owns the screen and publishes its state to a flux
//! store under `feed/*`. [`bind::register_handlers`] routes shell requests
//! to it. The backend and the local stores sit behind the traits in
//! [`repository`].

pub mod bind;
pub mod blacklist;
pub mod dao;
pub mod decorate;
pub mod error;
pub mod local;
pub mod model;
pub mod paging;
pub mod reconcile;
pub mod repository;
pub mod request;
pub mod state;
pub mod viewmodel;

#[cfg(test)]
pub(crate) mod testing;

pub use bind::register_handlers;
pub use blacklist::KvBlackList;
pub use error::FeedError;
pub use local::LocalHistoryFavorite;
pub use model::{FeedDetail, FeedEntity, FeedItem, LikeType, StringEntity};
pub use reconcile::ReplyTree;
pub use repository::{BlackListRepo, FeedApi, HistoryFavoriteRepo};
pub use state::{FooterState, LoadingState};
pub use viewmodel::{FeedDeps, FeedOptions, FeedViewModel, ReplyTarget};
