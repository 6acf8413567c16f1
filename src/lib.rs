//! LifeHacks Favorites Engine
//!
//! Favorites reconciliation and filtered-pagination engine for the LifeHacks
//! tips site. Manages a user's saved-tip set across two backends — a durable
//! local store for anonymous visitors and the remote paginated favorites API
//! for authenticated identities — and keeps list state consistent across
//! identity transitions and URL-driven filter/sort/page changes.

pub mod codec;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod remote;
pub mod store;

pub use config::Config;
pub use controller::{
    FavoritesController, Identity, LoadState, PendingLoad, RemoteFavorites, TipLookup,
    REMOTE_PAGE_SIZE,
};
pub use errors::AppError;
pub use models::{FavoritePage, FilterDescriptor, OrderBy, SortDirection, SortOption, TipSummary};
pub use remote::{RemoteFavoritesClient, TipLookupClient};
pub use store::{
    FileStore, KeyValueStore, LocalFavorites, MemoryStore, StoreError, ANONYMOUS_MAX_FAVORITES,
    FAVORITES_STORAGE_KEY,
};

#[cfg(test)]
mod tests;
