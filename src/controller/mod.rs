//! Favorites reconciliation controller.
//!
//! The stateful orchestrator tying identity, filters, and backend together.
//! Anonymous identities read the local favorites set and resolve each id
//! through the tip-lookup collaborator; authenticated identities query the
//! remote favorites API. Every refresh carries a generation number so a stale
//! response can never overwrite the results of a newer request.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::errors::AppError;
use crate::models::{FavoritePage, FilterDescriptor, TipSummary};
use crate::store::{KeyValueStore, LocalFavorites};

/// Fixed page size for the remote favorites path.
pub const REMOTE_PAGE_SIZE: u32 = 10;

/// Resolved identity driving backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated { auth_token: String },
}

/// Lookup collaborator resolving a favorite id into a display record.
#[async_trait]
pub trait TipLookup: Send + Sync {
    async fn fetch_tip_by_id(&self, id: &str) -> Result<TipSummary, AppError>;
}

/// Remote favorites collaborator: paginated query plus mutation passthrough.
#[async_trait]
pub trait RemoteFavorites: Send + Sync {
    async fn query(
        &self,
        filter: &FilterDescriptor,
        page_number: u32,
        page_size: u32,
        auth_token: &str,
    ) -> Result<FavoritePage, AppError>;

    async fn add(&self, id: &str, auth_token: &str) -> Result<(), AppError>;

    async fn remove(&self, id: &str, auth_token: &str) -> Result<(), AppError>;
}

/// Controller load state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No identity resolved yet
    Idle,
    /// Full (re)load in flight
    Loading,
    /// Incremental page fetch in flight; existing items stay visible
    LoadingMore,
    AnonymousLoaded,
    AuthenticatedLoaded,
    /// Load failed; message retained for the retry affordance
    Error(String),
}

/// Snapshot handed out by [`FavoritesController::begin_refresh`].
///
/// Carries the generation current at request time and the filter the request
/// was issued for; [`FavoritesController::complete_refresh`] applies the
/// result only while the generation still matches.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    generation: u64,
    pub filter: FilterDescriptor,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The favorites reconciliation controller.
pub struct FavoritesController<S: KeyValueStore> {
    identity: Identity,
    filter: FilterDescriptor,
    locals: LocalFavorites<S>,
    remote: Arc<dyn RemoteFavorites>,
    lookup: Arc<dyn TipLookup>,

    state: LoadState,
    tips: Vec<TipSummary>,
    current_page: u32,
    total_pages: u32,
    /// Whether the favorites list is the surface currently on screen;
    /// anonymous mutations only re-derive the list while viewing.
    viewing: bool,
    generation: u64,
    last_error: Option<String>,
}

impl<S: KeyValueStore> FavoritesController<S> {
    pub fn new(
        locals: LocalFavorites<S>,
        remote: Arc<dyn RemoteFavorites>,
        lookup: Arc<dyn TipLookup>,
    ) -> Self {
        Self {
            identity: Identity::Anonymous,
            filter: FilterDescriptor::default(),
            locals,
            remote,
            lookup,
            state: LoadState::Idle,
            tips: Vec::new(),
            current_page: 1,
            total_pages: 1,
            viewing: false,
            generation: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn tips(&self) -> &[TipSummary] {
        &self.tips
    }

    pub fn filter(&self) -> &FilterDescriptor {
        &self.filter
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether another page is available and no fetch is in flight.
    pub fn can_load_more(&self) -> bool {
        matches!(self.identity, Identity::Authenticated { .. })
            && self.current_page < self.total_pages
            && !self.is_fetching()
    }

    fn is_fetching(&self) -> bool {
        matches!(self.state, LoadState::Loading | LoadState::LoadingMore)
    }

    /// Mark whether the favorites list is the surface currently displayed.
    pub fn set_viewing(&mut self, viewing: bool) {
        self.viewing = viewing;
    }

    /// React to identity resolution or an identity transition.
    ///
    /// Any transition discards derived list state entirely and reloads from
    /// scratch; local favorites are never merged into the server set.
    pub async fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
        self.tips.clear();
        self.current_page = 1;
        self.total_pages = 1;
        self.reload().await;
    }

    /// Apply a filter change. While authenticated this invalidates loaded
    /// results and reloads from page 1; the anonymous list is never
    /// server-filtered and is left as is.
    pub async fn apply_filter(&mut self, filter: FilterDescriptor) {
        let changed = self.filter.filters_changed(&filter);
        self.filter = filter;
        if changed && matches!(self.identity, Identity::Authenticated { .. }) {
            self.filter.page = 1;
            self.reload().await;
        }
    }

    /// Full load for the current identity.
    pub async fn reload(&mut self) {
        match self.identity.clone() {
            Identity::Anonymous => self.load_anonymous().await,
            Identity::Authenticated { auth_token } => {
                let pending = self.begin_refresh();
                let result = self
                    .remote
                    .query(&pending.filter, 1, REMOTE_PAGE_SIZE, &auth_token)
                    .await;
                self.complete_refresh(&pending, result);
            }
        }
    }

    /// Start an authenticated refresh, invalidating any in-flight request.
    ///
    /// The initial load always forces pageNumber back to 1 regardless of the
    /// page carried in the URL; pagination restarts under the new filter.
    pub fn begin_refresh(&mut self) -> PendingLoad {
        self.generation += 1;
        self.state = LoadState::Loading;
        let mut filter = self.filter.clone();
        filter.page = 1;
        PendingLoad {
            generation: self.generation,
            filter,
        }
    }

    /// Apply the result of a refresh started with [`Self::begin_refresh`].
    ///
    /// Returns false (and changes nothing) when a newer refresh has started
    /// since: last request wins, stale results are discarded.
    pub fn complete_refresh(
        &mut self,
        pending: &PendingLoad,
        result: Result<FavoritePage, AppError>,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::debug!(
                generation = pending.generation,
                current = self.generation,
                "Discarding stale favorites response"
            );
            return false;
        }

        match result {
            Ok(page) => {
                self.tips = page.items;
                self.current_page = page.page_number.max(1);
                self.total_pages = page.total_pages.max(1);
                self.state = LoadState::AuthenticatedLoaded;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!("Favorites load failed: {}", e);
                self.last_error = Some(e.message());
                self.state = LoadState::Error(e.message());
            }
        }
        true
    }

    /// Load and resolve the anonymous favorites list.
    ///
    /// Ids come from the capped local set; each resolves through the lookup
    /// collaborator in parallel, best-effort. Failed lookups are dropped from
    /// the result, and surviving records are reassembled in insertion order.
    /// Anonymous favorites are never paginated server-side.
    pub async fn load_anonymous(&mut self) {
        self.state = LoadState::Loading;
        let ids = self.locals.effective_list();

        let mut lookups: JoinSet<(usize, Result<TipSummary, AppError>)> = JoinSet::new();
        for (index, id) in ids.into_iter().enumerate() {
            let lookup = Arc::clone(&self.lookup);
            lookups.spawn(async move { (index, lookup.fetch_tip_by_id(&id).await) });
        }

        let mut resolved: Vec<(usize, TipSummary)> = Vec::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, Ok(tip))) => resolved.push((index, tip)),
                Ok((_, Err(e))) => {
                    tracing::debug!("Dropping unresolvable favorite: {}", e);
                }
                Err(e) => {
                    tracing::warn!("Tip lookup task failed: {}", e);
                }
            }
        }
        resolved.sort_by_key(|(index, _)| *index);

        self.tips = resolved.into_iter().map(|(_, tip)| tip).collect();
        self.current_page = 1;
        self.total_pages = 1;
        self.state = LoadState::AnonymousLoaded;
        self.last_error = None;
    }

    /// Fetch the next page and append it to the displayed list.
    ///
    /// A no-op (not an error) when anonymous, when already on the last page,
    /// or while any fetch is in flight. On failure the already-loaded items
    /// are preserved and only the increment is lost.
    pub async fn load_more(&mut self) {
        if !self.can_load_more() {
            return;
        }
        let Identity::Authenticated { auth_token } = self.identity.clone() else {
            return;
        };

        let previous_state = std::mem::replace(&mut self.state, LoadState::LoadingMore);
        let next_page = self.current_page + 1;

        match self
            .remote
            .query(&self.filter, next_page, REMOTE_PAGE_SIZE, &auth_token)
            .await
        {
            Ok(page) => {
                self.tips.extend(page.items);
                self.current_page = next_page;
                self.total_pages = page.total_pages.max(1);
                self.state = LoadState::AuthenticatedLoaded;
                self.last_error = None;
            }
            Err(e) => {
                // Only the increment failed: restore the stable state and
                // keep every already-loaded item.
                tracing::warn!("Load more failed on page {}: {}", next_page, e);
                self.last_error = Some(e.message());
                self.state = previous_state;
            }
        }
    }

    /// Error message from the most recent failed load or load-more, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Save a tip to the identity's favorites.
    ///
    /// Anonymous: local set only, fire-and-forget unless the favorites list
    /// is on screen. Authenticated: delegated to the remote mutation endpoint;
    /// page state is never touched.
    pub async fn add_favorite(&mut self, id: &str) -> Result<(), AppError> {
        match self.identity.clone() {
            Identity::Anonymous => {
                self.locals.add(id);
                if self.viewing {
                    self.load_anonymous().await;
                }
                Ok(())
            }
            Identity::Authenticated { auth_token } => self.remote.add(id, &auth_token).await,
        }
    }

    /// Remove a tip from the identity's favorites.
    pub async fn remove_favorite(&mut self, id: &str) -> Result<(), AppError> {
        match self.identity.clone() {
            Identity::Anonymous => {
                self.locals.remove(id);
                if self.viewing {
                    self.load_anonymous().await;
                }
                Ok(())
            }
            Identity::Authenticated { auth_token } => {
                self.remote.remove(id, &auth_token).await?;
                if self.viewing {
                    // Drop the card in place; total_pages is server-owned and
                    // left untouched until the next query.
                    self.tips.retain(|tip| tip.id != id);
                }
                Ok(())
            }
        }
    }

    /// Whether a tip is in the anonymous local set.
    pub fn is_local_favorite(&self, id: &str) -> bool {
        self.locals.has(id)
    }
}
