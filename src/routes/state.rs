use std::sync::Arc;

use crate::{
    config::Config,
    db::{
        MemorySessionStore, MemoryStore, MovieRepository, ReviewRepository, SessionStore,
        UserRepository, WatchlistRepository,
    },
};

/// Shared application state
///
/// Every store is held behind its capability trait so handlers never see
/// which backend is serving them.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub users: Arc<dyn UserRepository>,
    pub watchlists: Arc<dyn WatchlistRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires one record store into every repository slot
    pub fn new<S>(store: S, sessions: Arc<dyn SessionStore>, config: Config) -> Self
    where
        S: MovieRepository + ReviewRepository + UserRepository + WatchlistRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            movies: store.clone(),
            reviews: store.clone(),
            users: store.clone(),
            watchlists: store,
            sessions,
            config: Arc::new(config),
        }
    }

    /// State backed entirely by process memory
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            MemoryStore::new(),
            Arc::new(MemorySessionStore::new()),
            config,
        )
    }
}
