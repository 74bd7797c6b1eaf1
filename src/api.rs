//! HTTP API for the PokéDex chat

mod handlers;
mod types;

pub use handlers::create_router;

use crate::pokeapi::{CacheControl, PokemonData};
use crate::sessions::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub data: Arc<dyn PokemonData>,
    pub cache: Arc<dyn CacheControl>,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        data: Arc<dyn PokemonData>,
        cache: Arc<dyn CacheControl>,
    ) -> Self {
        Self {
            sessions,
            data,
            cache,
        }
    }
}
