//! PokéAPI data access
//!
//! [`PokemonData`] is the seam the conversation engine talks to.
//! [`PokeApiClient`] implements it over HTTP with a TTL response cache.

mod cache;
mod client;
mod error;
mod format;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
pub(crate) use format::fixtures;

pub use cache::DEFAULT_TTL;
pub use client::{PokeApiClient, DEFAULT_BASE_URL};
pub use error::{ErrorCode, FetchError, PokeApiError};
pub use format::capitalize;
pub use transport::ReqwestTransport;
pub use types::{
    Ability, CacheStats, NamedEntry, Pokemon, PokemonPage, PokemonType, Species, Sprites, Stats,
    TypeEntry,
};

use async_trait::async_trait;
use futures::future;
use std::sync::Arc;

/// Number of listing entries scanned by [`PokemonData::search_pokemon`]
pub const SEARCH_INDEX_SIZE: u32 = 1000;

/// Default number of name suggestions offered after a failed lookup
pub const SUGGESTION_LIMIT: usize = 5;

/// Page size used when a listing request names none
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Pokémon data operations used by the conversation engine
#[async_trait]
pub trait PokemonData: Send + Sync {
    /// Look up one Pokémon by name or numeric id (case-insensitive)
    async fn get_pokemon(&self, identifier: &str) -> Result<Pokemon, PokeApiError>;

    async fn get_species(&self, species_id: u32) -> Result<Species, PokeApiError>;

    /// Every member of an evolution chain in pre-order
    async fn get_evolution_chain(&self, chain_id: u32) -> Result<Vec<Pokemon>, PokeApiError>;

    /// At most [`format::TYPE_LISTING_CAP`] Pokémon of the given type
    async fn get_pokemon_by_type(&self, type_name: &str) -> Result<Vec<TypeEntry>, PokeApiError>;

    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonPage, PokeApiError>;

    /// Look up several Pokémon concurrently; fails if any lookup fails.
    /// Results keep the order of `identifiers`.
    async fn get_multiple_pokemon(
        &self,
        identifiers: &[String],
    ) -> Result<Vec<Pokemon>, PokeApiError> {
        if identifiers.is_empty() {
            return Err(PokeApiError::InvalidIdentifiers);
        }
        future::try_join_all(identifiers.iter().map(|id| self.get_pokemon(id))).await
    }

    /// Names from the first [`SEARCH_INDEX_SIZE`] listing entries containing
    /// `partial` (case-insensitive), in listing order, at most `limit`.
    async fn search_pokemon(&self, partial: &str, limit: usize) -> Result<Vec<String>, PokeApiError> {
        let needle = partial.trim().to_lowercase();
        let page = self.list_pokemon(SEARCH_INDEX_SIZE, 0).await?;
        Ok(page
            .results
            .into_iter()
            .map(|entry| entry.name)
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(limit)
            .collect())
    }
}

/// Inspection and invalidation of a response cache
pub trait CacheControl: Send + Sync {
    /// Fresh entries only
    fn cache_stats(&self) -> CacheStats;

    fn clear_cache(&self);

    /// Drop every expired entry; returns how many went
    fn purge_expired(&self) -> usize;
}

#[async_trait]
impl<T: PokemonData + ?Sized> PokemonData for Arc<T> {
    async fn get_pokemon(&self, identifier: &str) -> Result<Pokemon, PokeApiError> {
        (**self).get_pokemon(identifier).await
    }

    async fn get_species(&self, species_id: u32) -> Result<Species, PokeApiError> {
        (**self).get_species(species_id).await
    }

    async fn get_evolution_chain(&self, chain_id: u32) -> Result<Vec<Pokemon>, PokeApiError> {
        (**self).get_evolution_chain(chain_id).await
    }

    async fn get_pokemon_by_type(&self, type_name: &str) -> Result<Vec<TypeEntry>, PokeApiError> {
        (**self).get_pokemon_by_type(type_name).await
    }

    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonPage, PokeApiError> {
        (**self).list_pokemon(limit, offset).await
    }

    async fn get_multiple_pokemon(
        &self,
        identifiers: &[String],
    ) -> Result<Vec<Pokemon>, PokeApiError> {
        (**self).get_multiple_pokemon(identifiers).await
    }

    async fn search_pokemon(&self, partial: &str, limit: usize) -> Result<Vec<String>, PokeApiError> {
        (**self).search_pokemon(partial, limit).await
    }
}
