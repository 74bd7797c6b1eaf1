//! Cached PokéAPI client

use super::cache::ResponseCache;
use super::error::{FetchError, PokeApiError};
use super::format::{
    decode, flatten_chain, format_page, format_pokemon, format_species, format_type_listing,
    ChainSpecies, RawEvolutionChain, RawPage, RawPokemon, RawSpecies, RawTypeListing,
};
use super::transport::Transport;
use super::types::{CacheStats, Pokemon, PokemonPage, Species, TypeEntry};
use super::{CacheControl, PokemonData};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

type SharedFetch = Shared<BoxFuture<'static, Result<Value, FetchError>>>;

/// Data client over the PokéAPI.
///
/// Every read goes through [`PokeApiClient::fetch`], which consults the
/// response cache and coalesces concurrent misses for the same URL into a
/// single upstream request.
pub struct PokeApiClient<T> {
    base_url: String,
    transport: Arc<T>,
    cache: Arc<ResponseCache>,
    in_flight: Mutex<HashMap<String, SharedFetch>>,
}

impl<T: Transport + 'static> PokeApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T, cache_ttl: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport: Arc::new(transport),
            cache: Arc::new(ResponseCache::new(cache_ttl)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Spawn a task that purges expired responses every `interval`
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                client.purge_expired();
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the JSON document at `{base_url}{endpoint}`.
    async fn fetch(&self, endpoint: &str) -> Result<Value, PokeApiError> {
        let url = format!("{}{endpoint}", self.base_url);

        if let Some(data) = self.cache.get(&url) {
            tracing::debug!(%url, "Cache hit");
            return Ok(data);
        }

        let request = match self.join_or_start(&url) {
            Ok(cached) => return Ok(cached),
            Err(request) => request,
        };
        let result = request.clone().await;

        {
            let mut in_flight = self.in_flight();
            if in_flight.get(&url).is_some_and(|r| r.ptr_eq(&request)) {
                in_flight.remove(&url);
            }
        }

        result.map_err(|e| {
            tracing::warn!(%url, error = %e, "Upstream request failed");
            PokeApiError::from(e)
        })
    }

    /// Join the request already running for `url`, or start one.
    ///
    /// Returns `Ok` with cached data if a request finished between the cache
    /// check and taking the in-flight lock.
    fn join_or_start(&self, url: &str) -> Result<Value, SharedFetch> {
        let mut in_flight = self.in_flight();

        if let Some(existing) = in_flight.get(url) {
            tracing::debug!(%url, "Joining in-flight request");
            return Err(existing.clone());
        }
        if let Some(data) = self.cache.get(url) {
            return Ok(data);
        }

        tracing::debug!(%url, "Cache miss, requesting upstream");
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let key = url.to_string();
        let request = async move {
            let data = transport.get_json(&key).await?;
            cache.insert(key, data.clone());
            Ok::<_, FetchError>(data)
        }
        .boxed()
        .shared();

        in_flight.insert(url.to_string(), request.clone());
        Err(request)
    }
}

impl<T: Transport + 'static> CacheControl for PokeApiClient<T> {
    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Response cache cleared");
    }

    fn purge_expired(&self) -> usize {
        let purged = self.cache.purge_expired();
        if purged > 0 {
            tracing::info!(purged, "Purged expired responses");
        }
        purged
    }
}

/// Lower-case, trim and percent-encode a caller-supplied identifier.
fn normalize_identifier(identifier: &str) -> Result<String, PokeApiError> {
    let normalized = identifier.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(PokeApiError::InvalidIdentifier);
    }
    Ok(urlencoding::encode(&normalized).into_owned())
}

#[async_trait]
impl<T: Transport + 'static> PokemonData for PokeApiClient<T> {
    async fn get_pokemon(&self, identifier: &str) -> Result<Pokemon, PokeApiError> {
        let identifier = normalize_identifier(identifier)?;
        let data = self.fetch(&format!("/pokemon/{identifier}")).await?;
        Ok(format_pokemon(decode::<RawPokemon>(data)?))
    }

    async fn get_species(&self, species_id: u32) -> Result<Species, PokeApiError> {
        let data = self.fetch(&format!("/pokemon-species/{species_id}")).await?;
        format_species(decode::<RawSpecies>(data)?)
    }

    async fn get_evolution_chain(&self, chain_id: u32) -> Result<Vec<Pokemon>, PokeApiError> {
        let data = self.fetch(&format!("/evolution-chain/{chain_id}")).await?;
        let raw: RawEvolutionChain = decode(data)?;
        let members = flatten_chain(&raw.chain);

        tracing::debug!(chain_id, members = members.len(), "Resolving evolution chain");

        let keys: Vec<String> = members.iter().map(ChainSpecies::lookup_key).collect();
        future::try_join_all(keys.iter().map(|key| self.get_pokemon(key))).await
    }

    async fn get_pokemon_by_type(&self, type_name: &str) -> Result<Vec<TypeEntry>, PokeApiError> {
        let type_name = normalize_identifier(type_name)?;
        let data = self.fetch(&format!("/type/{type_name}")).await?;
        Ok(format_type_listing(decode::<RawTypeListing>(data)?))
    }

    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonPage, PokeApiError> {
        let data = self
            .fetch(&format!("/pokemon?limit={limit}&offset={offset}"))
            .await?;
        Ok(format_page(decode::<RawPage>(data)?))
    }
}
