//! In-memory data client for conversation tests

use crate::pokeapi::{
    capitalize, Ability, NamedEntry, PokeApiError, Pokemon, PokemonData, PokemonPage, Species,
    Sprites, Stats, TypeEntry,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn pokemon(id: u32, name: &str, base: [u32; 6]) -> Pokemon {
    let [hp, attack, defense, special_attack, special_defense, speed] = base.map(Some);
    Pokemon {
        id,
        name: name.to_string(),
        name_capitalized: capitalize(name),
        types: vec!["electric".to_string()],
        stats: Stats::new(hp, attack, defense, special_attack, special_defense, speed),
        abilities: vec![Ability {
            name: "static".to_string(),
            is_hidden: false,
        }],
        sprites: Sprites::default(),
        height: 0.4,
        weight: 6.0,
        species_id: id,
    }
}

pub fn species(id: u32, name: &str, evolution_chain_id: u32) -> Species {
    Species {
        id,
        name: name.to_string(),
        description: format!("Descrição de {name}."),
        evolution_chain_id,
        generation: "generation-i".to_string(),
        is_legendary: false,
        is_mythical: false,
    }
}

/// Answers from fixed tables and records every call.
///
/// Unknown names and ids answer `PokemonNotFound`. Species missing from the
/// table are synthesized with an evolution chain id equal to the species id.
#[derive(Default)]
pub struct MockPokemonData {
    pokemon: Vec<Pokemon>,
    species: HashMap<u32, Species>,
    chains: HashMap<u32, Vec<u32>>,
    types: HashMap<String, Vec<TypeEntry>>,
    failures: HashMap<String, PokeApiError>,
    short_batches: bool,
    calls: Mutex<Vec<String>>,
}

impl MockPokemonData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pokemon(mut self, pokemon: Pokemon) -> Self {
        self.pokemon.push(pokemon);
        self
    }

    pub fn with_species(mut self, species: Species) -> Self {
        self.species.insert(species.id, species);
        self
    }

    pub fn with_chain(mut self, chain_id: u32, members: &[u32]) -> Self {
        self.chains.insert(chain_id, members.to_vec());
        self
    }

    pub fn with_type(mut self, type_name: &str, entries: Vec<TypeEntry>) -> Self {
        self.types.insert(type_name.to_string(), entries);
        self
    }

    /// Make lookups of `identifier` fail with `error`
    pub fn failing(mut self, identifier: &str, error: PokeApiError) -> Self {
        self.failures.insert(identifier.to_lowercase(), error);
        self
    }

    /// Make batch lookups drop every record after the first
    pub fn returning_short_batches(mut self) -> Self {
        self.short_batches = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn find(&self, key: &str) -> Option<&Pokemon> {
        self.pokemon
            .iter()
            .find(|p| p.name == key || p.id.to_string() == key)
    }
}

#[async_trait]
impl PokemonData for MockPokemonData {
    async fn get_pokemon(&self, identifier: &str) -> Result<Pokemon, PokeApiError> {
        let key = identifier.trim().to_lowercase();
        self.record(format!("pokemon:{key}"));
        if key.is_empty() {
            return Err(PokeApiError::InvalidIdentifier);
        }
        if let Some(err) = self.failures.get(&key) {
            return Err(err.clone());
        }
        self.find(&key).cloned().ok_or(PokeApiError::PokemonNotFound)
    }

    async fn get_species(&self, species_id: u32) -> Result<Species, PokeApiError> {
        self.record(format!("species:{species_id}"));
        if let Some(species) = self.species.get(&species_id) {
            return Ok(species.clone());
        }
        self.pokemon
            .iter()
            .find(|p| p.species_id == species_id)
            .map(|p| species(species_id, &p.name, species_id))
            .ok_or(PokeApiError::PokemonNotFound)
    }

    async fn get_evolution_chain(&self, chain_id: u32) -> Result<Vec<Pokemon>, PokeApiError> {
        self.record(format!("chain:{chain_id}"));
        let members = self.chains.get(&chain_id).ok_or(PokeApiError::PokemonNotFound)?;
        members
            .iter()
            .map(|id| self.find(&id.to_string()).cloned().ok_or(PokeApiError::PokemonNotFound))
            .collect()
    }

    async fn get_pokemon_by_type(&self, type_name: &str) -> Result<Vec<TypeEntry>, PokeApiError> {
        self.record(format!("type:{type_name}"));
        self.types
            .get(type_name)
            .cloned()
            .ok_or(PokeApiError::PokemonNotFound)
    }

    async fn get_multiple_pokemon(
        &self,
        identifiers: &[String],
    ) -> Result<Vec<Pokemon>, PokeApiError> {
        let mut records = Vec::with_capacity(identifiers.len());
        for id in identifiers {
            records.push(self.get_pokemon(id).await?);
        }
        if self.short_batches {
            records.truncate(1);
        }
        Ok(records)
    }

    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonPage, PokeApiError> {
        self.record(format!("list:{limit}:{offset}"));
        let mut all: Vec<&Pokemon> = self.pokemon.iter().collect();
        all.sort_by_key(|p| p.id);
        let results = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| NamedEntry {
                name: p.name.clone(),
                id: Some(p.id),
            })
            .collect();
        Ok(PokemonPage {
            count: u32::try_from(self.pokemon.len()).unwrap_or(u32::MAX),
            results,
        })
    }
}
