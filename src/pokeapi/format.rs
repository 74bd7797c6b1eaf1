//! Wire formats and normalization
//!
//! Raw payload shapes mirror the PokéAPI JSON. They are decoded from cached
//! `serde_json::Value`s and turned into the records in [`super::types`].

use super::error::PokeApiError;
use super::types::{Ability, NamedEntry, Pokemon, PokemonPage, Species, Sprites, Stats, TypeEntry};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Type listings are cut to this many entries
pub const TYPE_LISTING_CAP: usize = 20;

// ============================================================================
// Raw payloads
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UrlResource {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPokemon {
    id: u32,
    name: String,
    #[serde(default)]
    types: Vec<RawTypeSlot>,
    #[serde(default)]
    stats: Vec<RawStat>,
    #[serde(default)]
    abilities: Vec<RawAbility>,
    #[serde(default)]
    sprites: RawSprites,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    species: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawStat {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawAbility {
    ability: NamedResource,
    #[serde(default)]
    is_hidden: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawSprites {
    front_default: Option<String>,
    front_shiny: Option<String>,
    #[serde(default)]
    other: Option<RawOtherSprites>,
}

#[derive(Debug, Deserialize)]
struct RawOtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<RawArtwork>,
}

#[derive(Debug, Deserialize)]
struct RawArtwork {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSpecies {
    id: u32,
    name: String,
    #[serde(default)]
    flavor_text_entries: Vec<RawFlavorText>,
    evolution_chain: UrlResource,
    generation: NamedResource,
    #[serde(default)]
    is_legendary: bool,
    #[serde(default)]
    is_mythical: bool,
}

#[derive(Debug, Deserialize)]
struct RawFlavorText {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEvolutionChain {
    pub chain: RawChainLink,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChainLink {
    species: NamedResource,
    #[serde(default)]
    evolves_to: Vec<RawChainLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTypeListing {
    #[serde(default)]
    pokemon: Vec<RawTypeMember>,
}

#[derive(Debug, Deserialize)]
struct RawTypeMember {
    pokemon: NamedResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPage {
    count: u32,
    #[serde(default)]
    results: Vec<NamedResource>,
}

/// Decode a cached JSON document into one of the raw payload types.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, PokeApiError> {
    serde_json::from_value(value)
        .map_err(|e| PokeApiError::Network(format!("invalid response body: {e}")))
}

// ============================================================================
// Normalization
// ============================================================================

pub(crate) fn format_pokemon(raw: RawPokemon) -> Pokemon {
    let stat = |name: &str| {
        raw.stats
            .iter()
            .find(|s| s.stat.name == name)
            .map(|s| s.base_stat)
    };
    let stats = Stats::new(
        stat("hp"),
        stat("attack"),
        stat("defense"),
        stat("special-attack"),
        stat("special-defense"),
        stat("speed"),
    );

    let official = raw
        .sprites
        .other
        .and_then(|o| o.official_artwork)
        .and_then(|a| a.front_default);

    Pokemon {
        id: raw.id,
        name_capitalized: capitalize(&raw.name),
        name: raw.name,
        types: raw.types.into_iter().map(|t| t.kind.name).collect(),
        stats,
        abilities: raw
            .abilities
            .into_iter()
            .map(|a| Ability {
                name: a.ability.name,
                is_hidden: a.is_hidden,
            })
            .collect(),
        sprites: Sprites {
            front: raw.sprites.front_default,
            front_shiny: raw.sprites.front_shiny,
            official,
        },
        // decimetres -> meters, hectograms -> kilograms
        height: f64::from(raw.height) / 10.0,
        weight: f64::from(raw.weight) / 10.0,
        species_id: extract_id_from_url(&raw.species.url).unwrap_or(raw.id),
    }
}

pub(crate) fn format_species(raw: RawSpecies) -> Result<Species, PokeApiError> {
    let evolution_chain_id = extract_id_from_url(&raw.evolution_chain.url).ok_or_else(|| {
        PokeApiError::Network(format!(
            "malformed evolution chain url: {}",
            raw.evolution_chain.url
        ))
    })?;

    Ok(Species {
        id: raw.id,
        name: raw.name,
        description: pick_description(&raw.flavor_text_entries),
        evolution_chain_id,
        generation: raw.generation.name,
        is_legendary: raw.is_legendary,
        is_mythical: raw.is_mythical,
    })
}

/// Portuguese first, then English, else empty.
fn pick_description(entries: &[RawFlavorText]) -> String {
    ["pt-BR", "pt", "en"]
        .iter()
        .find_map(|lang| entries.iter().find(|e| e.language.name == *lang))
        .map(|e| e.flavor_text.replace(['\n', '\u{c}'], " "))
        .unwrap_or_default()
}

/// A species visited while walking an evolution tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChainSpecies {
    pub name: String,
    pub species_id: Option<u32>,
}

impl ChainSpecies {
    /// Identifier used for the follow-up Pokémon lookup
    pub fn lookup_key(&self) -> String {
        self.species_id
            .map_or_else(|| self.name.clone(), |id| id.to_string())
    }
}

/// Pre-order flattening of an evolution tree, children in given order.
pub(crate) fn flatten_chain(root: &RawChainLink) -> Vec<ChainSpecies> {
    let mut order = Vec::new();
    let mut stack = vec![root];

    while let Some(link) = stack.pop() {
        order.push(ChainSpecies {
            name: link.species.name.clone(),
            species_id: extract_id_from_url(&link.species.url),
        });
        // Reverse so the first child is popped next
        stack.extend(link.evolves_to.iter().rev());
    }

    order
}

pub(crate) fn format_type_listing(raw: RawTypeListing) -> Vec<TypeEntry> {
    raw.pokemon
        .into_iter()
        .take(TYPE_LISTING_CAP)
        .map(|m| TypeEntry {
            id: extract_id_from_url(&m.pokemon.url),
            name: m.pokemon.name,
            url: m.pokemon.url,
        })
        .collect()
}

pub(crate) fn format_page(raw: RawPage) -> PokemonPage {
    PokemonPage {
        count: raw.count,
        results: raw
            .results
            .into_iter()
            .map(|r| NamedEntry {
                id: extract_id_from_url(&r.url),
                name: r.name,
            })
            .collect(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Last numeric path segment of a resource URL
pub fn extract_id_from_url(url: &str) -> Option<u32> {
    url.split('/')
        .filter(|part| !part.is_empty())
        .next_back()
        .and_then(|part| part.parse().ok())
}
