//! Normalized PokéAPI records

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Pokémon
// ============================================================================

/// A Pokémon as presented to the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    pub name_capitalized: String,
    pub types: Vec<String>,
    pub stats: Stats,
    pub abilities: Vec<Ability>,
    pub sprites: Sprites,
    /// Meters
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    pub species_id: u32,
}

/// Base stats. A stat the upstream payload did not carry is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp: Option<u32>,
    pub attack: Option<u32>,
    pub defense: Option<u32>,
    pub special_attack: Option<u32>,
    pub special_defense: Option<u32>,
    pub speed: Option<u32>,
    /// Sum of the stats above that are present
    pub total: u32,
}

impl Stats {
    /// Build stats with `total` derived from the present fields.
    pub fn new(
        hp: Option<u32>,
        attack: Option<u32>,
        defense: Option<u32>,
        special_attack: Option<u32>,
        special_defense: Option<u32>,
        speed: Option<u32>,
    ) -> Self {
        let total = [hp, attack, defense, special_attack, special_defense, speed]
            .into_iter()
            .flatten()
            .sum();
        Self {
            hp,
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprites {
    pub front: Option<String>,
    pub front_shiny: Option<String>,
    pub official: Option<String>,
}

// ============================================================================
// Species
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub evolution_chain_id: u32,
    pub generation: String,
    pub is_legendary: bool,
    pub is_mythical: bool,
}

// ============================================================================
// Listings
// ============================================================================

/// One Pokémon from a type listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    pub url: String,
    pub id: Option<u32>,
}

/// A name/id pair from the paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
    pub id: Option<u32>,
}

/// One page of the Pokémon listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonPage {
    pub count: u32,
    pub results: Vec<NamedEntry>,
}

/// Snapshot of the response cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<String>,
}

// ============================================================================
// Types
// ============================================================================

/// The 18 canonical Pokémon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Grass,
        Self::Electric,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Grass => "grass",
            Self::Electric => "electric",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }
}

impl std::fmt::Display for PokemonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input that is not one of the canonical type names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pokemon type: {0}")]
pub struct UnknownType(pub String);

impl FromStr for PokemonType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or(UnknownType(needle))
    }
}
