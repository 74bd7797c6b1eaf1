//! PokéAPI error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a [`super::Transport`] for a single request.
///
/// Cloneable so one in-flight request can hand its outcome to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Remote answered 404
    #[error("resource not found")]
    NotFound,
    /// Remote answered with any other non-success status
    #[error("unexpected status {0}")]
    Status(u16),
    /// Connection, TLS or timeout failure
    #[error("transport failure: {0}")]
    Transport(String),
    /// Body was not the JSON we expected
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Errors surfaced to callers of the data client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PokeApiError {
    /// Empty or otherwise unusable identifier; no request was made
    #[error("invalid identifier")]
    InvalidIdentifier,
    /// Empty identifier list; no request was made
    #[error("invalid identifiers")]
    InvalidIdentifiers,
    /// The remote resource does not exist
    #[error("pokemon not found")]
    PokemonNotFound,
    /// Any other upstream failure
    #[error("network error: {0}")]
    Network(String),
}

impl PokeApiError {
    /// Stable code for this error, stored in conversation context
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentifier => ErrorCode::InvalidIdentifier,
            Self::InvalidIdentifiers => ErrorCode::InvalidIdentifiers,
            Self::PokemonNotFound => ErrorCode::PokemonNotFound,
            Self::Network(_) => ErrorCode::NetworkError,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PokemonNotFound)
    }
}

impl From<FetchError> for PokeApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound => Self::PokemonNotFound,
            other => Self::Network(other.to_string()),
        }
    }
}

/// Closed set of error codes a conversation can remember
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidIdentifier,
    InvalidIdentifiers,
    PokemonNotFound,
    NetworkError,
    /// Compare input did not contain exactly two names
    InvalidCompareInput,
    /// Type search input is not one of the known types
    InvalidType,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InvalidIdentifiers => "INVALID_IDENTIFIERS",
            Self::PokemonNotFound => "POKEMON_NOT_FOUND",
            Self::NetworkError => "NETWORK_ERROR",
            Self::InvalidCompareInput => "INVALID_COMPARE_INPUT",
            Self::InvalidType => "INVALID_TYPE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
