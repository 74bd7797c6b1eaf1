//! Server configuration from the environment

use crate::pokeapi::{DEFAULT_BASE_URL, DEFAULT_TTL};
use crate::sessions::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub pokeapi_base_url: String,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub sweep_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            pokeapi_base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: DEFAULT_TTL,
            upstream_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let pokeapi_base_url = lookup("POKEAPI_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.pokeapi_base_url);

        Self {
            port: parse_or(&lookup, "POKEDEX_PORT", defaults.port),
            pokeapi_base_url,
            cache_ttl: secs_or(&lookup, "POKEAPI_CACHE_TTL_SECS", defaults.cache_ttl),
            upstream_timeout: secs_or(&lookup, "POKEAPI_TIMEOUT_SECS", defaults.upstream_timeout),
            session_ttl: secs_or(&lookup, "POKEDEX_SESSION_TTL_SECS", defaults.session_ttl),
            max_sessions: parse_or(&lookup, "POKEDEX_MAX_SESSIONS", defaults.max_sessions),
            sweep_interval: secs_or(
                &lookup,
                "POKEDEX_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval,
            ),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    if let Ok(value) = raw.trim().parse() {
        value
    } else {
        tracing::warn!(key, value = %raw, "Ignoring unparseable setting, using default");
        default
    }
}

/// Whole seconds; zero is rejected since every duration here must be positive
fn secs_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    match parse_or::<u64>(lookup, key, 0) {
        0 => default,
        secs => Duration::from_secs(secs),
    }
}
