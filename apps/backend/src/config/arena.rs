//! Server and agent configuration loaded from the environment.

use std::env;
use std::str::FromStr;

use crate::ai::remote_chat::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::AppError;

pub const MIN_TIMEOUT_MS: u64 = 1_000;
pub const MAX_TIMEOUT_MS: u64 = 120_000;
/// Floor for human bid and double decisions.
pub const HUMAN_DECISION_FLOOR_MS: u64 = 15_000;

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub host: String,
    pub port: u16,
    pub default_timeout_ms: u64,
    pub human_grace_ms: u64,
    pub max_matches: u32,
    pub llm_api_base: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            default_timeout_ms: 20_000,
            human_grace_ms: 1_500,
            max_matches: 100,
            llm_api_base: DEFAULT_BASE_URL.to_string(),
            llm_api_key: None,
            llm_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ArenaConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: get("ARENA_HOST").unwrap_or(defaults.host),
            port: parse_or(get("ARENA_PORT"), "ARENA_PORT", defaults.port)?,
            default_timeout_ms: parse_or(
                get("ARENA_DEFAULT_TIMEOUT_MS"),
                "ARENA_DEFAULT_TIMEOUT_MS",
                defaults.default_timeout_ms,
            )?,
            human_grace_ms: parse_or(
                get("ARENA_HUMAN_GRACE_MS"),
                "ARENA_HUMAN_GRACE_MS",
                defaults.human_grace_ms,
            )?,
            max_matches: parse_or(
                get("ARENA_MAX_MATCHES"),
                "ARENA_MAX_MATCHES",
                defaults.max_matches,
            )?,
            llm_api_base: get("LLM_API_BASE").unwrap_or(defaults.llm_api_base),
            llm_api_key: get("LLM_API_KEY"),
            llm_model: get("LLM_MODEL").unwrap_or(defaults.llm_model),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, name: &str, default: T) -> Result<T, AppError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| {
            AppError::config(format!(
                "Environment variable '{name}' has invalid value '{v}'"
            ))
        }),
    }
}

/// Clamp a per-decision timeout into the accepted window.
pub fn clamp_timeout(ms: u64) -> u64 {
    ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ArenaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.human_grace_ms, 1_500);
        assert!(cfg.llm_api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = ArenaConfig::from_lookup(lookup(&[
            ("ARENA_PORT", "8080"),
            ("ARENA_HUMAN_GRACE_MS", "250"),
            ("LLM_API_KEY", "sk-test"),
            ("LLM_MODEL", " "),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.human_grace_ms, 250);
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.llm_model, DEFAULT_MODEL);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = ArenaConfig::from_lookup(lookup(&[("ARENA_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("ARENA_PORT"));
    }

    #[test]
    fn clamps_timeouts() {
        assert_eq!(clamp_timeout(10), MIN_TIMEOUT_MS);
        assert_eq!(clamp_timeout(5_000), 5_000);
        assert_eq!(clamp_timeout(10_000_000), MAX_TIMEOUT_MS);
    }
}
