/*
 * src/config.rs
 *
 * File for engine configuration
 *
 * Purpose:
 *   Typed configuration for the tunables this codebase's ambient stack
 *   calls for: oracle/catalog timeouts and the similarity engine's
 *   top-K neighbor count. Loaded from environment variables the same way
 *   `main.rs` reads `API_BASE_URL`/`BIND_ADDRESS` today.
 */

use std::env;
use std::time::Duration;

/// Default oracle call timeout (seconds), per the concurrency model.
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;
/// Default per-query catalog timeout (seconds), per the concurrency model.
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 5;
/// Default neighbor count for cold-start similarity retrieval.
const DEFAULT_TOP_K: usize = 5;

/// Engine-wide tunables, parsed once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	pub oracle_timeout: Duration,
	pub catalog_timeout: Duration,
	pub top_k_neighbors: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			oracle_timeout: Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
			catalog_timeout: Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS),
			top_k_neighbors: DEFAULT_TOP_K,
		}
	}
}

impl EngineConfig {
	/// Reads `ORACLE_TIMEOUT_SECS`, `CATALOG_TIMEOUT_SECS`, and
	/// `SIMILARITY_TOP_K` from the environment, falling back to the
	/// recommended defaults for any that are unset or unparsable.
	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			oracle_timeout: env_duration_secs("ORACLE_TIMEOUT_SECS", defaults.oracle_timeout),
			catalog_timeout: env_duration_secs("CATALOG_TIMEOUT_SECS", defaults.catalog_timeout),
			top_k_neighbors: env::var("SIMILARITY_TOP_K")
				.ok()
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.top_k_neighbors),
		}
	}
}

fn env_duration_secs(key: &str, default: Duration) -> Duration {
	env::var(key)
		.ok()
		.and_then(|v| v.parse::<u64>().ok())
		.map(Duration::from_secs)
		.unwrap_or(default)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_concurrency_model() {
		let config = EngineConfig::default();
		assert_eq!(config.oracle_timeout, Duration::from_secs(30));
		assert_eq!(config.catalog_timeout, Duration::from_secs(5));
		assert_eq!(config.top_k_neighbors, 5);
	}
}
