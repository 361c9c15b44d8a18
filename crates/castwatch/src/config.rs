//! Configuration loading: `CastwatchConfig::from_file`'s plain-TOML parsing
//! (the teacher's own idiom, see `botticelli_actor::server_config`) layered
//! with `CASTWATCH_`-prefixed environment overrides via the `config` crate,
//! which the teacher depends on but does not use for its own config (an
//! enrichment borrowed from the rest of the pack, see DESIGN.md).

use castwatch_core::CastwatchConfig;
use castwatch_error::{CastwatchResult, ConfigError};
use std::path::Path;

/// Loads configuration from `path`, then applies any `CASTWATCH_<FIELD>`
/// environment variable overrides (double-underscore separated for nested
/// keys, though this config is currently flat).
pub fn load_config(path: &Path) -> CastwatchResult<CastwatchConfig> {
    let base = CastwatchConfig::from_file(path)?;

    let layered = config::Config::builder()
        .add_source(config::Config::try_from(&base).map_err(|e| {
            ConfigError::new(format!("failed to stage config for env layering: {e}"))
        })?)
        .add_source(
            config::Environment::with_prefix("CASTWATCH")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ConfigError::new(format!("failed to layer environment overrides: {e}")))?;

    layered
        .try_deserialize()
        .map_err(|e| ConfigError::new(format!("failed to deserialize layered config: {e}")).into())
}
