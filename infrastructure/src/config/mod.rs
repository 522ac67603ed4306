//! Configuration file loading for llm-fanout
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `FANOUT_` (nested keys split on `__`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./fanout.toml` or `./.fanout.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/llm-fanout/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileModelLimitConfig, FileOutputConfig,
    FileProviderConfig, FileRateLimitConfig, FileRetryConfig, FileRunConfig, known_base_url,
};
pub use loader::ConfigLoader;
