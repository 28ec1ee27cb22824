//! Configuration defaults
//!
//! Values used when the configuration file or the environment leaves a
//! setting out.

/// Configuration file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/pools.toml";

/// Prefix of environment overrides (`STABLE_LOGGING__LEVEL=debug`)
pub const ENV_PREFIX: &str = "STABLE";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Log level when neither the file nor the command line sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
