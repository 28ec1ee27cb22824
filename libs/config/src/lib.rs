//! # Stable Pool Configuration
//!
//! Loads pool snapshots for the quoter from a TOML file with environment
//! overrides, and turns them into validated [`stable_amm::StablePoolState`]
//! values.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stable_config::QuoterConfig;
//! use std::path::Path;
//!
//! let config = QuoterConfig::load(Some(Path::new("config/pools.toml")))?;
//! let pool = config.pool("staBAL3")?;
//! let state = pool.to_pool_state()?;
//! let dai = pool.token_index("DAI")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod quoter_config;

// Re-export commonly used types
pub use quoter_config::{LoggingConfig, PoolConfig, QuoterConfig, TokenConfig};
