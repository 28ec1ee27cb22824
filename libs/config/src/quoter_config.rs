//! Quoter Configuration Module
//!
//! Loads pool snapshots from a TOML file, applies `STABLE_` environment
//! overrides, and converts human-readable amounts into the 18-decimal
//! integers the pool math works on.

use crate::defaults::{DEFAULT_CONFIG_PATH, DEFAULT_LOG_LEVEL, ENV_PREFIX, ENV_SEPARATOR};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stable_amm::scaling::{
    downscale_down, downscale_up, to_decimal, to_fixed, upscale, POOL_DECIMALS,
};
use stable_amm::{Rounding, StablePoolState, AMP_PRECISION, U256};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Main quoter configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuoterConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pool snapshots available for quoting
    pub pools: Vec<PoolConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

/// One stable pool as written in the configuration file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolConfig {
    pub id: String,

    /// Unscaled A, multiplied by `AMP_PRECISION` on conversion
    pub amplification: u64,

    /// Fraction, e.g. `0.0004` for 0.04%
    pub swap_fee: Decimal,

    /// Outstanding pool shares in whole units
    pub bpt_total_supply: Decimal,

    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenConfig {
    pub symbol: String,
    pub decimals: u32,
    /// Balance in whole tokens
    pub balance: Decimal,
}

impl QuoterConfig {
    /// Load configuration from a file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_environment(path, Self::environment())
    }

    /// `STABLE_` variables, `__` between nested keys
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    fn load_with_environment(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(environment);

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        info!("Loaded {} pool(s) from {:?}", config.pools.len(), path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for pool in &self.pools {
            if !seen.insert(pool.id.as_str()) {
                bail!("Duplicate pool id '{}'", pool.id);
            }
            let mut symbols = HashSet::new();
            for token in &pool.tokens {
                if !symbols.insert(token.symbol.as_str()) {
                    bail!("Duplicate token '{}' in pool '{}'", token.symbol, pool.id);
                }
            }
        }
        Ok(())
    }

    /// Get the pool with the given id
    pub fn pool(&self, id: &str) -> Result<&PoolConfig> {
        self.pools
            .iter()
            .find(|pool| pool.id == id)
            .with_context(|| format!("Pool '{}' not found in configuration", id))
    }
}

impl PoolConfig {
    /// Build the validated pool snapshot, every balance upscaled to 18 decimals
    pub fn to_pool_state(&self) -> Result<StablePoolState> {
        let balances = self
            .tokens
            .iter()
            .map(|token| {
                let native = to_fixed(token.balance, token.decimals)?;
                upscale(native, token.decimals)
            })
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid token balance in pool '{}'", self.id))?;

        let swap_fee = to_fixed(self.swap_fee, POOL_DECIMALS)
            .with_context(|| format!("Invalid swap fee in pool '{}'", self.id))?;
        let bpt_total_supply = to_fixed(self.bpt_total_supply, POOL_DECIMALS)
            .with_context(|| format!("Invalid BPT supply in pool '{}'", self.id))?;
        let amplification = U256::from(self.amplification) * AMP_PRECISION;

        debug!(
            "Pool '{}': A={} fee={} supply={} balances={:?}",
            self.id, amplification, swap_fee, bpt_total_supply, balances
        );

        StablePoolState::new(amplification, balances, swap_fee, bpt_total_supply)
            .with_context(|| format!("Pool '{}' is not a valid stable pool", self.id))
    }

    /// Position of `symbol` in the pool's token list
    pub fn token_index(&self, symbol: &str) -> Result<usize> {
        self.tokens
            .iter()
            .position(|token| token.symbol == symbol)
            .with_context(|| {
                format!("Token '{}' not found in pool '{}'", symbol, self.id)
            })
    }

    /// Human amount of the token at `index` as an 18-decimal pool amount
    pub fn to_pool_amount(&self, index: usize, amount: Decimal) -> Result<U256> {
        let token = self.token(index)?;
        let native = to_fixed(amount, token.decimals)
            .with_context(|| format!("Invalid {} amount {}", token.symbol, amount))?;
        Ok(upscale(native, token.decimals)?)
    }

    /// 18-decimal pool amount of the token at `index` in whole tokens
    ///
    /// Use `Rounding::Down` for amounts paid out and `Rounding::Up` for
    /// amounts charged.
    pub fn to_token_amount(
        &self,
        index: usize,
        amount: U256,
        rounding: Rounding,
    ) -> Result<Decimal> {
        let token = self.token(index)?;
        let native = match rounding {
            Rounding::Down => downscale_down(amount, token.decimals)?,
            Rounding::Up => downscale_up(amount, token.decimals)?,
        };
        Ok(to_decimal(native, token.decimals)?)
    }

    fn token(&self, index: usize) -> Result<&TokenConfig> {
        self.tokens
            .get(index)
            .with_context(|| format!("Pool '{}' has no token {}", self.id, index))
    }
}
