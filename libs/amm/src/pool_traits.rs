//! Pool trait definitions and the validated stable pool snapshot

use crate::error::{Result, StableMathError};
use crate::fixed_point::{Rounding, AMP_PRECISION};
use crate::invariant::calculate_invariant;
use crate::liquidity::{
    exact_bpt_in_for_token_out, exact_tokens_in_for_bpt_out, token_in_for_exact_bpt_out,
};
use crate::operations::{
    exact_token_in_for_token_out, token_in_for_exact_token_out, validate_fee, TradeOutcome,
};
use primitive_types::U256;

/// Smallest amplification a pool may be configured with (A = 1)
pub const MIN_AMP: U256 = AMP_PRECISION;

/// Largest amplification a pool may be configured with (A = 5000)
pub const MAX_AMP: U256 = U256([5_000_000, 0, 0, 0]);

/// Pool type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PoolType {
    /// Balancer/Curve style StableSwap pool
    Stable,
}

/// Unified pool interface for routing calculations
pub trait AmmPool {
    /// Calculate output amount for given input
    fn amount_out(
        &self,
        token_in: usize,
        token_out: usize,
        amount_in: U256,
    ) -> Result<TradeOutcome>;

    /// Calculate required input for desired output
    fn amount_in(
        &self,
        token_in: usize,
        token_out: usize,
        amount_out: U256,
    ) -> Result<TradeOutcome>;

    fn token_count(&self) -> usize;

    fn pool_type(&self) -> PoolType;
}

/// Snapshot of a stable pool, every amount at 18 decimals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StablePoolState {
    amplification: U256,
    balances: Vec<U256>,
    swap_fee: U256,
    bpt_total_supply: U256,
}

impl StablePoolState {
    /// Build a snapshot, rejecting pools the contract could never hold
    ///
    /// # Arguments
    /// * `amplification` - A scaled by [`AMP_PRECISION`], within [`MIN_AMP`]..=[`MAX_AMP`]
    /// * `balances` - At least two upscaled balances
    /// * `swap_fee` - 18-decimal fraction below 1.0
    /// * `bpt_total_supply` - Outstanding pool shares
    pub fn new(
        amplification: U256,
        balances: Vec<U256>,
        swap_fee: U256,
        bpt_total_supply: U256,
    ) -> Result<Self> {
        if balances.len() < 2 {
            return Err(StableMathError::TooFewTokens {
                count: balances.len(),
            });
        }
        if amplification < MIN_AMP || amplification > MAX_AMP {
            return Err(StableMathError::AmplificationOutOfRange { amplification });
        }
        validate_fee(swap_fee)?;

        Ok(Self {
            amplification,
            balances,
            swap_fee,
            bpt_total_supply,
        })
    }

    pub fn amplification(&self) -> U256 {
        self.amplification
    }

    pub fn balances(&self) -> &[U256] {
        &self.balances
    }

    pub fn swap_fee(&self) -> U256 {
        self.swap_fee
    }

    pub fn bpt_total_supply(&self) -> U256 {
        self.bpt_total_supply
    }

    pub fn invariant(&self, rounding: Rounding) -> Result<U256> {
        calculate_invariant(self.amplification, &self.balances, rounding)
    }

    /// Token deposit needed to mint exactly `bpt_out`
    pub fn join_single(&self, token_in: usize, bpt_out: U256) -> Result<TradeOutcome> {
        token_in_for_exact_bpt_out(
            self.amplification,
            &self.balances,
            token_in,
            bpt_out,
            self.bpt_total_supply,
            self.swap_fee,
        )
    }

    /// Token withdrawal for burning exactly `bpt_in`
    pub fn exit_single(&self, token_out: usize, bpt_in: U256) -> Result<TradeOutcome> {
        exact_bpt_in_for_token_out(
            self.amplification,
            &self.balances,
            token_out,
            bpt_in,
            self.bpt_total_supply,
            self.swap_fee,
        )
    }

    /// BPT minted for a deposit of every token at once
    pub fn join(&self, amounts_in: &[U256]) -> Result<TradeOutcome> {
        exact_tokens_in_for_bpt_out(
            self.amplification,
            &self.balances,
            amounts_in,
            self.bpt_total_supply,
            self.swap_fee,
        )
    }
}

impl AmmPool for StablePoolState {
    fn amount_out(
        &self,
        token_in: usize,
        token_out: usize,
        amount_in: U256,
    ) -> Result<TradeOutcome> {
        exact_token_in_for_token_out(
            self.amplification,
            &self.balances,
            token_in,
            token_out,
            amount_in,
            self.swap_fee,
        )
    }

    fn amount_in(
        &self,
        token_in: usize,
        token_out: usize,
        amount_out: U256,
    ) -> Result<TradeOutcome> {
        token_in_for_exact_token_out(
            self.amplification,
            &self.balances,
            token_in,
            token_out,
            amount_out,
            self.swap_fee,
        )
    }

    fn token_count(&self) -> usize {
        self.balances.len()
    }

    fn pool_type(&self) -> PoolType {
        PoolType::Stable
    }
}
