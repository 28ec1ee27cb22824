//! Quote commands and their printable results

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Serialize;
use stable_amm::scaling::{to_decimal, to_fixed, POOL_DECIMALS};
use stable_amm::{AmmPool, Rounding, StablePoolState, TradeOutcome, U256};
use stable_config::PoolConfig;
use std::fmt;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Pool invariant D
    Invariant {
        /// Round every division down instead of up
        #[arg(long)]
        round_down: bool,
    },
    /// Output amount for an exact input amount
    SwapExactIn {
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        /// Input amount in whole tokens
        #[arg(long)]
        amount: Decimal,
    },
    /// Input amount for an exact output amount
    SwapExactOut {
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        /// Output amount in whole tokens
        #[arg(long)]
        amount: Decimal,
    },
    /// Single-token deposit minting an exact amount of BPT
    JoinSingle {
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        bpt_out: Decimal,
    },
    /// Single-token withdrawal for burning an exact amount of BPT
    ExitSingle {
        #[arg(long)]
        token_out: String,
        #[arg(long)]
        bpt_in: Decimal,
    },
    /// BPT minted for a deposit of every token, in pool token order
    Join {
        #[arg(long, value_delimiter = ',')]
        amounts: Vec<Decimal>,
    },
}

/// Result of one command
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub pool: String,
    pub operation: &'static str,
    /// Token the amount is denominated in, `None` for BPT and the invariant
    pub token: Option<String>,
    pub amount: Decimal,
    /// Amount at 18 decimals as the pool math sees it
    pub raw: String,
    /// Pool balances after the trade, in whole tokens
    pub balances: Vec<(String, Decimal)>,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.token.as_deref().unwrap_or("");
        writeln!(
            f,
            "{} on {}: {} {}",
            self.operation,
            self.pool,
            self.amount,
            unit
        )?;
        writeln!(f, "  raw: {}", self.raw)?;
        for (symbol, balance) in &self.balances {
            writeln!(f, "  {}: {}", symbol, balance)?;
        }
        Ok(())
    }
}

/// Execute `command` against one configured pool
pub fn run(command: &Command, pool: &PoolConfig, state: &StablePoolState) -> Result<Quote> {
    match command {
        Command::Invariant { round_down } => {
            let rounding = if *round_down { Rounding::Down } else { Rounding::Up };
            let invariant = state.invariant(rounding)?;
            Ok(Quote {
                pool: pool.id.clone(),
                operation: "invariant",
                token: None,
                amount: to_decimal(invariant, POOL_DECIMALS)?,
                raw: invariant.to_string(),
                balances: human_balances(pool, state.balances())?,
            })
        }
        Command::SwapExactIn {
            token_in,
            token_out,
            amount,
        } => {
            let index_in = pool.token_index(token_in)?;
            let index_out = pool.token_index(token_out)?;
            let amount_in = pool.to_pool_amount(index_in, *amount)?;
            let outcome = state.amount_out(index_in, index_out, amount_in)?;
            token_quote(pool, "swap-exact-in", index_out, outcome, Rounding::Down)
        }
        Command::SwapExactOut {
            token_in,
            token_out,
            amount,
        } => {
            let index_in = pool.token_index(token_in)?;
            let index_out = pool.token_index(token_out)?;
            let amount_out = pool.to_pool_amount(index_out, *amount)?;
            let outcome = state.amount_in(index_in, index_out, amount_out)?;
            token_quote(pool, "swap-exact-out", index_in, outcome, Rounding::Up)
        }
        Command::JoinSingle { token_in, bpt_out } => {
            let index = pool.token_index(token_in)?;
            let outcome = state.join_single(index, bpt_amount(*bpt_out)?)?;
            token_quote(pool, "join-single", index, outcome, Rounding::Up)
        }
        Command::ExitSingle { token_out, bpt_in } => {
            let index = pool.token_index(token_out)?;
            let outcome = state.exit_single(index, bpt_amount(*bpt_in)?)?;
            token_quote(pool, "exit-single", index, outcome, Rounding::Down)
        }
        Command::Join { amounts } => {
            if amounts.len() != pool.tokens.len() {
                bail!(
                    "Pool '{}' has {} tokens, got {} amounts",
                    pool.id,
                    pool.tokens.len(),
                    amounts.len()
                );
            }
            let amounts_in = amounts
                .iter()
                .enumerate()
                .map(|(index, amount)| pool.to_pool_amount(index, *amount))
                .collect::<Result<Vec<_>>>()?;
            let outcome = state.join(&amounts_in)?;
            Ok(Quote {
                pool: pool.id.clone(),
                operation: "join",
                token: Some("BPT".to_string()),
                amount: to_decimal(outcome.amount, POOL_DECIMALS)?,
                raw: outcome.amount.to_string(),
                balances: human_balances(pool, &outcome.balances)?,
            })
        }
    }
}

fn bpt_amount(amount: Decimal) -> Result<U256> {
    to_fixed(amount, POOL_DECIMALS).with_context(|| format!("Invalid BPT amount {}", amount))
}

fn token_quote(
    pool: &PoolConfig,
    operation: &'static str,
    index: usize,
    outcome: TradeOutcome,
    rounding: Rounding,
) -> Result<Quote> {
    Ok(Quote {
        pool: pool.id.clone(),
        operation,
        token: Some(pool.tokens[index].symbol.clone()),
        amount: pool.to_token_amount(index, outcome.amount, rounding)?,
        raw: outcome.amount.to_string(),
        balances: human_balances(pool, &outcome.balances)?,
    })
}

fn human_balances(pool: &PoolConfig, balances: &[U256]) -> Result<Vec<(String, Decimal)>> {
    pool.tokens
        .iter()
        .zip(balances)
        .enumerate()
        .map(|(index, (token, balance))| {
            Ok((
                token.symbol.clone(),
                pool.to_token_amount(index, *balance, Rounding::Down)?,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stable_config::TokenConfig;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn token(symbol: &str, decimals: u32, balance: &str) -> TokenConfig {
        TokenConfig {
            symbol: symbol.to_string(),
            decimals,
            balance: d(balance),
        }
    }

    fn pool() -> PoolConfig {
        PoolConfig {
            id: "staBAL3".to_string(),
            amplification: 200,
            swap_fee: d("0.0004"),
            bpt_total_supply: d("3050000"),
            tokens: vec![
                token("DAI", 18, "1000000"),
                token("USDC", 6, "1200000"),
                token("USDT", 6, "900000"),
            ],
        }
    }

    fn quote(command: Command) -> Result<Quote> {
        let pool = pool();
        let state = pool.to_pool_state().unwrap();
        run(&command, &pool, &state)
    }

    #[test]
    fn test_swap_exact_in_quote() {
        let quote = quote(Command::SwapExactIn {
            token_in: "DAI".to_string(),
            token_out: "USDC".to_string(),
            amount: d("1000"),
        })
        .unwrap();

        assert_eq!(quote.token.as_deref(), Some("USDC"));
        assert_eq!(quote.raw, "1000470894377598996145");
        assert_eq!(quote.amount, d("1000.470894"));
        assert_eq!(quote.balances[0], ("DAI".to_string(), d("1001000")));
    }

    #[test]
    fn test_swap_exact_out_rounds_charge_up() {
        let quote = quote(Command::SwapExactOut {
            token_in: "USDC".to_string(),
            token_out: "USDT".to_string(),
            amount: d("1000"),
        })
        .unwrap();

        assert_eq!(quote.raw, "1001865635010847087871");
        assert_eq!(quote.amount, d("1001.865636"));
    }

    #[test]
    fn test_liquidity_quotes() {
        let join_single = quote(Command::JoinSingle {
            token_in: "USDC".to_string(),
            bpt_out: d("1000"),
        })
        .unwrap();
        assert_eq!(join_single.raw, "1017362063545889256691");

        let exit_single = quote(Command::ExitSingle {
            token_out: "USDT".to_string(),
            bpt_in: d("1000"),
        })
        .unwrap();
        assert_eq!(exit_single.raw, "1015338251342299959486");
        assert_eq!(exit_single.amount, d("1015.338251"));

        let join = quote(Command::Join {
            amounts: vec![d("1000"), d("0"), d("500")],
        })
        .unwrap();
        assert_eq!(join.token.as_deref(), Some("BPT"));
        assert_eq!(join.amount, d("1476.1135424361863"));
    }

    #[test]
    fn test_invariant_quote() {
        let up = quote(Command::Invariant { round_down: false }).unwrap();
        let down = quote(Command::Invariant { round_down: true }).unwrap();

        assert_eq!(up.raw, "3099888769460454695322189");
        assert_eq!(down.raw, "3099888769460454695322188");
        assert!(up.token.is_none());
    }

    #[test]
    fn test_bad_requests() {
        assert!(quote(Command::SwapExactIn {
            token_in: "FRAX".to_string(),
            token_out: "USDC".to_string(),
            amount: d("1"),
        })
        .is_err());
        assert!(quote(Command::Join {
            amounts: vec![d("1"), d("1")],
        })
        .is_err());
    }

    #[test]
    fn test_json_shape() {
        let quote = quote(Command::Invariant { round_down: false }).unwrap();

        let json = serde_json::to_value(&quote).unwrap();

        assert_eq!(json["operation"], "invariant");
        assert_eq!(json["raw"], "3099888769460454695322189");
        assert!(json["token"].is_null());
    }
}
