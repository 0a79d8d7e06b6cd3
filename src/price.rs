use crate::config::EngineConfig;
use crate::entity::{Pool, Token};
use crate::math;
use bigdecimal::{BigDecimal, One, Zero};
use std::ops::Mul;

/// Where price discovery reads the pools and tokens it walks through.
pub trait PricingSource {
    fn pool(&self, pool_address: &str) -> Option<Pool>;
    fn token(&self, token_address: &str) -> Option<Token>;
}

/// Weighted exchange rate of the pool: units of token1 per unit of token0.
pub fn pool_ratio(
    balance0: &BigDecimal,
    balance1: &BigDecimal,
    weight0: &BigDecimal,
    weight1: &BigDecimal,
) -> BigDecimal {
    let weighted_balance0 = math::safe_div(balance0, weight0);
    let weighted_balance1 = math::safe_div(balance1, weight1);
    math::safe_div(&weighted_balance1, &weighted_balance0)
}

pub fn token_prices(ratio: &BigDecimal) -> (BigDecimal, BigDecimal) {
    let price0 = ratio.clone();
    let price1 = math::safe_div(&BigDecimal::one(), ratio);
    return (price0, price1);
}

/// USD price of the base asset, read off the stablecoin/base-asset reference
/// pool. `usd_pool_ratio` is the pool's live token1-per-token0 rate.
pub fn get_eth_price_in_usd(config: &EngineConfig, usd_pool: Option<&Pool>, usd_pool_ratio: &BigDecimal) -> BigDecimal {
    let pool = match usd_pool {
        None => return BigDecimal::zero(),
        Some(pool) => pool,
    };

    if !pool.weight1.gt(&BigDecimal::zero()) {
        return BigDecimal::zero();
    }

    if config.is_base_asset(&pool.token0) {
        return usd_pool_ratio.clone();
    }
    if config.is_base_asset(&pool.token1) {
        return math::safe_div(&BigDecimal::one(), usd_pool_ratio);
    }

    log::warn!("usd reference pool {} does not hold the base asset", pool.id);
    BigDecimal::zero()
}

fn derived_eth_or_base(config: &EngineConfig, token: &Token) -> BigDecimal {
    if token.derived_eth.is_zero() && config.is_base_asset(&token.id) {
        return BigDecimal::one();
    }
    token.derived_eth.clone()
}

/// Finds how many base asset units one unit of `token` is worth.
///
/// Only the token's whitelist pools are considered, and only the one holding
/// the most base asset value on the paired side is used (first one wins on
/// ties). A single hop, greedy walk: prices can disagree between tokens
/// when liquidity moves. Returns zero when no liquid pool is found.
pub fn find_eth_per_token<P: PricingSource>(config: &EngineConfig, token: &Token, source: &P) -> BigDecimal {
    log::debug!("finding ETH per token for {}", token.id);
    if config.is_base_asset(&token.id) {
        return BigDecimal::one();
    }

    let mut largest_liquidity_eth = BigDecimal::zero();
    let mut price_so_far = BigDecimal::zero();

    for pool_address in &token.whitelist_pools {
        let pool = match source.pool(pool_address) {
            None => {
                log::warn!("whitelist pool {} of token {} does not exist", pool_address, token.id);
                continue;
            }
            Some(pool) => pool,
        };

        if !pool.has_liquidity() {
            continue;
        }

        if pool.token0 == token.id {
            // whitelist token is token1
            let token1 = match source.token(&pool.token1) {
                None => {
                    log::warn!("token {} of pool {} does not exist", pool.token1, pool.id);
                    continue;
                }
                Some(token1) => token1,
            };
            let token1_derived_eth = derived_eth_or_base(config, &token1);

            let eth_locked = pool.total_value_locked_token1.clone().mul(&token1_derived_eth);
            if eth_locked.gt(&largest_liquidity_eth) {
                largest_liquidity_eth = eth_locked;
                // token1 per our token * ETH per token1
                price_so_far = token1_derived_eth.mul(&pool.ratio);
            }
        }

        if pool.token1 == token.id {
            let token0 = match source.token(&pool.token0) {
                None => {
                    log::warn!("token {} of pool {} does not exist", pool.token0, pool.id);
                    continue;
                }
                Some(token0) => token0,
            };
            let token0_derived_eth = derived_eth_or_base(config, &token0);

            let eth_locked = pool.total_value_locked_token0.clone().mul(&token0_derived_eth);
            if eth_locked.gt(&largest_liquidity_eth) {
                largest_liquidity_eth = eth_locked;
                // token0 per our token * ETH per token0
                price_so_far = math::safe_div(&token0_derived_eth, &pool.ratio);
            }
        }
    }

    log::debug!(
        "token {} derived eth price: {} (eth locked {})",
        token.id,
        price_so_far,
        largest_liquidity_eth
    );
    price_so_far
}
