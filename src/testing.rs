use crate::config::EngineConfig;
use crate::entity::{Pool, Token};
use crate::event::EventMeta;
use crate::math;
use crate::price::PricingSource;
use crate::rpc::ChainReader;
use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use std::collections::HashMap;
use std::str::FromStr;

pub const FACTORY: &str = "0x00000000000000000000000000000000000000f0";
pub const BASE: &str = "0x00000000000000000000000000000000000000e1";
pub const USDC: &str = "0x00000000000000000000000000000000000000e2";
pub const TOKEN_X: &str = "0x00000000000000000000000000000000000000b1";
pub const TOKEN_Y: &str = "0x00000000000000000000000000000000000000b2";
pub const POOL_A: &str = "0x00000000000000000000000000000000000000a1";
pub const POOL_B: &str = "0x00000000000000000000000000000000000000a2";
pub const QUARANTINED_POOL: &str = "0x00000000000000000000000000000000000000a6";
pub const USD_POOL: &str = "0x00000000000000000000000000000000000000a9";
pub const SENDER: &str = "0x00000000000000000000000000000000000000d1";

// 2022-03-01T12:30:00Z
pub const TIMESTAMP: u64 = 1646137800;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> EngineConfig {
    EngineConfig {
        factory_address: FACTORY.to_string(),
        base_asset: BASE.to_string(),
        usd_reference_pool: USD_POOL.to_string(),
        whitelist_tokens: vec![BASE.to_string(), USDC.to_string()],
        quarantined_pools: vec![QUARANTINED_POOL.to_string()],
        fee_tier_exponent: 17,
        weight_decimals: 18,
        share_decimals: 18,
    }
}

pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

/// Raw on-chain integer for a human readable amount.
pub fn raw(value: &str, decimals: u64) -> BigInt {
    let scaled = dec(value) * math::exponent_to_big_decimal(decimals);
    let (digits, scale) = scaled.with_scale(0).as_bigint_and_exponent();
    assert_eq!(0, scale);
    digits
}

pub fn token(address: &str, decimals: u64) -> Token {
    Token::new(address.to_string(), "TKN".to_string(), "Token".to_string(), decimals)
}

pub fn pool(address: &str, token0: &str, token1: &str) -> Pool {
    Pool::new(address.to_string(), token0.to_string(), token1.to_string(), BigInt::zero())
}

pub fn meta(transaction: u8) -> EventMeta {
    EventMeta {
        transaction_hash: vec![transaction; 32],
        log_index: 0,
        block_number: 1000,
        timestamp: TIMESTAMP,
        gas_used: 21000,
        gas_price: BigInt::from(1000000000 as i64),
        from: SENDER.to_string(),
    }
}

#[derive(Default)]
pub struct MemorySource {
    pools: HashMap<String, Pool>,
    tokens: HashMap<String, Token>,
}

impl MemorySource {
    pub fn add_pool(&mut self, pool: Pool) {
        self.pools.insert(pool.id.clone(), pool);
    }

    pub fn add_token(&mut self, token: Token) {
        self.tokens.insert(token.id.clone(), token);
    }
}

impl PricingSource for MemorySource {
    fn pool(&self, pool_address: &str) -> Option<Pool> {
        self.pools.get(pool_address).cloned()
    }

    fn token(&self, token_address: &str) -> Option<Token> {
        self.tokens.get(token_address).cloned()
    }
}

/// Chain state answered from memory. Pools nothing was set for fail every
/// call.
#[derive(Default)]
pub struct MemoryChain {
    balances: HashMap<String, (BigInt, BigInt)>,
    weights: HashMap<String, (BigInt, BigInt)>,
    swap_fees: HashMap<String, BigInt>,
    total_supplies: HashMap<String, BigInt>,
    pools_by_tokens: HashMap<(String, String), String>,
}

impl MemoryChain {
    pub fn set_balances(&mut self, pool: &str, balance0: BigInt, balance1: BigInt) {
        self.balances.insert(pool.to_string(), (balance0, balance1));
    }

    pub fn set_weights(&mut self, pool: &str, weight0: &str, weight1: &str) {
        self.weights
            .insert(pool.to_string(), (raw(weight0, 18), raw(weight1, 18)));
    }

    pub fn set_swap_fee(&mut self, pool: &str, fee: BigInt) {
        self.swap_fees.insert(pool.to_string(), fee);
    }

    pub fn set_total_supply(&mut self, pool: &str, supply: BigInt) {
        self.total_supplies.insert(pool.to_string(), supply);
    }

    pub fn register_pool(&mut self, pool: &str, token0: &str, token1: &str) {
        self.pools_by_tokens
            .insert((token0.to_string(), token1.to_string()), pool.to_string());
    }
}

impl ChainReader for MemoryChain {
    fn pool_balances(&self, pool_address: &str) -> Option<(BigInt, BigInt)> {
        self.balances.get(pool_address).cloned()
    }

    fn pool_weights(&self, pool_address: &str) -> Option<(BigInt, BigInt)> {
        self.weights.get(pool_address).cloned()
    }

    fn swap_fee_percentage(&self, pool_address: &str) -> Option<BigInt> {
        self.swap_fees.get(pool_address).cloned()
    }

    fn total_supply(&self, pool_address: &str) -> Option<BigInt> {
        self.total_supplies.get(pool_address).cloned()
    }

    fn pool_for_tokens(&self, token_a: &str, token_b: &str) -> Option<String> {
        let key = (token_a.to_string(), token_b.to_string());
        let reversed = (token_b.to_string(), token_a.to_string());
        self.pools_by_tokens
            .get(&key)
            .or_else(|| self.pools_by_tokens.get(&reversed))
            .cloned()
    }
}
