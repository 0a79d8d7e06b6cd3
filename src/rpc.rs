use crate::error::Error;
use num_bigint::BigInt;

/// Read-only queries against pool and factory contracts, answered at the
/// block of the event being processed. Values are raw on-chain integers.
pub trait ChainReader {
    /// `getPoolBalancesAndChangeBlock`: balances of token0 and token1.
    fn pool_balances(&self, pool_address: &str) -> Option<(BigInt, BigInt)>;

    /// `getWeights`: normalized weights of token0 and token1.
    fn pool_weights(&self, pool_address: &str) -> Option<(BigInt, BigInt)>;

    /// `getSwapFeePercentage`.
    fn swap_fee_percentage(&self, pool_address: &str) -> Option<BigInt>;

    /// `totalSupply` of the pool share token.
    fn total_supply(&self, pool_address: &str) -> Option<BigInt>;

    /// Factory `getPool(tokenA, tokenB)`.
    fn pool_for_tokens(&self, token_a: &str, token_b: &str) -> Option<String>;
}

pub fn pool_balances_call<C: ChainReader>(chain: &C, pool_address: &String) -> Result<(BigInt, BigInt), Error> {
    chain
        .pool_balances(pool_address)
        .ok_or_else(|| Error::chain_call(pool_address.as_str(), "getPoolBalancesAndChangeBlock"))
}

pub fn pool_weights_call<C: ChainReader>(chain: &C, pool_address: &String) -> Result<(BigInt, BigInt), Error> {
    chain
        .pool_weights(pool_address)
        .ok_or_else(|| Error::chain_call(pool_address.as_str(), "getWeights"))
}

pub fn swap_fee_percentage_call<C: ChainReader>(chain: &C, pool_address: &String) -> Result<BigInt, Error> {
    chain
        .swap_fee_percentage(pool_address)
        .ok_or_else(|| Error::chain_call(pool_address.as_str(), "getSwapFeePercentage"))
}

pub fn total_supply_call<C: ChainReader>(chain: &C, pool_address: &String) -> Result<BigInt, Error> {
    chain
        .total_supply(pool_address)
        .ok_or_else(|| Error::chain_call(pool_address.as_str(), "totalSupply"))
}
