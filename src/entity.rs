use crate::windows::Interval;
use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Bundle,
    Factory,
    Pool,
    Token,
    Transaction,
    Swap,
    Join,
    Exit,
    SwapData,
    JoinExitPoolData,
    PoolDayData,
    PoolHourData,
    TokenDayData,
    TokenHourData,
    GamutDayData,
    GamutHourData,
}

impl EntityKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Bundle => "Bundle",
            EntityKind::Factory => "Factory",
            EntityKind::Pool => "Pool",
            EntityKind::Token => "Token",
            EntityKind::Transaction => "Transaction",
            EntityKind::Swap => "Swap",
            EntityKind::Join => "Join",
            EntityKind::Exit => "Exit",
            EntityKind::SwapData => "SwapData",
            EntityKind::JoinExitPoolData => "JoinExitPoolData",
            EntityKind::PoolDayData => "PoolDayData",
            EntityKind::PoolHourData => "PoolHourData",
            EntityKind::TokenDayData => "TokenDayData",
            EntityKind::TokenHourData => "TokenHourData",
            EntityKind::GamutDayData => "GamutDayData",
            EntityKind::GamutHourData => "GamutHourData",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// Anything the engine loads from or saves to the entity store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Bundle(Bundle),
    Factory(Factory),
    Pool(Pool),
    Token(Token),
    Transaction(Transaction),
    Swap(Swap),
    Join(LiquidityRecord),
    Exit(LiquidityRecord),
    SwapData(SwapData),
    JoinExitPoolData(JoinExitPoolData),
    PoolWindow(PoolWindowData),
    TokenWindow(TokenWindowData),
    ProtocolWindow(ProtocolWindowData),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Bundle(_) => EntityKind::Bundle,
            Entity::Factory(_) => EntityKind::Factory,
            Entity::Pool(_) => EntityKind::Pool,
            Entity::Token(_) => EntityKind::Token,
            Entity::Transaction(_) => EntityKind::Transaction,
            Entity::Swap(_) => EntityKind::Swap,
            Entity::Join(_) => EntityKind::Join,
            Entity::Exit(_) => EntityKind::Exit,
            Entity::SwapData(_) => EntityKind::SwapData,
            Entity::JoinExitPoolData(_) => EntityKind::JoinExitPoolData,
            Entity::PoolWindow(data) => match data.interval {
                Interval::Day => EntityKind::PoolDayData,
                Interval::Hour => EntityKind::PoolHourData,
            },
            Entity::TokenWindow(data) => match data.interval {
                Interval::Day => EntityKind::TokenDayData,
                Interval::Hour => EntityKind::TokenHourData,
            },
            Entity::ProtocolWindow(data) => match data.interval {
                Interval::Day => EntityKind::GamutDayData,
                Interval::Hour => EntityKind::GamutHourData,
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Bundle(bundle) => &bundle.id,
            Entity::Factory(factory) => &factory.id,
            Entity::Pool(pool) => &pool.id,
            Entity::Token(token) => &token.id,
            Entity::Transaction(transaction) => &transaction.id,
            Entity::Swap(swap) => &swap.id,
            Entity::Join(join) => &join.id,
            Entity::Exit(exit) => &exit.id,
            Entity::SwapData(data) => &data.id,
            Entity::JoinExitPoolData(data) => &data.id,
            Entity::PoolWindow(data) => &data.id,
            Entity::TokenWindow(data) => &data.id,
            Entity::ProtocolWindow(data) => &data.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub eth_price_usd: BigDecimal,
}

impl Bundle {
    pub fn new(id: String) -> Self {
        Bundle {
            id,
            eth_price_usd: BigDecimal::zero(),
        }
    }
}

/// Protocol wide aggregate, one per deployment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Factory {
    pub id: String,
    pub pool_count: u64,
    pub tx_count: u64,
    pub total_volume_eth: BigDecimal,
    pub total_volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub total_fees_eth: BigDecimal,
    pub total_fees_usd: BigDecimal,
    pub total_value_locked_eth: BigDecimal,
    pub total_value_locked_usd: BigDecimal,
}

impl Factory {
    pub fn new(id: String) -> Self {
        let bigdecimal0 = BigDecimal::zero();
        Factory {
            id,
            pool_count: 0,
            tx_count: 0,
            total_volume_eth: bigdecimal0.clone(),
            total_volume_usd: bigdecimal0.clone(),
            untracked_volume_usd: bigdecimal0.clone(),
            total_fees_eth: bigdecimal0.clone(),
            total_fees_usd: bigdecimal0.clone(),
            total_value_locked_eth: bigdecimal0.clone(),
            total_value_locked_usd: bigdecimal0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub created_at_timestamp: u64,
    pub created_at_block_number: u64,
    pub token0: String,
    pub token1: String,
    /// Swap fee as a fixed-point integer.
    pub fee_tier: BigInt,
    pub weight0: BigDecimal,
    pub weight1: BigDecimal,
    /// Pool share token supply.
    pub liquidity: BigInt,
    pub ratio: BigDecimal,
    pub token0_price: BigDecimal,
    pub token1_price: BigDecimal,
    pub observation_index: u64,
    pub volume_token0: BigDecimal,
    pub volume_token1: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tx_count: u64,
    pub collected_fees_token0: BigDecimal,
    pub collected_fees_token1: BigDecimal,
    pub collected_fees_usd: BigDecimal,
    pub total_value_locked_token0: BigDecimal,
    pub total_value_locked_token1: BigDecimal,
    pub total_value_locked_eth: BigDecimal,
    pub total_value_locked_usd: BigDecimal,
}

impl Pool {
    pub fn new(id: String, token0: String, token1: String, fee_tier: BigInt) -> Self {
        let bigdecimal0 = BigDecimal::zero();
        Pool {
            id,
            created_at_timestamp: 0,
            created_at_block_number: 0,
            token0,
            token1,
            fee_tier,
            weight0: bigdecimal0.clone(),
            weight1: bigdecimal0.clone(),
            liquidity: BigInt::zero(),
            ratio: bigdecimal0.clone(),
            token0_price: bigdecimal0.clone(),
            token1_price: bigdecimal0.clone(),
            observation_index: 0,
            volume_token0: bigdecimal0.clone(),
            volume_token1: bigdecimal0.clone(),
            volume_usd: bigdecimal0.clone(),
            untracked_volume_usd: bigdecimal0.clone(),
            fees_usd: bigdecimal0.clone(),
            tx_count: 0,
            collected_fees_token0: bigdecimal0.clone(),
            collected_fees_token1: bigdecimal0.clone(),
            collected_fees_usd: bigdecimal0.clone(),
            total_value_locked_token0: bigdecimal0.clone(),
            total_value_locked_token1: bigdecimal0.clone(),
            total_value_locked_eth: bigdecimal0.clone(),
            total_value_locked_usd: bigdecimal0,
        }
    }

    pub fn has_liquidity(&self) -> bool {
        self.liquidity.gt(&BigInt::zero())
    }

    /// Returns the address of the token sitting across `token_address` in
    /// this pool.
    pub fn other_token(&self, token_address: &str) -> Option<&String> {
        if self.token0 == token_address {
            return Some(&self.token1);
        }
        if self.token1 == token_address {
            return Some(&self.token0);
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u64,
    pub derived_eth: BigDecimal,
    pub volume: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tx_count: u64,
    pub total_value_locked: BigDecimal,
    pub total_value_locked_usd: BigDecimal,
    /// Pools pairing this token with a whitelisted token. Append only.
    pub whitelist_pools: Vec<String>,
}

impl Token {
    pub fn new(id: String, symbol: String, name: String, decimals: u64) -> Self {
        let bigdecimal0 = BigDecimal::zero();
        Token {
            id,
            symbol,
            name,
            decimals,
            derived_eth: bigdecimal0.clone(),
            volume: bigdecimal0.clone(),
            volume_usd: bigdecimal0.clone(),
            untracked_volume_usd: bigdecimal0.clone(),
            fees_usd: bigdecimal0.clone(),
            tx_count: 0,
            total_value_locked: bigdecimal0.clone(),
            total_value_locked_usd: bigdecimal0,
            whitelist_pools: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub gas_used: u64,
    pub gas_price: BigInt,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    pub id: String,
    pub transaction: String,
    pub timestamp: u64,
    pub pool: String,
    pub token0: String,
    pub token1: String,
    pub sender: String,
    pub origin: String,
    pub amount0: BigDecimal,
    pub amount1: BigDecimal,
    pub amount_usd: BigDecimal,
    pub log_index: u64,
}

/// Immutable record of a join (deposit) or exit (withdrawal).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityRecord {
    pub id: String,
    pub transaction: String,
    pub timestamp: u64,
    pub pool: String,
    pub token0: String,
    pub token1: String,
    pub sender: String,
    pub origin: String,
    /// Change of the pool share supply caused by this event.
    pub amount: BigDecimal,
    pub amount0: BigDecimal,
    pub amount1: BigDecimal,
    pub amount_usd: BigDecimal,
    pub log_index: u64,
}

/// Router swap as it was emitted, raw amounts and all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapData {
    pub id: String,
    pub transaction: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub pool: String,
    pub sender: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: BigInt,
    pub amount_out: BigInt,
    pub protocol_swap_fee_amount: BigInt,
}

/// Router pool balance change as it was emitted. Amounts are unsigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinExitPoolData {
    pub id: String,
    pub transaction: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub pool: String,
    pub sender: String,
    pub token0: String,
    pub token1: String,
    pub amount0: BigInt,
    pub amount1: BigInt,
    pub fee_amount0: BigInt,
    pub fee_amount1: BigInt,
    pub is_join: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolWindowData {
    pub id: String,
    pub interval: Interval,
    pub period_start_unix: u64,
    pub pool: String,
    pub liquidity: BigInt,
    pub token0_price: BigDecimal,
    pub token1_price: BigDecimal,
    pub volume_token0: BigDecimal,
    pub volume_token1: BigDecimal,
    pub volume_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tvl_usd: BigDecimal,
    pub tx_count: u64,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenWindowData {
    pub id: String,
    pub interval: Interval,
    pub period_start_unix: u64,
    pub token: String,
    pub volume: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub total_value_locked: BigDecimal,
    pub total_value_locked_usd: BigDecimal,
    pub price_usd: BigDecimal,
    pub tx_count: u64,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolWindowData {
    pub id: String,
    pub interval: Interval,
    pub period_start_unix: u64,
    pub volume_eth: BigDecimal,
    pub volume_usd: BigDecimal,
    pub volume_usd_untracked: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tvl_usd: BigDecimal,
    pub tx_count: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_other_token() {
        let pool = Pool::new("0xp".to_string(), "0xa".to_string(), "0xb".to_string(), BigInt::zero());
        assert_eq!(Some(&"0xb".to_string()), pool.other_token("0xa"));
        assert_eq!(Some(&"0xa".to_string()), pool.other_token("0xb"));
        assert_eq!(None, pool.other_token("0xc"));
    }

    #[test]
    fn test_entity_kind_follows_window_interval() {
        let data = ProtocolWindowData {
            id: "10".to_string(),
            interval: Interval::Hour,
            period_start_unix: 36000,
            volume_eth: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            volume_usd_untracked: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            tvl_usd: BigDecimal::zero(),
            tx_count: 0,
        };
        let entity = Entity::ProtocolWindow(data);
        assert_eq!(EntityKind::GamutHourData, entity.kind());
        assert_eq!("10", entity.id());
        assert_eq!("GamutHourData", entity.kind().to_string());
    }
}
