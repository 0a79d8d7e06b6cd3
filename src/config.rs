use crate::error::Error;
use crate::keyer;
use serde::Deserialize;

const FACTORY_ADDRESS: &str = "0xd8248acf1241dbd18e2b44b96be0ffe42307c06c";
const TETH_ADDRESS: &str = "0x0f3cd4d9cfc58aa42426fd7742837175ccea5918";
const USDC_ADDRESS: &str = "0x2a12b95dba4383f2537901df1f113bbd566a48d1";
const DAI_ADDRESS: &str = "0xec3be3f94b7e4bc635603537087c53355b180723";
const BTC_ADDRESS: &str = "0x1cbfd025eb289b9c806a034cbd48d89234971700";
const USDC_TETH_POOL: &str = "0x1719c44ca5bed9590c7d21e5144121ebf762196e";

// hot fix for bad pricing
const BAD_PRICING_POOL: &str = "0x9663f2ca0454accad3e094448ea6f77443880454";

/// Deployment constants the engine prices and aggregates against.
///
/// Every address is kept as lowercase `0x` hex so it can be compared with
/// entity ids directly.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Id of the protocol (factory) aggregate.
    pub factory_address: String,
    /// Reference asset every `derived_eth` price is expressed in.
    pub base_asset: String,
    /// Pool pairing a USD stablecoin with the base asset.
    pub usd_reference_pool: String,
    /// Tokens trusted as USD anchors for tracked volume.
    pub whitelist_tokens: Vec<String>,
    /// Pools whose swaps are never processed.
    pub quarantined_pools: Vec<String>,
    /// Fee tiers are stored as integers scaled by `10^fee_tier_exponent`.
    pub fee_tier_exponent: u64,
    pub weight_decimals: u64,
    pub share_decimals: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            factory_address: FACTORY_ADDRESS.to_string(),
            base_asset: TETH_ADDRESS.to_string(),
            usd_reference_pool: USDC_TETH_POOL.to_string(),
            whitelist_tokens: vec![
                TETH_ADDRESS.to_string(),
                USDC_ADDRESS.to_string(),
                DAI_ADDRESS.to_string(),
                BTC_ADDRESS.to_string(),
            ],
            quarantined_pools: vec![BAD_PRICING_POOL.to_string()],
            fee_tier_exponent: 17,
            weight_decimals: 18,
            share_decimals: 18,
        }
    }
}

impl EngineConfig {
    pub fn from_json(input: &str) -> Result<Self, Error> {
        let config: EngineConfig = serde_json::from_str(input)?;
        Ok(config.normalized())
    }

    /// Lowercases every configured address.
    pub fn normalized(mut self) -> Self {
        self.factory_address = keyer::normalize_address(&self.factory_address);
        self.base_asset = keyer::normalize_address(&self.base_asset);
        self.usd_reference_pool = keyer::normalize_address(&self.usd_reference_pool);
        self.whitelist_tokens = self
            .whitelist_tokens
            .iter()
            .map(|token| keyer::normalize_address(token))
            .collect();
        self.quarantined_pools = self
            .quarantined_pools
            .iter()
            .map(|pool| keyer::normalize_address(pool))
            .collect();
        self
    }

    pub fn is_whitelisted(&self, token_address: &str) -> bool {
        self.whitelist_tokens.iter().any(|token| token == token_address)
    }

    pub fn is_base_asset(&self, token_address: &str) -> bool {
        self.base_asset == token_address
    }

    pub fn is_quarantined(&self, pool_address: &str) -> bool {
        self.quarantined_pools.iter().any(|pool| pool == pool_address)
    }
}
