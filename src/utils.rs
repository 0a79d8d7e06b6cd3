use crate::config::EngineConfig;
use crate::entity::{Entity, EntityKind, JoinExitPoolData, SwapData, Transaction};
use crate::event::{self, Event, EventMeta};
use crate::keyer;
use crate::store::EntityStore;
use crate::tables::Tables;
use bigdecimal::{BigDecimal, Zero};
use std::ops::{Add, Mul};

pub fn calculate_amount_usd(
    amount0: &BigDecimal,
    amount1: &BigDecimal,
    token0_derived_eth_price: &BigDecimal,
    token1_derived_eth_price: &BigDecimal,
    bundle_eth_price: &BigDecimal,
) -> BigDecimal {
    return amount0
        .clone()
        .mul(token0_derived_eth_price.clone().mul(bundle_eth_price.clone()))
        .add(amount1.clone().mul(token1_derived_eth_price.clone().mul(bundle_eth_price.clone())));
}

/// USD value of a trade counted as tracked volume. Only whitelisted tokens
/// are trusted to price a leg; callers halve the result since both legs
/// describe the same trade.
pub fn get_tracked_amount_usd(
    config: &EngineConfig,
    token0_id: &String,
    token1_id: &String,
    token0_derived_eth_price: &BigDecimal,
    token1_derived_eth_price: &BigDecimal,
    amount0_abs: &BigDecimal,
    amount1_abs: &BigDecimal,
    eth_price_in_usd: &BigDecimal,
) -> BigDecimal {
    let price0_usd = token0_derived_eth_price.clone().mul(eth_price_in_usd.clone());
    let price1_usd = token1_derived_eth_price.clone().mul(eth_price_in_usd.clone());

    log::debug!("price0_usd: {}", price0_usd);
    log::debug!("price1_usd: {}", price1_usd);

    let token0_whitelisted = config.is_whitelisted(token0_id);
    let token1_whitelisted = config.is_whitelisted(token1_id);

    // both are whitelist tokens, return sum of both amounts
    if token0_whitelisted && token1_whitelisted {
        return amount0_abs.clone().mul(price0_usd).add(amount1_abs.clone().mul(price1_usd));
    }

    // take double value of the whitelisted token amount
    if token0_whitelisted && !token1_whitelisted {
        return amount0_abs.clone().mul(price0_usd).mul(BigDecimal::from(2 as i32));
    }

    // take double value of the whitelisted token amount
    if !token0_whitelisted && token1_whitelisted {
        return amount1_abs.clone().mul(price1_usd).mul(BigDecimal::from(2 as i32));
    }

    // neither token is on white list, tracked amount is 0
    return BigDecimal::zero();
}

/// Returns the transaction the event belongs to, staging it on first sight.
pub fn load_transaction<S: EntityStore>(store: &S, tables: &mut Tables, meta: &EventMeta) -> Transaction {
    let transaction_id = keyer::transaction_id(&meta.transaction_hash);
    if let Some(Entity::Transaction(transaction)) = tables.load(store, EntityKind::Transaction, &transaction_id) {
        return transaction;
    }

    let transaction = Transaction {
        id: transaction_id,
        block_number: meta.block_number,
        timestamp: meta.timestamp,
        gas_used: meta.gas_used,
        gas_price: meta.gas_price.clone(),
    };
    tables.update_row(Entity::Transaction(transaction.clone()));
    transaction
}

/// Raw snapshot of a router event, keyed by `<transaction>-<logIndex>`.
/// Pool calls carry no router payload and get none.
pub fn event_data(router_event: &Event, pool_address: &str) -> Option<Entity> {
    let meta = router_event.meta();
    let transaction_id = keyer::transaction_id(&meta.transaction_hash);
    let id = keyer::event_data_id(&transaction_id, meta.log_index);

    match router_event {
        Event::RouterSwap(swap) => Some(Entity::SwapData(SwapData {
            id,
            transaction: transaction_id,
            block_number: meta.block_number,
            timestamp: meta.timestamp,
            pool: pool_address.to_string(),
            sender: keyer::normalize_address(&meta.from),
            token_in: keyer::normalize_address(&swap.token_in),
            token_out: keyer::normalize_address(&swap.token_out),
            amount_in: swap.amount_in.clone(),
            amount_out: swap.amount_out.clone(),
            protocol_swap_fee_amount: swap.protocol_swap_fee_amount.clone(),
        })),
        Event::PoolBalanceChanged(change) => Some(Entity::JoinExitPoolData(JoinExitPoolData {
            id,
            transaction: transaction_id,
            block_number: meta.block_number,
            timestamp: meta.timestamp,
            pool: pool_address.to_string(),
            sender: keyer::normalize_address(&change.liquidity_provider),
            token0: keyer::normalize_address(&change.tokens[0]),
            token1: keyer::normalize_address(&change.tokens[1]),
            amount0: event::abs(&change.deltas[0]),
            amount1: event::abs(&change.deltas[1]),
            fee_amount0: change.protocol_fee_amounts[0].clone(),
            fee_amount1: change.protocol_fee_amounts[1].clone(),
            is_join: change.is_join(),
        })),
        Event::OnSwap(_) | Event::OnJoinPool(_) | Event::OnExitPool(_) => None,
    }
}
