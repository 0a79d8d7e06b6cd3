use crate::keyer;
use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Serialize};

/// Transaction and block context shared by every event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    pub transaction_hash: Vec<u8>,
    pub log_index: u64,
    pub block_number: u64,
    pub timestamp: u64,
    pub gas_used: u64,
    pub gas_price: BigInt,
    /// Transaction sender.
    pub from: String,
}

/// Router `Swap(poolId, tokenIn, tokenOut, amountIn, amountOut, protocolSwapFeeAmount)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterSwap {
    pub meta: EventMeta,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: BigInt,
    pub amount_out: BigInt,
    pub protocol_swap_fee_amount: BigInt,
}

/// Router `PoolBalanceChanged(poolId, liquidityProvider, tokens, deltas, protocolFeeAmounts)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolBalanceChanged {
    pub meta: EventMeta,
    pub liquidity_provider: String,
    pub tokens: [String; 2],
    pub deltas: [BigInt; 2],
    pub protocol_fee_amounts: [BigInt; 2],
}

impl PoolBalanceChanged {
    /// A deposit moves at least one token into the pool, a withdrawal only
    /// takes tokens out.
    pub fn is_join(&self) -> bool {
        self.deltas.iter().any(|delta| delta.sign() == Sign::Plus)
    }
}

/// Pool `onSwap` call together with its returned amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnSwapCall {
    pub meta: EventMeta,
    pub pool: String,
    pub sender: String,
    pub token_in: String,
    pub amount_in: BigInt,
    pub amount_out: BigInt,
}

/// Pool `onJoinPool` call, `balances` indexed like the pool tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnJoinPoolCall {
    pub meta: EventMeta,
    pub pool: String,
    pub sender: String,
    pub balances: [BigInt; 2],
}

/// Pool `onExitPool` call, `balances` indexed like the pool tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnExitPoolCall {
    pub meta: EventMeta,
    pub pool: String,
    pub sender: String,
    pub balances: [BigInt; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    RouterSwap(RouterSwap),
    PoolBalanceChanged(PoolBalanceChanged),
    OnSwap(OnSwapCall),
    OnJoinPool(OnJoinPoolCall),
    OnExitPool(OnExitPoolCall),
}

impl Event {
    pub fn meta(&self) -> &EventMeta {
        match self {
            Event::RouterSwap(event) => &event.meta,
            Event::PoolBalanceChanged(event) => &event.meta,
            Event::OnSwap(call) => &call.meta,
            Event::OnJoinPool(call) => &call.meta,
            Event::OnExitPool(call) => &call.meta,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::RouterSwap(_) => "swap",
            Event::PoolBalanceChanged(_) => "pool_balance_changed",
            Event::OnSwap(_) => "on_swap",
            Event::OnJoinPool(_) => "on_join_pool",
            Event::OnExitPool(_) => "on_exit_pool",
        }
    }
}

/// How an event names the pool it touches.
#[derive(Clone, Debug, PartialEq)]
pub enum PoolRef {
    Address(String),
    /// Resolved through the factory. The order of the pair is the order the
    /// event lists its amounts in.
    Tokens(String, String),
}

/// A trade, whichever way it was observed.
#[derive(Clone, Debug, PartialEq)]
pub struct TradeDescription {
    pub meta: EventMeta,
    pub pool: PoolRef,
    pub token_in: String,
    pub amount_in: BigInt,
    /// Amount leaving the pool, protocol swap fee included.
    pub amount_out: BigInt,
    pub sender: String,
    pub origin: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiquidityKind {
    Join,
    Exit,
}

/// A deposit into or withdrawal from a pool. Amounts are unsigned, the
/// direction is carried by `kind`.
#[derive(Clone, Debug, PartialEq)]
pub struct LiquidityChange {
    pub meta: EventMeta,
    pub pool: PoolRef,
    pub kind: LiquidityKind,
    pub amounts: [BigInt; 2],
    pub protocol_fees: [BigInt; 2],
    pub sender: String,
    pub origin: String,
}

impl From<&RouterSwap> for TradeDescription {
    fn from(event: &RouterSwap) -> Self {
        TradeDescription {
            meta: event.meta.clone(),
            pool: PoolRef::Tokens(
                keyer::normalize_address(&event.token_in),
                keyer::normalize_address(&event.token_out),
            ),
            token_in: keyer::normalize_address(&event.token_in),
            amount_in: event.amount_in.clone(),
            amount_out: &event.amount_out + &event.protocol_swap_fee_amount,
            sender: keyer::normalize_address(&event.meta.from),
            origin: keyer::ADDRESS_ZERO.to_string(),
        }
    }
}

impl From<&OnSwapCall> for TradeDescription {
    fn from(call: &OnSwapCall) -> Self {
        TradeDescription {
            meta: call.meta.clone(),
            pool: PoolRef::Address(keyer::normalize_address(&call.pool)),
            token_in: keyer::normalize_address(&call.token_in),
            amount_in: call.amount_in.clone(),
            amount_out: call.amount_out.clone(),
            sender: keyer::normalize_address(&call.sender),
            origin: keyer::normalize_address(&call.meta.from),
        }
    }
}

impl From<&PoolBalanceChanged> for LiquidityChange {
    fn from(event: &PoolBalanceChanged) -> Self {
        let kind = if event.is_join() {
            LiquidityKind::Join
        } else {
            LiquidityKind::Exit
        };
        LiquidityChange {
            meta: event.meta.clone(),
            pool: PoolRef::Tokens(
                keyer::normalize_address(&event.tokens[0]),
                keyer::normalize_address(&event.tokens[1]),
            ),
            kind,
            amounts: [abs(&event.deltas[0]), abs(&event.deltas[1])],
            protocol_fees: event.protocol_fee_amounts.clone(),
            sender: keyer::normalize_address(&event.liquidity_provider),
            origin: keyer::normalize_address(&event.meta.from),
        }
    }
}

impl From<&OnJoinPoolCall> for LiquidityChange {
    fn from(call: &OnJoinPoolCall) -> Self {
        liquidity_change_from_call(&call.meta, &call.pool, &call.sender, &call.balances, LiquidityKind::Join)
    }
}

impl From<&OnExitPoolCall> for LiquidityChange {
    fn from(call: &OnExitPoolCall) -> Self {
        liquidity_change_from_call(&call.meta, &call.pool, &call.sender, &call.balances, LiquidityKind::Exit)
    }
}

fn liquidity_change_from_call(
    meta: &EventMeta,
    pool: &String,
    sender: &String,
    balances: &[BigInt; 2],
    kind: LiquidityKind,
) -> LiquidityChange {
    LiquidityChange {
        meta: meta.clone(),
        pool: PoolRef::Address(keyer::normalize_address(pool)),
        kind,
        // each token reads its own balance slot
        amounts: [abs(&balances[0]), abs(&balances[1])],
        protocol_fees: [BigInt::from(0), BigInt::from(0)],
        sender: keyer::normalize_address(sender),
        origin: keyer::normalize_address(&meta.from),
    }
}

pub(crate) fn abs(amount: &BigInt) -> BigInt {
    match amount.sign() {
        Sign::Minus => -amount,
        _ => amount.clone(),
    }
}
