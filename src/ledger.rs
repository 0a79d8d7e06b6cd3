use crate::config::EngineConfig;
use crate::entity::{Bundle, Entity, EntityKind, Factory, LiquidityRecord, Pool, Swap, Token};
use crate::error::Error;
use crate::event::{Event, LiquidityChange, LiquidityKind, PoolRef, TradeDescription};
use crate::helper;
use crate::keyer;
use crate::math;
use crate::price::{self, PricingSource};
use crate::rpc::{self, ChainReader};
use crate::store::EntityStore;
use crate::tables::Tables;
use crate::utils;
use crate::windows::{self, VolumeDelta};
use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The event was applied and produced the ledger record `record_id`.
    Applied { record_id: String },
    /// The event touched a quarantined pool and was skipped.
    Quarantined,
}

/// Applies swaps, joins and exits to the entity graph, one event at a time.
///
/// Every entity touched by an event is staged in a [`Tables`] batch and only
/// written to the store once the whole event went through. A failing event
/// leaves the store as it found it.
pub struct Engine<'a, C: ChainReader> {
    config: &'a EngineConfig,
    chain: &'a C,
}

impl<'a, C: ChainReader> Engine<'a, C> {
    pub fn new(config: &'a EngineConfig, chain: &'a C) -> Self {
        Engine { config, chain }
    }

    pub fn process_event<S: EntityStore>(&self, store: &mut S, event: &Event) -> Result<Outcome, Error> {
        let result = match event {
            Event::RouterSwap(swap) => self.apply_swap(store, &TradeDescription::from(swap), Some(event)),
            Event::OnSwap(call) => self.apply_swap(store, &TradeDescription::from(call), Some(event)),
            Event::PoolBalanceChanged(change) => {
                self.apply_liquidity_change(store, &LiquidityChange::from(change), Some(event))
            }
            Event::OnJoinPool(call) => self.apply_liquidity_change(store, &LiquidityChange::from(call), Some(event)),
            Event::OnExitPool(call) => self.apply_liquidity_change(store, &LiquidityChange::from(call), Some(event)),
        };

        let meta = event.meta();
        match &result {
            Ok(Outcome::Applied { record_id }) => {
                log::info!("{} event applied, record {}", event.name(), record_id);
            }
            Ok(Outcome::Quarantined) => {
                log::info!(
                    "{} event {}-{} skipped, quarantined pool",
                    event.name(),
                    keyer::transaction_id(&meta.transaction_hash),
                    meta.log_index
                );
            }
            Err(err) => {
                log::error!(
                    "{} event {}-{} aborted: {}",
                    event.name(),
                    keyer::transaction_id(&meta.transaction_hash),
                    meta.log_index,
                    err
                );
            }
        }
        result
    }

    pub fn handle_swap<S: EntityStore>(&self, store: &mut S, trade: &TradeDescription) -> Result<Outcome, Error> {
        self.apply_swap(store, trade, None)
    }

    pub fn handle_liquidity_change<S: EntityStore>(
        &self,
        store: &mut S,
        change: &LiquidityChange,
    ) -> Result<Outcome, Error> {
        self.apply_liquidity_change(store, change, None)
    }

    fn apply_swap<S: EntityStore>(
        &self,
        store: &mut S,
        trade: &TradeDescription,
        raw_event: Option<&Event>,
    ) -> Result<Outcome, Error> {
        let pool_address = self.resolve_pool(&trade.pool)?;
        if self.config.is_quarantined(&pool_address) {
            return Ok(Outcome::Quarantined);
        }

        let mut tables = Tables::new();
        let mut bundle = self.load_bundle(store, &tables);
        let mut factory = helper::get_factory(store, &tables, &self.config.factory_address)?;
        let mut pool = helper::get_pool(store, &tables, &pool_address)?;
        let mut token0 = helper::get_token(store, &tables, &pool.token0)?;
        let mut token1 = helper::get_token(store, &tables, &pool.token1)?;

        // amounts - 0/1 are token deltas: can be positive or negative
        let (amount0, amount1) = if trade.token_in == pool.token0 {
            (
                math::to_decimal(&trade.amount_in, token0.decimals),
                math::to_decimal(&trade.amount_out, token1.decimals).neg(),
            )
        } else if trade.token_in == pool.token1 {
            (
                math::to_decimal(&trade.amount_out, token0.decimals).neg(),
                math::to_decimal(&trade.amount_in, token1.decimals),
            )
        } else {
            return Err(Error::TokenNotInPool {
                pool: pool.id.clone(),
                token: trade.token_in.clone(),
            });
        };

        // need absolute amounts for volume
        let amount0_abs = math::absolute(&amount0);
        let amount1_abs = math::absolute(&amount1);

        let amount0_usd = amount0_abs
            .clone()
            .mul(&token0.derived_eth)
            .mul(&bundle.eth_price_usd);
        let amount1_usd = amount1_abs
            .clone()
            .mul(&token1.derived_eth)
            .mul(&bundle.eth_price_usd);

        // get amount that should be tracked only - div 2 because cant count both input and output as volume
        let tracked_usd = utils::get_tracked_amount_usd(
            self.config,
            &token0.id,
            &token1.id,
            &token0.derived_eth,
            &token1.derived_eth,
            &amount0_abs,
            &amount1_abs,
            &bundle.eth_price_usd,
        )
        .div(BigDecimal::from(2 as i32));
        let tracked_eth = math::safe_div(&tracked_usd, &bundle.eth_price_usd);
        let untracked_usd = (amount0_usd + amount1_usd).div(BigDecimal::from(2 as i32));

        let fee_tier = BigDecimal::new(pool.fee_tier.clone(), 0);
        let fee_scale = math::exponent_to_big_decimal(self.config.fee_tier_exponent);
        let fees_eth = tracked_eth.clone().mul(&fee_tier).div(&fee_scale);
        let fees_usd = tracked_usd.clone().mul(&fee_tier).div(&fee_scale);

        log::debug!(
            "swap on {}: amount0 {} amount1 {} tracked usd {} untracked usd {} fees usd {}",
            pool.id,
            amount0,
            amount1,
            tracked_usd,
            untracked_usd,
            fees_usd
        );

        // global updates
        factory.tx_count += 1;
        factory.total_volume_eth.add_assign(&tracked_eth);
        factory.total_volume_usd.add_assign(&tracked_usd);
        factory.untracked_volume_usd.add_assign(&untracked_usd);
        factory.total_fees_eth.add_assign(&fees_eth);
        factory.total_fees_usd.add_assign(&fees_usd);

        // reset aggregate tvl before individual pool tvl updates
        factory.total_value_locked_eth.sub_assign(&pool.total_value_locked_eth);
        factory.total_value_locked_usd.sub_assign(&pool.total_value_locked_usd);

        pool.volume_token0.add_assign(&amount0_abs);
        pool.volume_token1.add_assign(&amount1_abs);
        pool.volume_usd.add_assign(&tracked_usd);
        pool.untracked_volume_usd.add_assign(&untracked_usd);
        pool.fees_usd.add_assign(&fees_usd);
        pool.tx_count += 1;
        pool.total_value_locked_token0.add_assign(&amount0);
        pool.total_value_locked_token1.add_assign(&amount1);

        add_swap_to_token(&mut token0, &amount0, &amount0_abs, &tracked_usd, &untracked_usd, &fees_usd);
        add_swap_to_token(&mut token1, &amount1, &amount1_abs, &tracked_usd, &untracked_usd, &fees_usd);

        self.refresh_prices(store, &tables, &mut bundle, &mut pool, &mut token0, &mut token1)?;
        refresh_total_value_locked(&bundle, &mut factory, &mut pool, &mut token0, &mut token1);

        let transaction = utils::load_transaction(store, &mut tables, &trade.meta);
        if let Some(data) = raw_event.and_then(|event| utils::event_data(event, &pool.id)) {
            tables.update_row(data);
        }
        let record_id = self.record_id(store, &tables, EntityKind::Swap, &transaction.id, &pool, trade.meta.log_index);
        tables.update_row(Entity::Swap(Swap {
            id: record_id.clone(),
            transaction: transaction.id.clone(),
            timestamp: transaction.timestamp,
            pool: pool.id.clone(),
            token0: pool.token0.clone(),
            token1: pool.token1.clone(),
            sender: trade.sender.clone(),
            origin: trade.origin.clone(),
            amount0,
            amount1,
            amount_usd: tracked_usd.clone(),
            log_index: trade.meta.log_index,
        }));

        let volume = VolumeDelta {
            amount0_abs,
            amount1_abs,
            tracked_eth,
            tracked_usd,
            untracked_usd,
            fees_usd,
        };
        windows::update_windows(
            store,
            &mut tables,
            &bundle,
            &factory,
            &pool,
            &token0,
            &token1,
            trade.meta.timestamp,
            Some(&volume),
        );

        stage(&mut tables, bundle, factory, pool, token0, token1);
        let written = tables.flush(store);
        log::debug!("swap {} wrote {} entities", record_id, written);

        Ok(Outcome::Applied { record_id })
    }

    fn apply_liquidity_change<S: EntityStore>(
        &self,
        store: &mut S,
        change: &LiquidityChange,
        raw_event: Option<&Event>,
    ) -> Result<Outcome, Error> {
        let pool_address = self.resolve_pool(&change.pool)?;
        if self.config.is_quarantined(&pool_address) {
            return Ok(Outcome::Quarantined);
        }

        let mut tables = Tables::new();
        let mut bundle = self.load_bundle(store, &tables);
        let mut factory = helper::get_factory(store, &tables, &self.config.factory_address)?;
        let mut pool = helper::get_pool(store, &tables, &pool_address)?;
        let mut token0 = helper::get_token(store, &tables, &pool.token0)?;
        let mut token1 = helper::get_token(store, &tables, &pool.token1)?;

        let (amounts, protocol_fees) = align_to_pool(change, &pool)?;
        let amount0 = math::to_decimal(&amounts[0], token0.decimals);
        let amount1 = math::to_decimal(&amounts[1], token1.decimals);
        let fee0 = math::to_decimal(&protocol_fees[0], token0.decimals);
        let fee1 = math::to_decimal(&protocol_fees[1], token1.decimals);

        // joins and exits can move the weights and the swap fee
        let (weight0, weight1) = rpc::pool_weights_call(self.chain, &pool.id)?;
        pool.weight0 = math::to_decimal(&weight0, self.config.weight_decimals);
        pool.weight1 = math::to_decimal(&weight1, self.config.weight_decimals);
        pool.fee_tier = rpc::swap_fee_percentage_call(self.chain, &pool.id)?;
        let total_supply = rpc::total_supply_call(self.chain, &pool.id)?;
        pool.observation_index += 1;

        pool.collected_fees_token0.add_assign(&fee0);
        pool.collected_fees_token1.add_assign(&fee1);
        pool.collected_fees_usd.add_assign(&utils::calculate_amount_usd(
            &fee0,
            &fee1,
            &token0.derived_eth,
            &token1.derived_eth,
            &bundle.eth_price_usd,
        ));

        let amount_usd = utils::calculate_amount_usd(
            &amount0,
            &amount1,
            &token0.derived_eth,
            &token1.derived_eth,
            &bundle.eth_price_usd,
        );

        // reset tvl aggregates until new amounts calculated
        factory.total_value_locked_eth.sub_assign(&pool.total_value_locked_eth);
        factory.total_value_locked_usd.sub_assign(&pool.total_value_locked_usd);
        factory.tx_count += 1;

        let tvl_delta0 = liquidity_delta(change.kind, &amount0, &fee0);
        let tvl_delta1 = liquidity_delta(change.kind, &amount1, &fee1);

        token0.tx_count += 1;
        token0.total_value_locked.add_assign(&tvl_delta0);
        token1.tx_count += 1;
        token1.total_value_locked.add_assign(&tvl_delta1);

        pool.tx_count += 1;
        pool.total_value_locked_token0.add_assign(&tvl_delta0);
        pool.total_value_locked_token1.add_assign(&tvl_delta1);

        // share supply change, taken before liquidity is overwritten
        let share_delta: BigInt = match change.kind {
            LiquidityKind::Join => total_supply.clone().sub(&pool.liquidity),
            LiquidityKind::Exit => pool.liquidity.clone().sub(&total_supply),
        };
        pool.liquidity = total_supply;

        log::debug!(
            "{:?} on {}: amount0 {} amount1 {} fee0 {} fee1 {} shares {}",
            change.kind,
            pool.id,
            amount0,
            amount1,
            fee0,
            fee1,
            share_delta
        );

        self.refresh_prices(store, &tables, &mut bundle, &mut pool, &mut token0, &mut token1)?;
        refresh_total_value_locked(&bundle, &mut factory, &mut pool, &mut token0, &mut token1);

        let transaction = utils::load_transaction(store, &mut tables, &change.meta);
        if let Some(data) = raw_event.and_then(|event| utils::event_data(event, &pool.id)) {
            tables.update_row(data);
        }
        let kind = match change.kind {
            LiquidityKind::Join => EntityKind::Join,
            LiquidityKind::Exit => EntityKind::Exit,
        };
        let record_id = self.record_id(store, &tables, kind, &transaction.id, &pool, change.meta.log_index);
        let record = LiquidityRecord {
            id: record_id.clone(),
            transaction: transaction.id.clone(),
            timestamp: transaction.timestamp,
            pool: pool.id.clone(),
            token0: pool.token0.clone(),
            token1: pool.token1.clone(),
            sender: change.sender.clone(),
            origin: change.origin.clone(),
            amount: math::to_decimal(&share_delta, self.config.share_decimals),
            amount0,
            amount1,
            amount_usd,
            log_index: change.meta.log_index,
        };
        tables.update_row(match change.kind {
            LiquidityKind::Join => Entity::Join(record),
            LiquidityKind::Exit => Entity::Exit(record),
        });

        windows::update_windows(
            store,
            &mut tables,
            &bundle,
            &factory,
            &pool,
            &token0,
            &token1,
            change.meta.timestamp,
            None,
        );

        stage(&mut tables, bundle, factory, pool, token0, token1);
        let written = tables.flush(store);
        log::debug!("{} {} wrote {} entities", kind, record_id, written);

        Ok(Outcome::Applied { record_id })
    }

    fn resolve_pool(&self, pool: &PoolRef) -> Result<String, Error> {
        return match pool {
            PoolRef::Address(address) => Ok(address.clone()),
            PoolRef::Tokens(token0, token1) => match self.chain.pool_for_tokens(token0, token1) {
                Some(address) => Ok(keyer::normalize_address(&address)),
                None => Err(Error::PoolNotFoundForTokens {
                    token0: token0.clone(),
                    token1: token1.clone(),
                }),
            },
        };
    }

    fn load_bundle<S: EntityStore>(&self, store: &S, tables: &Tables) -> Bundle {
        let bundle_id = keyer::bundle_id();
        match helper::get_bundle(store, tables, &bundle_id) {
            Some(bundle) => bundle,
            None => {
                log::info!("initializing bundle {}", bundle_id);
                Bundle::new(bundle_id)
            }
        }
    }

    fn record_id<S: EntityStore>(
        &self,
        store: &S,
        tables: &Tables,
        kind: EntityKind,
        transaction_id: &String,
        pool: &Pool,
        log_index: u64,
    ) -> String {
        let record_id = keyer::ledger_record_id(transaction_id, pool.tx_count);
        if helper::has_entity(store, tables, kind, &record_id) {
            return keyer::ledger_record_id_with_log_index(transaction_id, pool.tx_count, log_index);
        }
        record_id
    }

    /// Refreshes the base asset USD price, the pool rates and both tokens'
    /// `derived_eth`, in that order. Both tokens are priced from the state
    /// they had before this refresh.
    fn refresh_prices<S: EntityStore>(
        &self,
        store: &S,
        tables: &Tables,
        bundle: &mut Bundle,
        pool: &mut Pool,
        token0: &mut Token,
        token1: &mut Token,
    ) -> Result<(), Error> {
        let (raw_balance0, raw_balance1) = rpc::pool_balances_call(self.chain, &pool.id)?;
        let balance0 = math::to_decimal(&raw_balance0, token0.decimals);
        let balance1 = math::to_decimal(&raw_balance1, token1.decimals);

        bundle.eth_price_usd = self.eth_price_in_usd(store, tables, pool, &balance0, &balance1)?;

        pool.ratio = price::pool_ratio(&balance0, &balance1, &pool.weight0, &pool.weight1);
        let (token0_price, token1_price) = price::token_prices(&pool.ratio);
        pool.token0_price = token0_price;
        pool.token1_price = token1_price;

        let source = EventPricing {
            store,
            tables,
            pool: &*pool,
            tokens: [&*token0, &*token1],
        };
        let token0_derived_eth = price::find_eth_per_token(self.config, &*token0, &source);
        let token1_derived_eth = price::find_eth_per_token(self.config, &*token1, &source);

        token0.derived_eth = token0_derived_eth;
        token1.derived_eth = token1_derived_eth;

        log::debug!(
            "pool {} ratio {} eth price usd {} token0 derived eth {} token1 derived eth {}",
            pool.id,
            pool.ratio,
            bundle.eth_price_usd,
            token0.derived_eth,
            token1.derived_eth
        );
        Ok(())
    }

    fn eth_price_in_usd<S: EntityStore>(
        &self,
        store: &S,
        tables: &Tables,
        pool: &Pool,
        balance0: &BigDecimal,
        balance1: &BigDecimal,
    ) -> Result<BigDecimal, Error> {
        if pool.id == self.config.usd_reference_pool {
            let ratio = price::pool_ratio(balance0, balance1, &pool.weight0, &pool.weight1);
            return Ok(price::get_eth_price_in_usd(self.config, Some(pool), &ratio));
        }

        let usd_pool = match tables.load(store, EntityKind::Pool, &self.config.usd_reference_pool) {
            Some(Entity::Pool(usd_pool)) => usd_pool,
            _ => {
                log::warn!("usd reference pool {} does not exist", self.config.usd_reference_pool);
                return Ok(BigDecimal::zero());
            }
        };

        let (decimals0, decimals1) = match (
            tables.load(store, EntityKind::Token, &usd_pool.token0),
            tables.load(store, EntityKind::Token, &usd_pool.token1),
        ) {
            (Some(Entity::Token(usd_token0)), Some(Entity::Token(usd_token1))) => {
                (usd_token0.decimals, usd_token1.decimals)
            }
            _ => {
                log::warn!("tokens of usd reference pool {} do not exist", usd_pool.id);
                return Ok(BigDecimal::zero());
            }
        };

        let (raw_balance0, raw_balance1) = rpc::pool_balances_call(self.chain, &usd_pool.id)?;
        let ratio = price::pool_ratio(
            &math::to_decimal(&raw_balance0, decimals0),
            &math::to_decimal(&raw_balance1, decimals1),
            &usd_pool.weight0,
            &usd_pool.weight1,
        );
        Ok(price::get_eth_price_in_usd(self.config, Some(&usd_pool), &ratio))
    }
}

/// Prices against the event's in-flight pool and tokens, falling back to the
/// staged rows and then the store for everything else.
struct EventPricing<'a, S: EntityStore> {
    store: &'a S,
    tables: &'a Tables,
    pool: &'a Pool,
    tokens: [&'a Token; 2],
}

impl<'a, S: EntityStore> PricingSource for EventPricing<'a, S> {
    fn pool(&self, pool_address: &str) -> Option<Pool> {
        if self.pool.id == pool_address {
            return Some(self.pool.clone());
        }
        match self.tables.load(self.store, EntityKind::Pool, pool_address) {
            Some(Entity::Pool(pool)) => Some(pool),
            _ => None,
        }
    }

    fn token(&self, token_address: &str) -> Option<Token> {
        for token in self.tokens {
            if token.id == token_address {
                return Some(token.clone());
            }
        }
        match self.tables.load(self.store, EntityKind::Token, token_address) {
            Some(Entity::Token(token)) => Some(token),
            _ => None,
        }
    }
}

fn add_swap_to_token(
    token: &mut Token,
    amount: &BigDecimal,
    amount_abs: &BigDecimal,
    tracked_usd: &BigDecimal,
    untracked_usd: &BigDecimal,
    fees_usd: &BigDecimal,
) {
    token.volume.add_assign(amount_abs);
    token.total_value_locked.add_assign(amount);
    token.volume_usd.add_assign(tracked_usd);
    token.untracked_volume_usd.add_assign(untracked_usd);
    token.fees_usd.add_assign(fees_usd);
    token.tx_count += 1;
}

/// Signed change of the locked amount of one token. Protocol fees leave the
/// pool in both directions.
fn liquidity_delta(kind: LiquidityKind, amount: &BigDecimal, protocol_fee: &BigDecimal) -> BigDecimal {
    match kind {
        LiquidityKind::Join => amount.clone().sub(protocol_fee),
        LiquidityKind::Exit => amount.clone().neg().sub(protocol_fee),
    }
}

/// Recomputes the pool TVL from the refreshed prices and adds it back to the
/// protocol total it was subtracted from.
fn refresh_total_value_locked(
    bundle: &Bundle,
    factory: &mut Factory,
    pool: &mut Pool,
    token0: &mut Token,
    token1: &mut Token,
) {
    pool.total_value_locked_eth = pool
        .total_value_locked_token0
        .clone()
        .mul(&token0.derived_eth)
        .add(pool.total_value_locked_token1.clone().mul(&token1.derived_eth));
    pool.total_value_locked_usd = pool.total_value_locked_eth.clone().mul(&bundle.eth_price_usd);

    // untouched pools keep the usd value of their last event
    factory.total_value_locked_eth.add_assign(&pool.total_value_locked_eth);
    factory.total_value_locked_usd.add_assign(&pool.total_value_locked_usd);

    token0.total_value_locked_usd = token0
        .total_value_locked
        .clone()
        .mul(&token0.derived_eth)
        .mul(&bundle.eth_price_usd);
    token1.total_value_locked_usd = token1
        .total_value_locked
        .clone()
        .mul(&token1.derived_eth)
        .mul(&bundle.eth_price_usd);
}

/// Puts the event's amounts and protocol fees in the pool's token order.
fn align_to_pool(change: &LiquidityChange, pool: &Pool) -> Result<([BigInt; 2], [BigInt; 2]), Error> {
    let amounts = change.amounts.clone();
    let fees = change.protocol_fees.clone();

    return match &change.pool {
        PoolRef::Address(_) => Ok((amounts, fees)),
        PoolRef::Tokens(token0, token1) => {
            if *token0 == pool.token0 && *token1 == pool.token1 {
                return Ok((amounts, fees));
            }
            if *token0 == pool.token1 && *token1 == pool.token0 {
                let [amount0, amount1] = amounts;
                let [fee0, fee1] = fees;
                return Ok(([amount1, amount0], [fee1, fee0]));
            }
            let stray = match pool.other_token(token0) {
                Some(_) => token1.clone(),
                None => token0.clone(),
            };
            Err(Error::TokenNotInPool {
                pool: pool.id.clone(),
                token: stray,
            })
        }
    };
}

fn stage(tables: &mut Tables, bundle: Bundle, factory: Factory, pool: Pool, token0: Token, token1: Token) {
    tables.update_row(Entity::Bundle(bundle));
    tables.update_row(Entity::Factory(factory));
    tables.update_row(Entity::Pool(pool));
    tables.update_row(Entity::Token(token0));
    tables.update_row(Entity::Token(token1));
}
