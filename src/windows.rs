use crate::entity::{
    Bundle, Entity, EntityKind, Factory, Pool, PoolWindowData, ProtocolWindowData, Token, TokenWindowData,
};
use crate::keyer;
use crate::math;
use crate::store::EntityStore;
use crate::tables::Tables;
use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Mul};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Day,
    Hour,
}

impl Interval {
    pub const ALL: [Interval; 2] = [Interval::Day, Interval::Hour];

    pub fn seconds(&self) -> u64 {
        match self {
            Interval::Day => 86400,
            Interval::Hour => 3600,
        }
    }

    pub fn pool_kind(&self) -> EntityKind {
        match self {
            Interval::Day => EntityKind::PoolDayData,
            Interval::Hour => EntityKind::PoolHourData,
        }
    }

    pub fn token_kind(&self) -> EntityKind {
        match self {
            Interval::Day => EntityKind::TokenDayData,
            Interval::Hour => EntityKind::TokenHourData,
        }
    }

    pub fn protocol_kind(&self) -> EntityKind {
        match self {
            Interval::Day => EntityKind::GamutDayData,
            Interval::Hour => EntityKind::GamutHourData,
        }
    }
}

/// Trade volume one swap adds to every bucket it touches. Joins and exits
/// update buckets without one.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeDelta {
    pub amount0_abs: BigDecimal,
    pub amount1_abs: BigDecimal,
    pub tracked_eth: BigDecimal,
    pub tracked_usd: BigDecimal,
    pub untracked_usd: BigDecimal,
    pub fees_usd: BigDecimal,
}

fn create_pool_window(pool: &Pool, interval: Interval, time_id: u64) -> PoolWindowData {
    let bigdecimal0 = BigDecimal::zero();
    PoolWindowData {
        id: keyer::pool_time_data_id(&pool.id, time_id),
        interval,
        period_start_unix: keyer::period_start(time_id, interval),
        pool: pool.id.clone(),
        liquidity: BigInt::zero(),
        token0_price: bigdecimal0.clone(),
        token1_price: bigdecimal0.clone(),
        volume_token0: bigdecimal0.clone(),
        volume_token1: bigdecimal0.clone(),
        volume_usd: bigdecimal0.clone(),
        fees_usd: bigdecimal0.clone(),
        tvl_usd: bigdecimal0,
        tx_count: 0,
        open: pool.token0_price.clone(),
        high: pool.token0_price.clone(),
        low: pool.token0_price.clone(),
        close: pool.token0_price.clone(),
    }
}

fn create_token_window(token: &Token, interval: Interval, time_id: u64, price_usd: &BigDecimal) -> TokenWindowData {
    let bigdecimal0 = BigDecimal::zero();
    TokenWindowData {
        id: keyer::token_time_data_id(&token.id, time_id),
        interval,
        period_start_unix: keyer::period_start(time_id, interval),
        token: token.id.clone(),
        volume: bigdecimal0.clone(),
        volume_usd: bigdecimal0.clone(),
        untracked_volume_usd: bigdecimal0.clone(),
        fees_usd: bigdecimal0.clone(),
        total_value_locked: bigdecimal0.clone(),
        total_value_locked_usd: bigdecimal0.clone(),
        price_usd: bigdecimal0,
        tx_count: 0,
        open: price_usd.clone(),
        high: price_usd.clone(),
        low: price_usd.clone(),
        close: price_usd.clone(),
    }
}

fn create_protocol_window(interval: Interval, time_id: u64) -> ProtocolWindowData {
    let bigdecimal0 = BigDecimal::zero();
    ProtocolWindowData {
        id: keyer::protocol_time_data_id(time_id),
        interval,
        period_start_unix: keyer::period_start(time_id, interval),
        volume_eth: bigdecimal0.clone(),
        volume_usd: bigdecimal0.clone(),
        volume_usd_untracked: bigdecimal0.clone(),
        fees_usd: bigdecimal0.clone(),
        tvl_usd: bigdecimal0,
        tx_count: 0,
    }
}

pub fn update_pool_window<S: EntityStore>(
    store: &S,
    tables: &mut Tables,
    pool: &Pool,
    interval: Interval,
    timestamp: u64,
    volume: Option<&VolumeDelta>,
) -> PoolWindowData {
    let time_id = keyer::time_id(timestamp, interval);
    let window_id = keyer::pool_time_data_id(&pool.id, time_id);

    let mut window = match tables.load(store, interval.pool_kind(), &window_id) {
        Some(Entity::PoolWindow(window)) => window,
        _ => {
            log::debug!("creating {} {}", interval.pool_kind(), window_id);
            create_pool_window(pool, interval, time_id)
        }
    };

    let price = &pool.token0_price;
    window.high = math::max_big_decimal(&window.high, price);
    window.low = math::min_big_decimal(&window.low, price);
    window.close = price.clone();
    window.token0_price = pool.token0_price.clone();
    window.token1_price = pool.token1_price.clone();
    window.liquidity = pool.liquidity.clone();
    window.tvl_usd = pool.total_value_locked_usd.clone();
    window.tx_count += 1;

    if let Some(volume) = volume {
        window.volume_token0.add_assign(&volume.amount0_abs);
        window.volume_token1.add_assign(&volume.amount1_abs);
        window.volume_usd.add_assign(&volume.tracked_usd);
        window.fees_usd.add_assign(&volume.fees_usd);
    }

    tables.update_row(Entity::PoolWindow(window.clone()));
    window
}

/// Rolls `token` into its bucket. `amount_abs` is the token's own traded
/// amount when the event is a swap.
pub fn update_token_window<S: EntityStore>(
    store: &S,
    tables: &mut Tables,
    token: &Token,
    bundle: &Bundle,
    interval: Interval,
    timestamp: u64,
    volume: Option<(&BigDecimal, &VolumeDelta)>,
) -> TokenWindowData {
    let time_id = keyer::time_id(timestamp, interval);
    let window_id = keyer::token_time_data_id(&token.id, time_id);
    let price_usd = token.derived_eth.clone().mul(&bundle.eth_price_usd);

    let mut window = match tables.load(store, interval.token_kind(), &window_id) {
        Some(Entity::TokenWindow(window)) => window,
        _ => {
            log::debug!("creating {} {}", interval.token_kind(), window_id);
            create_token_window(token, interval, time_id, &price_usd)
        }
    };

    window.high = math::max_big_decimal(&window.high, &price_usd);
    window.low = math::min_big_decimal(&window.low, &price_usd);
    window.close = price_usd.clone();
    window.price_usd = price_usd;
    window.total_value_locked = token.total_value_locked.clone();
    window.total_value_locked_usd = token.total_value_locked_usd.clone();
    window.tx_count += 1;

    if let Some((amount_abs, volume)) = volume {
        window.volume.add_assign(amount_abs);
        window.volume_usd.add_assign(&volume.tracked_usd);
        window.untracked_volume_usd.add_assign(&volume.untracked_usd);
        window.fees_usd.add_assign(&volume.fees_usd);
    }

    tables.update_row(Entity::TokenWindow(window.clone()));
    window
}

pub fn update_protocol_window<S: EntityStore>(
    store: &S,
    tables: &mut Tables,
    factory: &Factory,
    interval: Interval,
    timestamp: u64,
    volume: Option<&VolumeDelta>,
) -> ProtocolWindowData {
    let time_id = keyer::time_id(timestamp, interval);
    let window_id = keyer::protocol_time_data_id(time_id);

    let mut window = match tables.load(store, interval.protocol_kind(), &window_id) {
        Some(Entity::ProtocolWindow(window)) => window,
        _ => create_protocol_window(interval, time_id),
    };

    window.tvl_usd = factory.total_value_locked_usd.clone();
    window.tx_count = factory.tx_count;

    if let Some(volume) = volume {
        window.volume_eth.add_assign(&volume.tracked_eth);
        window.volume_usd.add_assign(&volume.tracked_usd);
        window.volume_usd_untracked.add_assign(&volume.untracked_usd);
        window.fees_usd.add_assign(&volume.fees_usd);
    }

    tables.update_row(Entity::ProtocolWindow(window.clone()));
    window
}

/// Rolls the post-event state of the protocol, the pool and both of its
/// tokens into their hour and day buckets.
pub fn update_windows<S: EntityStore>(
    store: &S,
    tables: &mut Tables,
    bundle: &Bundle,
    factory: &Factory,
    pool: &Pool,
    token0: &Token,
    token1: &Token,
    timestamp: u64,
    volume: Option<&VolumeDelta>,
) {
    for interval in Interval::ALL {
        update_protocol_window(store, tables, factory, interval, timestamp, volume);
        update_pool_window(store, tables, pool, interval, timestamp, volume);
        update_token_window(
            store,
            tables,
            token0,
            bundle,
            interval,
            timestamp,
            volume.map(|volume| (&volume.amount0_abs, volume)),
        );
        update_token_window(
            store,
            tables,
            token1,
            bundle,
            interval,
            timestamp,
            volume.map(|volume| (&volume.amount1_abs, volume)),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    // 2022-03-01T12:30:00Z
    const TIMESTAMP: u64 = 1646137800;

    fn volume() -> VolumeDelta {
        VolumeDelta {
            amount0_abs: dec("100"),
            amount1_abs: dec("90.9"),
            tracked_eth: dec("0.1"),
            tracked_usd: dec("200"),
            untracked_usd: dec("190.9"),
            fees_usd: dec("0.6"),
        }
    }

    #[test]
    fn test_interval_seconds() {
        assert_eq!(86400, Interval::Day.seconds());
        assert_eq!(3600, Interval::Hour.seconds());
    }

    #[test]
    fn test_second_event_in_same_hour_keeps_open() {
        let store = MemoryStore::new();
        let mut tables = Tables::new();

        let mut pool = testing::pool(testing::POOL_A, testing::TOKEN_X, testing::TOKEN_Y);
        pool.token0_price = dec("1.5");
        let first = update_pool_window(&store, &mut tables, &pool, Interval::Hour, TIMESTAMP, Some(&volume()));
        assert_eq!("0x00000000000000000000000000000000000000a1-457260", first.id);
        assert_eq!(1646136000, first.period_start_unix);
        assert_eq!(dec("1.5"), first.open);
        assert_eq!(1, first.tx_count);

        pool.token0_price = dec("2");
        let second = update_pool_window(&store, &mut tables, &pool, Interval::Hour, TIMESTAMP + 60, Some(&volume()));
        assert_eq!(dec("1.5"), second.open);
        assert_eq!(dec("2"), second.high);
        assert_eq!(dec("1.5"), second.low);
        assert_eq!(dec("2"), second.close);
        assert_eq!(2, second.tx_count);
        assert_eq!(dec("200"), second.volume_token0);
        assert_eq!(dec("400"), second.volume_usd);

        pool.token0_price = dec("1.2");
        let third = update_pool_window(&store, &mut tables, &pool, Interval::Hour, TIMESTAMP + 120, None);
        assert_eq!(dec("1.5"), third.open);
        assert_eq!(dec("1.2"), third.low);
        assert_eq!(dec("1.2"), third.close);
        assert_eq!(3, third.tx_count);
        assert_eq!(dec("400"), third.volume_usd);
    }

    #[test]
    fn test_next_hour_opens_a_new_bucket() {
        let store = MemoryStore::new();
        let mut tables = Tables::new();

        let mut pool = testing::pool(testing::POOL_A, testing::TOKEN_X, testing::TOKEN_Y);
        pool.token0_price = dec("1.5");
        update_pool_window(&store, &mut tables, &pool, Interval::Hour, TIMESTAMP, None);

        pool.token0_price = dec("3");
        let next = update_pool_window(&store, &mut tables, &pool, Interval::Hour, TIMESTAMP + 3600, None);
        assert_eq!(dec("3"), next.open);
        assert_eq!(1, next.tx_count);
        assert_eq!(2, tables.len());
    }

    #[test]
    fn test_token_window_prices_in_usd() {
        let store = MemoryStore::new();
        let mut tables = Tables::new();
        let mut bundle = Bundle::new(keyer::bundle_id());
        bundle.eth_price_usd = dec("2000");

        let mut token = testing::token(testing::TOKEN_X, 18);
        token.derived_eth = dec("0.001");
        token.total_value_locked = dec("1100");
        token.total_value_locked_usd = dec("2200");

        let window = update_token_window(
            &store,
            &mut tables,
            &token,
            &bundle,
            Interval::Day,
            TIMESTAMP,
            Some((&dec("100"), &volume())),
        );
        assert_eq!(1646092800, window.period_start_unix);
        assert_eq!(dec("2"), window.open);
        assert_eq!(dec("2"), window.price_usd);
        assert_eq!(dec("100"), window.volume);
        assert_eq!(dec("200"), window.volume_usd);
        assert_eq!(dec("190.9"), window.untracked_volume_usd);
        assert_eq!(dec("2200"), window.total_value_locked_usd);
    }

    #[test]
    fn test_protocol_window_snapshots_factory() {
        let store = MemoryStore::new();
        let mut tables = Tables::new();
        let mut factory = Factory::new(testing::FACTORY.to_string());
        factory.tx_count = 7;
        factory.total_value_locked_usd = dec("5000");

        update_protocol_window(&store, &mut tables, &factory, Interval::Day, TIMESTAMP, Some(&volume()));
        factory.tx_count = 8;
        let window = update_protocol_window(&store, &mut tables, &factory, Interval::Day, TIMESTAMP, Some(&volume()));

        assert_eq!("19052", window.id);
        assert_eq!(8, window.tx_count);
        assert_eq!(dec("5000"), window.tvl_usd);
        assert_eq!(dec("0.2"), window.volume_eth);
        assert_eq!(dec("381.8"), window.volume_usd_untracked);
    }

    #[test]
    fn test_update_windows_touches_every_bucket() {
        let store = MemoryStore::new();
        let mut tables = Tables::new();
        let bundle = Bundle::new(keyer::bundle_id());
        let factory = Factory::new(testing::FACTORY.to_string());
        let pool = testing::pool(testing::POOL_A, testing::TOKEN_X, testing::TOKEN_Y);
        let token0 = testing::token(testing::TOKEN_X, 18);
        let token1 = testing::token(testing::TOKEN_Y, 18);

        update_windows(&store, &mut tables, &bundle, &factory, &pool, &token0, &token1, TIMESTAMP, None);

        // protocol, pool and two tokens, for day and hour
        assert_eq!(8, tables.len());
        assert!(tables.get_row(EntityKind::GamutHourData, "457260").is_some());
        let token_day_id = keyer::token_time_data_id(testing::TOKEN_Y, 19052);
        assert!(tables.get_row(EntityKind::TokenDayData, &token_day_id).is_some());
    }
}
