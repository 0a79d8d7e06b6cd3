use crate::windows::Interval;

// ------------------------------------------------
//      addresses
// ------------------------------------------------
pub const ADDRESS_ZERO: &str = "0x0000000000000000000000000000000000000000";

pub fn address(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn normalize_address(address: &str) -> String {
    let lower = address.trim().to_lowercase();
    if lower.starts_with("0x") {
        return lower;
    }
    format!("0x{}", lower)
}

// ------------------------------------------------
//      singletons
// ------------------------------------------------
pub fn bundle_id() -> String {
    "1".to_string()
}

// ------------------------------------------------
//      ledger records
// ------------------------------------------------
pub fn transaction_id(transaction_hash: &[u8]) -> String {
    address(transaction_hash)
}

pub fn ledger_record_id(transaction_id: &String, pool_tx_count: u64) -> String {
    format!("{}#{}", transaction_id, pool_tx_count)
}

pub fn ledger_record_id_with_log_index(transaction_id: &String, pool_tx_count: u64, log_index: u64) -> String {
    format!("{}#{}-{}", transaction_id, pool_tx_count, log_index)
}

pub fn event_data_id(transaction_id: &String, log_index: u64) -> String {
    format!("{}-{}", transaction_id, log_index)
}

// ------------------------------------------------
//      time windows
// ------------------------------------------------
pub fn time_id(timestamp: u64, interval: Interval) -> u64 {
    timestamp / interval.seconds()
}

pub fn period_start(time_id: u64, interval: Interval) -> u64 {
    time_id * interval.seconds()
}

pub fn pool_time_data_id(pool_address: &str, time_id: u64) -> String {
    format!("{}-{}", pool_address, time_id)
}

pub fn token_time_data_id(token_address: &str, time_id: u64) -> String {
    format!("{}-{}", token_address, time_id)
}

pub fn protocol_time_data_id(time_id: u64) -> String {
    time_id.to_string()
}
