//! Analytics engine for Gamut weighted pools.
//!
//! Each swap, join or exit is applied to a small entity graph (protocol,
//! pools, tokens, ledger records and hour/day rollups) through the
//! [`ledger::Engine`]. Storage and chain access are provided by the host
//! through [`store::EntityStore`] and [`rpc::ChainReader`].

pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod helper;
pub mod keyer;
pub mod ledger;
pub mod math;
pub mod price;
pub mod rpc;
pub mod store;
pub mod tables;
pub mod utils;
pub mod windows;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use entity::{Entity, EntityKind};
pub use error::Error;
pub use event::Event;
pub use ledger::{Engine, Outcome};
pub use rpc::ChainReader;
pub use store::{EntityStore, MemoryStore};
