use crate::entity::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} entity {id} not found")]
    EntityNotFound { kind: EntityKind, id: String },

    #[error("no pool registered for tokens {token0} and {token1}")]
    PoolNotFoundForTokens { token0: String, token1: String },

    #[error("chain call {call} failed on pool {pool}")]
    ChainCall { pool: String, call: &'static str },

    #[error("token {token} is not part of pool {pool}")]
    TokenNotInPool { pool: String, token: String },

    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found<T: Into<String>>(kind: EntityKind, id: T) -> Self {
        Error::EntityNotFound { kind, id: id.into() }
    }

    pub fn chain_call<T: Into<String>>(pool: T, call: &'static str) -> Self {
        Error::ChainCall {
            pool: pool.into(),
            call,
        }
    }
}
