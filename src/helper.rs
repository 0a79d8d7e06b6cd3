use crate::entity::{Bundle, Entity, EntityKind, Factory, Pool, Token};
use crate::error::Error;
use crate::store::EntityStore;
use crate::tables::Tables;

pub fn get_bundle<S: EntityStore>(store: &S, tables: &Tables, bundle_id: &String) -> Option<Bundle> {
    return match tables.load(store, EntityKind::Bundle, bundle_id) {
        Some(Entity::Bundle(bundle)) => Some(bundle),
        _ => None,
    };
}

pub fn get_factory<S: EntityStore>(store: &S, tables: &Tables, factory_address: &String) -> Result<Factory, Error> {
    return match tables.load(store, EntityKind::Factory, factory_address) {
        Some(Entity::Factory(factory)) => Ok(factory),
        _ => Err(Error::not_found(EntityKind::Factory, factory_address.as_str())),
    };
}

pub fn get_pool<S: EntityStore>(store: &S, tables: &Tables, pool_address: &String) -> Result<Pool, Error> {
    return match tables.load(store, EntityKind::Pool, pool_address) {
        Some(Entity::Pool(pool)) => Ok(pool),
        _ => Err(Error::not_found(EntityKind::Pool, pool_address.as_str())),
    };
}

pub fn get_token<S: EntityStore>(store: &S, tables: &Tables, token_address: &String) -> Result<Token, Error> {
    return match tables.load(store, EntityKind::Token, token_address) {
        Some(Entity::Token(token)) => Ok(token),
        _ => Err(Error::not_found(EntityKind::Token, token_address.as_str())),
    };
}

pub fn has_entity<S: EntityStore>(store: &S, tables: &Tables, kind: EntityKind, id: &String) -> bool {
    tables.load(store, kind, id).is_some()
}
