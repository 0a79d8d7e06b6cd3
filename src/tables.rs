use crate::entity::{Entity, EntityKind};
use crate::store::EntityStore;
use std::collections::HashMap;

/// Entities touched while handling one event. Nothing reaches the store
/// until `flush` is called, so an aborted event leaves the store untouched.
pub struct Tables {
    // Map from table name to the primary keys within that table
    pub tables: HashMap<EntityKind, Rows>,
}

impl Tables {
    pub fn new() -> Self {
        Tables {
            tables: HashMap::new(),
        }
    }

    pub fn update_row(&mut self, entity: Entity) {
        let rows = self.tables.entry(entity.kind()).or_insert(Rows::new());
        rows.pks.insert(entity.id().to_string(), entity);
    }

    pub fn get_row(&self, kind: EntityKind, key: &str) -> Option<&Entity> {
        self.tables.get(&kind).and_then(|rows| rows.pks.get(key))
    }

    /// Looks the entity up in the staged rows first, then in the store.
    pub fn load<S: EntityStore>(&self, store: &S, kind: EntityKind, key: &str) -> Option<Entity> {
        match self.get_row(kind, key) {
            Some(entity) => Some(entity.clone()),
            None => store.load(kind, key),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(|rows| rows.pks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Writes every staged row to the store, returns how many were written
    pub fn flush<S: EntityStore>(self, store: &mut S) -> usize {
        let mut written = 0;
        for (_, rows) in self.tables {
            for (_, entity) in rows.pks {
                store.save(entity);
                written += 1;
            }
        }
        written
    }
}

pub struct Rows {
    // Map of primary keys within this table, to the latest entity state
    pub pks: HashMap<String, Entity>,
}

impl Rows {
    pub fn new() -> Self {
        Rows { pks: HashMap::new() }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::Bundle;
    use crate::store::MemoryStore;
    use bigdecimal::BigDecimal;

    #[test]
    fn test_staged_rows_shadow_the_store() {
        let mut store = MemoryStore::new();
        store.save(Entity::Bundle(Bundle::new("1".to_string())));

        let mut tables = Tables::new();
        let mut bundle = Bundle::new("1".to_string());
        bundle.eth_price_usd = BigDecimal::from(2000 as i32);
        tables.update_row(Entity::Bundle(bundle.clone()));

        assert_eq!(
            Some(Entity::Bundle(bundle.clone())),
            tables.load(&store, EntityKind::Bundle, "1")
        );
        // the store is only written on flush
        assert_eq!(
            Some(Entity::Bundle(Bundle::new("1".to_string()))),
            store.load(EntityKind::Bundle, "1")
        );

        assert_eq!(1, tables.flush(&mut store));
        assert_eq!(Some(Entity::Bundle(bundle)), store.load(EntityKind::Bundle, "1"));
    }
}
