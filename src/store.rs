use crate::entity::{Entity, EntityKind};
use std::collections::HashMap;

/// Point lookups and writes against the host's entity storage.
pub trait EntityStore {
    fn load(&self, kind: EntityKind, id: &str) -> Option<Entity>;
    fn save(&mut self, entity: Entity);
}

/// Entity storage kept in process memory, keyed by table then id.
#[derive(Default, Debug)]
pub struct MemoryStore {
    tables: HashMap<EntityKind, HashMap<String, Entity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tables: HashMap::new(),
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match self.tables.get(&kind) {
            None => 0,
            Some(rows) => rows.len(),
        }
    }

    #[cfg(test)]
    pub fn entities(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.tables.get(&kind).into_iter().flat_map(|rows| rows.values())
    }
}

impl EntityStore for MemoryStore {
    fn load(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        self.tables.get(&kind).and_then(|rows| rows.get(id)).cloned()
    }

    fn save(&mut self, entity: Entity) {
        let rows = self.tables.entry(entity.kind()).or_insert(HashMap::new());
        rows.insert(entity.id().to_string(), entity);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::Bundle;

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        assert_eq!(None, store.load(EntityKind::Bundle, "1"));

        store.save(Entity::Bundle(Bundle::new("1".to_string())));

        assert_eq!(
            Some(Entity::Bundle(Bundle::new("1".to_string()))),
            store.load(EntityKind::Bundle, "1")
        );
        assert_eq!(None, store.load(EntityKind::Factory, "1"));
        assert_eq!(1, store.count(EntityKind::Bundle));
    }

    #[test]
    fn test_entities_of_one_kind() {
        let mut store = MemoryStore::new();
        assert_eq!(0, store.entities(EntityKind::Bundle).count());

        store.save(Entity::Bundle(Bundle::new("1".to_string())));
        store.save(Entity::Bundle(Bundle::new("2".to_string())));
        store.save(Entity::Bundle(Bundle::new("2".to_string())));

        assert_eq!(2, store.entities(EntityKind::Bundle).count());
        assert_eq!(0, store.entities(EntityKind::Pool).count());
    }
}
