//! In-memory EntityStore implementation

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use labelscope_core::{
    Entity, EntityKind, Error, Result,
    store::{EntityStore, ListInput, ListOutput},
};

/// Concurrent in-memory store holding the entities of one kind
#[derive(Debug)]
pub struct MemoryStore {
    kind: EntityKind,
    items: DashMap<String, Entity>,
}

impl MemoryStore {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            items: DashMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Insert or replace an entity, returning its ID
    ///
    /// Entities without an ID get one (the username for consumers, a UUID
    /// otherwise). Missing timestamps are set to the current time.
    ///
    /// # Errors
    /// - `Error::InvalidRequest` if the entity is not of this store's kind
    pub fn insert(&self, mut entity: Entity) -> Result<String> {
        if entity.kind() != self.kind {
            return Err(Error::InvalidRequest(format!(
                "cannot store a {} in the {} store",
                entity.kind(),
                self.kind
            )));
        }

        if entity.id().is_empty() {
            let id = match &entity {
                Entity::Consumer(consumer) if !consumer.username.is_empty() => {
                    consumer.username.clone()
                }
                _ => uuid::Uuid::new_v4().to_string(),
            };
            entity.base_mut().id = id;
        }

        let now = chrono::Utc::now().timestamp();
        let base = entity.base_mut();
        if base.create_time == 0 {
            base.create_time = now;
        }
        if base.update_time == 0 {
            base.update_time = base.create_time;
        }

        let id = base.id.clone();
        debug!("Stored {} {}", self.kind, id);
        self.items.insert(id.clone(), entity);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entities ordered by creation time, then ID
    fn snapshot(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entities.sort_by(|a, b| {
            (a.base().create_time, a.id()).cmp(&(b.base().create_time, b.id()))
        });
        entities
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Entity> {
        self.items
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.kind, id)))
    }

    async fn list(&self, input: ListInput) -> Result<ListOutput> {
        let mut rows = Vec::new();
        for entity in self.snapshot() {
            if let Some(row) = input.select(&entity)? {
                rows.push(row);
            }
        }

        let total_size = rows.len();
        let rows = input.pagination.apply(rows);

        debug!(
            "Listed {} store: {} of {} rows (page {}, size {})",
            self.kind,
            rows.len(),
            total_size,
            input.pagination.page_number,
            input.pagination.page_size
        );

        Ok(ListOutput { rows, total_size })
    }
}
