//! Entity store trait
//!
//! The `EntityStore` trait is the paginated-list service every entity kind is
//! kept behind. Callers hand the store a predicate and a formatter; the store
//! filters, transforms, orders and pages its items and reports how many items
//! matched before paging.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::entity::{Entity, EntityKind};
use crate::{Error, Result};

/// Decides whether an entity takes part in a listing.
pub type Predicate = Arc<dyn Fn(&Entity) -> bool + Send + Sync>;

/// Turns a matching entity into an output row; `None` drops the entity.
pub type Formatter = Arc<dyn Fn(&Entity) -> Option<serde_json::Value> + Send + Sync>;

/// Page selection for list requests.
///
/// Paging only applies when both fields are positive. Page numbers start at 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page_size: usize,

    #[serde(default, rename = "page")]
    pub page_number: usize,
}

impl Pagination {
    pub fn new(page_size: usize, page_number: usize) -> Self {
        Self {
            page_size,
            page_number,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.page_size > 0 && self.page_number > 0
    }

    /// Cut the requested page out of an already ordered sequence.
    ///
    /// A page past the end yields an empty sequence.
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        if !self.is_enabled() {
            return rows;
        }

        let skip = (self.page_number - 1).saturating_mul(self.page_size);
        rows.into_iter().skip(skip).take(self.page_size).collect()
    }
}

/// A list request
#[derive(Clone, Default)]
pub struct ListInput {
    /// Filter; `None` keeps every entity
    pub predicate: Option<Predicate>,

    /// Row transform; `None` serializes the entity as-is
    pub format: Option<Formatter>,

    pub pagination: Pagination,
}

impl ListInput {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Default::default()
        }
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Entity) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&Entity) -> Option<serde_json::Value> + Send + Sync + 'static,
    {
        self.format = Some(Arc::new(format));
        self
    }

    /// Run the predicate and formatter over one entity.
    ///
    /// Returns the row the entity contributes, if any.
    pub fn select(&self, entity: &Entity) -> Result<Option<serde_json::Value>> {
        if let Some(predicate) = &self.predicate
            && !predicate(entity)
        {
            return Ok(None);
        }

        match &self.format {
            Some(format) => Ok(format(entity)),
            None => Ok(Some(serde_json::to_value(entity)?)),
        }
    }
}

impl fmt::Debug for ListInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListInput")
            .field("predicate", &self.predicate.is_some())
            .field("format", &self.format.is_some())
            .field("pagination", &self.pagination)
            .finish()
    }
}

/// A list response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOutput {
    /// The requested page of rows
    pub rows: Vec<serde_json::Value>,

    /// Number of rows that matched, before paging
    pub total_size: usize,
}

/// Entity store trait
///
/// Implementations:
/// - `MemoryStore`: concurrent in-memory store (`labelscope-store-memory`)
///
/// # Example
/// ```no_run
/// # use labelscope_core::store::{EntityStore, ListInput, Pagination};
/// # async fn example(store: &dyn EntityStore) -> labelscope_core::Result<()> {
/// let input = ListInput::new(Pagination::new(10, 1))
///     .with_predicate(|entity| !entity.id().is_empty());
/// let page = store.list(input).await?;
/// println!("{} of {}", page.rows.len(), page.total_size);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Get a single entity by ID
    ///
    /// # Errors
    /// - `Error::NotFound` if no entity has this ID
    async fn get(&self, id: &str) -> Result<Entity>;

    /// List entities
    ///
    /// Filters with `input.predicate`, transforms with `input.format`
    /// (dropping entities it maps to `None`), orders by creation time then
    /// ID, and finally applies `input.pagination`.
    ///
    /// # Errors
    /// - `Error::Store` if the backing storage cannot be read
    async fn list(&self, input: ListInput) -> Result<ListOutput>;
}

/// One store per entity kind
#[derive(Clone, Default)]
pub struct StoreHub {
    stores: HashMap<EntityKind, Arc<dyn EntityStore>>,
}

impl StoreHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the store for `kind`, returning the store it replaces.
    pub fn register(
        &mut self,
        kind: EntityKind,
        store: Arc<dyn EntityStore>,
    ) -> Option<Arc<dyn EntityStore>> {
        self.stores.insert(kind, store)
    }

    pub fn with_store(mut self, kind: EntityKind, store: Arc<dyn EntityStore>) -> Self {
        self.register(kind, store);
        self
    }

    /// Get the store for `kind`
    ///
    /// # Errors
    /// - `Error::Store` if no store was registered for the kind
    pub fn store(&self, kind: EntityKind) -> Result<&Arc<dyn EntityStore>> {
        self.stores
            .get(&kind)
            .ok_or_else(|| Error::Store(format!("no store registered for {}", kind)))
    }

    /// Registered kinds, in query order
    pub fn kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| self.stores.contains_key(kind))
            .collect()
    }
}

impl fmt::Debug for StoreHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHub")
            .field("kinds", &self.kinds())
            .finish()
    }
}
