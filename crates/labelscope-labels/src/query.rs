//! Cross-store label queries
//!
//! A [`LabelQuery`] asks one store (or all five) for the labels matching some
//! criteria and flattens the answer into single-key rows:
//! - stores are queried one at a time, in [`EntityKind::ALL`] order
//! - the page size/number is handed to every store unchanged; there is no
//!   cursor spanning several stores
//! - the first store error aborts the query and nothing is returned

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, warn};

use labelscope_core::{EntityKind, Error, LabelMap, ListInput, Pagination, Result, StoreHub};

use crate::criteria::LabelCriteria;
use crate::matcher::{entity_extract_matches, entity_matches};

/// Which stores a label query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelTarget {
    Kind(EntityKind),
    All,
}

impl LabelTarget {
    pub fn kinds(&self) -> Vec<EntityKind> {
        match self {
            LabelTarget::Kind(kind) => vec![*kind],
            LabelTarget::All => EntityKind::ALL.to_vec(),
        }
    }
}

impl fmt::Display for LabelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelTarget::Kind(kind) => write!(f, "{}", kind),
            LabelTarget::All => f.write_str("all"),
        }
    }
}

impl FromStr for LabelTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "all" {
            return Ok(LabelTarget::All);
        }
        s.parse().map(LabelTarget::Kind)
    }
}

impl From<EntityKind> for LabelTarget {
    fn from(kind: EntityKind) -> Self {
        LabelTarget::Kind(kind)
    }
}

/// Flattened query result: one single-key mapping per matched label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRows {
    pub rows: Vec<LabelMap>,
    pub total: usize,
}

impl LabelRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split one store row into single-key rows.
    ///
    /// Rows are label mappings encoded as JSON objects. Anything else, and any
    /// non-string value, does not come from the label formatter and is skipped.
    pub fn absorb(&mut self, row: Value) {
        let map = match row {
            Value::Object(map) => map,
            other => {
                warn!("Skipping label row that is not an object: {}", other);
                return;
            }
        };

        for (key, value) in map {
            match value {
                Value::String(value) => self.push(key, value),
                other => warn!("Skipping non-string label {}={}", key, other),
            }
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.rows.push(LabelMap::from([(key.into(), value.into())]));
        self.total += 1;
    }
}

/// Store-backed label query service
#[derive(Debug, Clone)]
pub struct LabelQuery {
    hub: StoreHub,
}

impl LabelQuery {
    pub fn new(hub: StoreHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &StoreHub {
        &self.hub
    }

    /// Collect the labels matching `criteria` from every store `target` covers.
    ///
    /// # Errors
    /// - `Error::Store` if a covered kind has no registered store
    /// - any error returned by a store's `list`, unchanged
    pub async fn list(
        &self,
        target: LabelTarget,
        criteria: &LabelCriteria,
        pagination: Pagination,
    ) -> Result<LabelRows> {
        let input = label_list_input(Arc::new(criteria.clone()), pagination);
        let mut result = LabelRows::new();

        for kind in target.kinds() {
            let store = self.hub.store(kind)?;
            let output = store
                .list(input.clone())
                .await
                .inspect_err(|e| error!("Label query against {} store failed: {}", kind, e))?;

            debug!(
                "Label query against {} store: {} rows on page, {} matching entities",
                kind,
                output.rows.len(),
                output.total_size
            );

            for row in output.rows {
                result.absorb(row);
            }
        }

        debug!(
            "Label query for {} ({} criteria) produced {} rows",
            target,
            criteria.len(),
            result.total
        );

        Ok(result)
    }
}

/// List request that keeps matching entities and formats each one as the
/// object of its matching labels.
fn label_list_input(criteria: Arc<LabelCriteria>, pagination: Pagination) -> ListInput {
    let predicate_criteria = criteria.clone();

    ListInput::new(pagination)
        .with_predicate(move |entity| entity_matches(&predicate_criteria, entity))
        .with_format(move |entity| {
            entity_extract_matches(&criteria, entity).map(|labels| {
                Value::Object(
                    labels
                        .into_iter()
                        .map(|(k, v)| (k, Value::String(v)))
                        .collect(),
                )
            })
        })
}
