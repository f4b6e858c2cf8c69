//! Labelscope Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Labelscope:
//! - Entity model (routes, services, upstreams, SSL certificates, consumers)
//! - The `Labeled` capability shared by every entity kind
//! - The paginated `EntityStore` abstraction and the `StoreHub`
//! - Core error types

pub mod entity;
pub mod error;
pub mod store;

pub use entity::{Entity, EntityKind, LabelMap, Labeled};
pub use error::{Error, Result};
pub use store::{EntityStore, ListInput, ListOutput, Pagination, StoreHub};
