//! Label queries across entity stores
//!
//! This crate answers "which labels match these criteria" over one or all
//! entity stores:
//! - `criteria`: parsing of `key:value,key` criteria strings
//! - `matcher`: deciding whether labels match and extracting the matching ones
//! - `query`: running the matcher inside each store and flattening the rows

pub mod criteria;
pub mod matcher;
pub mod query;

pub use criteria::LabelCriteria;
pub use matcher::{entity_extract_matches, entity_matches, extract_matches, matches};
pub use query::{LabelQuery, LabelRows, LabelTarget};
