//! In-memory entity stores for single-node Labelscope deployments
//!
//! This crate implements the `EntityStore` trait over a concurrent map and
//! can populate one store per entity kind from a seed file.
//!
//! # Example
//! ```no_run
//! # use labelscope_store_memory::SeedFile;
//! # fn example() -> labelscope_core::Result<()> {
//! let hub = SeedFile::from_file("~/.labelscope/seed.yaml")?.into_hub()?;
//! # Ok(())
//! # }
//! ```

mod memory_store;
mod seed;

pub use memory_store::MemoryStore;
pub use seed::{SeedFile, SeedFormat, empty_hub};
