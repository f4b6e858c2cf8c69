//! Seeding stores from a file
//!
//! A seed file lists entities per kind. YAML is the default format; files
//! ending in `.toml` or `.json` are read as TOML or JSON.
//!
//! ```yaml
//! routes:
//!   - id: r1
//!     uri: /hello
//!     labels:
//!       env: production
//! consumers:
//!   - username: jack
//!     labels:
//!       build: "16"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use labelscope_core::entity::{Consumer, Route, Service, Ssl, Upstream};
use labelscope_core::{Entity, EntityKind, Error, Result, StoreHub};

use crate::MemoryStore;

/// Entities to load at startup, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(default)]
    pub services: Vec<Service>,

    #[serde(default)]
    pub upstreams: Vec<Upstream>,

    #[serde(default)]
    pub ssls: Vec<Ssl>,

    #[serde(default)]
    pub consumers: Vec<Consumer>,
}

/// Serialization format of a seed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Yaml,
    Toml,
    Json,
}

impl SeedFormat {
    /// Pick the format from the file extension (YAML unless `.toml`/`.json`)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => SeedFormat::Toml,
            Some("json") => SeedFormat::Json,
            _ => SeedFormat::Yaml,
        }
    }
}

impl SeedFile {
    /// Load a seed file from disk
    ///
    /// A leading `~` is expanded to the home directory.
    ///
    /// # Errors
    /// - `Error::Io` if the file can't be read
    /// - `Error::Config` if the contents don't parse
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_home(path.as_ref())?;

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read seed file {:?}: {}", path, e);
            Error::Io(e)
        })?;

        let seed = Self::parse(&contents, SeedFormat::from_path(&path))?;
        info!("Loaded seed file {:?} ({} entities)", path, seed.len());
        Ok(seed)
    }

    /// Parse seed file contents
    ///
    /// # Errors
    /// - `Error::Config` if the contents don't parse
    pub fn parse(contents: &str, format: SeedFormat) -> Result<Self> {
        match format {
            SeedFormat::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| Error::Config(format!("Invalid YAML seed file: {}", e))),
            SeedFormat::Toml => toml::from_str(contents)
                .map_err(|e| Error::Config(format!("Invalid TOML seed file: {}", e))),
            SeedFormat::Json => serde_json::from_str(contents)
                .map_err(|e| Error::Config(format!("Invalid JSON seed file: {}", e))),
        }
    }

    /// Number of entities of each kind, in query order
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        vec![
            (EntityKind::Route, self.routes.len()),
            (EntityKind::Service, self.services.len()),
            (EntityKind::Upstream, self.upstreams.len()),
            (EntityKind::Ssl, self.ssls.len()),
            (EntityKind::Consumer, self.consumers.len()),
        ]
    }

    pub fn len(&self) -> usize {
        self.counts().iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a hub of five memory stores holding the seeded entities
    ///
    /// # Errors
    /// - `Error::InvalidRequest` if an entity is rejected by its store
    pub fn into_hub(self) -> Result<StoreHub> {
        let groups: [(EntityKind, Vec<Entity>); 5] = [
            (EntityKind::Route, into_entities(self.routes)),
            (EntityKind::Service, into_entities(self.services)),
            (EntityKind::Upstream, into_entities(self.upstreams)),
            (EntityKind::Ssl, into_entities(self.ssls)),
            (EntityKind::Consumer, into_entities(self.consumers)),
        ];

        let mut hub = StoreHub::new();
        for (kind, entities) in groups {
            let store = MemoryStore::new(kind);
            for entity in entities {
                store.insert(entity)?;
            }
            hub.register(kind, Arc::new(store));
        }
        Ok(hub)
    }
}

/// A hub of five empty memory stores
pub fn empty_hub() -> StoreHub {
    let mut hub = StoreHub::new();
    for kind in EntityKind::ALL {
        hub.register(kind, Arc::new(MemoryStore::new(kind)));
    }
    hub
}

fn into_entities<T: Into<Entity>>(items: Vec<T>) -> Vec<Entity> {
    items.into_iter().map(Into::into).collect()
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string())),
        Err(_) => Ok(path.to_path_buf()),
    }
}
