//! Administrable entities and their labels
//!
//! Every entity kind carries an optional label mapping. Code that only cares
//! about labels goes through the [`Labeled`] capability, so it never needs to
//! know which concrete kind it is looking at.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Label key/value pairs attached to an entity.
///
/// Ordered so that iteration (and therefore serialization) is deterministic.
pub type LabelMap = BTreeMap<String, String>;

/// The five kinds of administrable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Route,
    Service,
    Upstream,
    Ssl,
    Consumer,
}

impl EntityKind {
    /// All kinds, in the order cross-kind queries visit them.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Route,
        EntityKind::Service,
        EntityKind::Upstream,
        EntityKind::Ssl,
        EntityKind::Consumer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Route => "route",
            EntityKind::Service => "service",
            EntityKind::Upstream => "upstream",
            EntityKind::Ssl => "ssl",
            EntityKind::Consumer => "consumer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "route" => Ok(EntityKind::Route),
            "service" => Ok(EntityKind::Service),
            "upstream" => Ok(EntityKind::Upstream),
            "ssl" => Ok(EntityKind::Ssl),
            "consumer" => Ok(EntityKind::Consumer),
            other => Err(Error::InvalidRequest(format!(
                "unknown entity kind '{}'",
                other
            ))),
        }
    }
}

/// Read access to an entity's labels.
pub trait Labeled {
    /// The entity's label mapping, or `None` if it has never been labelled.
    fn labels(&self) -> Option<&LabelMap>;
}

/// Fields shared by every entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseInfo {
    #[serde(default)]
    pub id: String,

    /// Unix timestamp (seconds)
    #[serde(default)]
    pub create_time: i64,

    /// Unix timestamp (seconds)
    #[serde(default)]
    pub update_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMap>,
}

/// A backend node of an upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamNode {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    /// Load balancing algorithm, e.g. `roundrobin`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub balancer: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<UpstreamNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ssl {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snis: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(flatten)]
    pub base: BaseInfo,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMap>,
}

macro_rules! impl_labeled {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Labeled for $ty {
                fn labels(&self) -> Option<&LabelMap> {
                    self.labels.as_ref()
                }
            }
        )*
    };
}

impl_labeled!(Route, Service, Upstream, Ssl, Consumer);

/// Any stored entity.
///
/// Serializes as the inner entity, without a kind tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Route(Route),
    Service(Service),
    Upstream(Upstream),
    Ssl(Ssl),
    Consumer(Consumer),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Route(_) => EntityKind::Route,
            Entity::Service(_) => EntityKind::Service,
            Entity::Upstream(_) => EntityKind::Upstream,
            Entity::Ssl(_) => EntityKind::Ssl,
            Entity::Consumer(_) => EntityKind::Consumer,
        }
    }

    pub fn base(&self) -> &BaseInfo {
        match self {
            Entity::Route(e) => &e.base,
            Entity::Service(e) => &e.base,
            Entity::Upstream(e) => &e.base,
            Entity::Ssl(e) => &e.base,
            Entity::Consumer(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseInfo {
        match self {
            Entity::Route(e) => &mut e.base,
            Entity::Service(e) => &mut e.base,
            Entity::Upstream(e) => &mut e.base,
            Entity::Ssl(e) => &mut e.base,
            Entity::Consumer(e) => &mut e.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }
}

impl Labeled for Entity {
    fn labels(&self) -> Option<&LabelMap> {
        match self {
            Entity::Route(e) => e.labels(),
            Entity::Service(e) => e.labels(),
            Entity::Upstream(e) => e.labels(),
            Entity::Ssl(e) => e.labels(),
            Entity::Consumer(e) => e.labels(),
        }
    }
}

impl From<Route> for Entity {
    fn from(value: Route) -> Self {
        Entity::Route(value)
    }
}

impl From<Service> for Entity {
    fn from(value: Service) -> Self {
        Entity::Service(value)
    }
}

impl From<Upstream> for Entity {
    fn from(value: Upstream) -> Self {
        Entity::Upstream(value)
    }
}

impl From<Ssl> for Entity {
    fn from(value: Ssl) -> Self {
        Entity::Ssl(value)
    }
}

impl From<Consumer> for Entity {
    fn from(value: Consumer) -> Self {
        Entity::Consumer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> LabelMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "plugin".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!("all".parse::<EntityKind>().is_err());
        assert!("Route".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_labels_dispatch_for_every_kind() {
        let ls = labels(&[("env", "production")]);
        let entities: Vec<Entity> = vec![
            Route {
                labels: Some(ls.clone()),
                ..Default::default()
            }
            .into(),
            Service {
                labels: Some(ls.clone()),
                ..Default::default()
            }
            .into(),
            Upstream {
                labels: Some(ls.clone()),
                ..Default::default()
            }
            .into(),
            Ssl {
                labels: Some(ls.clone()),
                ..Default::default()
            }
            .into(),
            Consumer {
                username: "jack".to_string(),
                labels: Some(ls.clone()),
                ..Default::default()
            }
            .into(),
        ];

        let kinds: Vec<EntityKind> = entities.iter().map(Entity::kind).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
        for entity in &entities {
            assert_eq!(entity.labels(), Some(&ls));
        }
    }

    #[test]
    fn test_missing_labels_are_none() {
        let entity: Entity = Route::default().into();
        assert!(entity.labels().is_none());
    }

    #[test]
    fn test_route_deserializes_from_yaml() {
        let yaml = r#"
id: r1
uri: /hello
labels:
  build: "16"
  env: production
"#;
        let route: Route = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(route.base.id, "r1");
        assert_eq!(route.uri.as_deref(), Some("/hello"));
        assert_eq!(
            route.labels,
            Some(labels(&[("build", "16"), ("env", "production")]))
        );
    }

    #[test]
    fn test_entity_serializes_untagged() {
        let entity: Entity = Upstream {
            base: BaseInfo {
                id: "1".to_string(),
                ..Default::default()
            },
            balancer: Some("roundrobin".to_string()),
            nodes: vec![UpstreamNode {
                host: "172.16.238.20".to_string(),
                port: 1980,
                weight: 1,
            }],
            ..Default::default()
        }
        .into();

        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["type"], "roundrobin");
        assert_eq!(value["nodes"][0]["port"], 1980);
        assert!(value.get("labels").is_none());
    }
}
