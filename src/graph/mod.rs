//! Library graph items
//!
//! A graph is either a direct definition or an instance linking to a reusable
//! template graph. Instances are materialized by [`Graph::expand`], which pulls
//! in the template through the graph's backing store and substitutes
//! attribute placeholders in the title and series coordinates.

mod error;
mod resolve;
pub mod series;

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::AttributeMap;
use crate::store::{GraphStore, StoreError, StoreHandle};

pub use error::GraphError;
pub use resolve::{Expansion, Resolution};
pub use series::{CodecError, Consolidate, Operator, Series, SeriesGroup, SeriesGroups};

/// Pattern shared by item names and graph aliases
const NAME_PATTERN: &str = r"(?i)^[a-z0-9](?:[a-z0-9\-_\.]*[a-z0-9])?$";

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// Check a name or alias against the library naming rule
pub fn is_valid_name(name: &str) -> bool {
    NAME_REGEX
        .get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern compiles"))
        .is_match(name)
}

/// A library graph item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "SeriesGroups::is_empty")]
    pub groups: SeriesGroups,
    /// Identifier of the template graph this instance inherits from
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub options: AttributeMap,
    #[serde(default)]
    pub template: bool,

    #[serde(skip)]
    link: Option<Box<Graph>>,
    #[serde(skip)]
    store: Option<StoreHandle>,
    #[serde(skip)]
    resolution: Resolution,
    #[serde(skip)]
    expansion: Expansion,
}

impl Graph {
    /// Create an empty graph attached to a backing store
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store: Some(StoreHandle::new(store)),
            ..Self::default()
        }
    }

    /// Create an empty graph with no backing store
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Link this graph to a template graph by identifier
    pub fn with_link(mut self, link_id: impl Into<String>) -> Self {
        self.link_id = Some(link_id.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_group(mut self, group: SeriesGroup) -> Self {
        self.groups.0.push(group);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Mark the graph as a reusable template
    pub fn as_template(mut self) -> Self {
        self.template = true;
        self
    }

    /// Attach the graph to a backing store
    pub fn attach(&mut self, store: Arc<dyn GraphStore>) {
        self.store = Some(StoreHandle::new(store));
    }

    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    /// The non-empty link identifier, if any
    pub fn link_id(&self) -> Option<&str> {
        self.link_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether this graph inherits from a template
    pub fn is_instance(&self) -> bool {
        self.link_id().is_some()
    }

    /// The resolved template graph, available after [`Graph::resolve`]
    pub fn link(&self) -> Option<&Graph> {
        self.link.as_deref()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution == Resolution::Resolved
    }

    pub fn is_expanded(&self) -> bool {
        self.expansion == Expansion::Expanded
    }

    /// Iterate every series across all groups
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.groups.iter().flat_map(|g| g.series.iter())
    }

    /// Series missing one of their identifying coordinates
    pub fn invalid_series(&self) -> Vec<&Series> {
        self.series().filter(|s| !s.is_valid()).collect()
    }

    /// Validate and normalize the graph before it is persisted
    ///
    /// Empty link and alias values become unset, a missing identifier is
    /// generated, and the name and alias must follow the naming rule.
    pub fn before_save(&mut self) -> Result<(), StoreError> {
        if self.link_id.as_deref() == Some("") {
            self.link_id = None;
        }
        if self.alias.as_deref() == Some("") {
            self.alias = None;
        }

        if !is_valid_name(&self.name) {
            return Err(StoreError::InvalidName {
                name: self.name.clone(),
            });
        }
        if let Some(alias) = &self.alias {
            if !is_valid_name(alias) {
                return Err(StoreError::InvalidAlias {
                    alias: alias.clone(),
                });
            }
        }

        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }

        Ok(())
    }

    /// Strip transient state, leaving only what a store persists
    pub(crate) fn into_stored(mut self) -> Self {
        self.link = None;
        self.store = None;
        self.resolution = Resolution::default();
        self.expansion = Expansion::default();
        self
    }
}
