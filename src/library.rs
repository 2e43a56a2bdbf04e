//! Graph library facade and library file loading
//!
//! A library file declares graphs in TOML (or JSON for `.json` files):
//!
//! ```toml
//! [[graphs]]
//! id = "load-tmpl"
//! name = "load-template"
//! template = true
//! options = { title = "{{env}} load" }
//!
//! [[graphs.groups]]
//! name = "cpu"
//! operator = 0
//! consolidate = 1
//! series = [{ name = "cpu", origin = "{{env}}", source = "cpu", metric = "usage" }]
//!
//! [[graphs]]
//! id = "prod-load"
//! name = "prod-load"
//! alias = "prod"
//! link = "load-tmpl"
//! attributes = { env = "prod" }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::attributes::AttributeMap;
use crate::filter::Filter;
use crate::graph::{Graph, GraphError};
use crate::store::{GraphStore, MemoryStore, StoreError};

/// Errors that can occur when loading a library file
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Failed to read library file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse library TOML: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Failed to parse library JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to store library graph: {0}")]
    StoreError(#[from] StoreError),
}

/// Structure for deserializing library files
#[derive(Deserialize)]
struct LibraryFile {
    #[serde(default)]
    graphs: Vec<Graph>,
}

/// Entry point for looking up and expanding library graphs
#[derive(Clone)]
pub struct Library {
    store: Arc<dyn GraphStore>,
}

impl Library {
    /// Wrap an existing store
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Load a library file, choosing JSON or TOML by extension
    pub fn from_file(path: &Path) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        info!(path = %path.display(), "loading graph library");
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load a library from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile = toml::from_str(content)?;
        Self::from_graphs(file.graphs)
    }

    /// Load a library from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile = serde_json::from_str(content)?;
        Self::from_graphs(file.graphs)
    }

    /// Build an in-memory library from graph definitions
    ///
    /// Every graph passes through the store's pre-save checks. An identifier
    /// declared twice is a conflict.
    pub fn from_graphs(graphs: impl IntoIterator<Item = Graph>) -> Result<Self, LibraryError> {
        let store = MemoryStore::new();
        let mut seen = HashSet::new();
        for graph in graphs {
            if !graph.id.is_empty() && !seen.insert(graph.id.clone()) {
                return Err(StoreError::conflict("id", graph.id).into());
            }
            store.save(graph)?;
        }
        debug!(graphs = store.len(), "library loaded");
        Ok(Self::new(Arc::new(store)))
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Fetch a graph by identifier, falling back to its alias
    ///
    /// The returned graph is attached to this library's store.
    pub fn graph(&self, key: &str) -> Result<Graph, StoreError> {
        let mut graph = match self.store.get("id", key) {
            Err(e) if e.is_not_found() => self.store.get("alias", key)?,
            other => other?,
        };
        graph.attach(self.store.clone());
        Ok(graph)
    }

    /// Fetch the template an instance links to, looked up by id as
    /// [`Graph::resolve`] does
    ///
    /// Returns `None` for graphs without a link.
    pub fn link_target(&self, graph: &Graph) -> Result<Option<Graph>, StoreError> {
        graph
            .link_id()
            .map(|link| self.store.get("id", link))
            .transpose()
    }

    /// Fetch and fully expand a graph
    pub fn expand(&self, key: &str, attrs: &AttributeMap) -> Result<Graph, GraphError> {
        let mut graph = self.graph(key)?;
        graph.expand(attrs)?;
        Ok(graph)
    }

    /// List graphs matching a filter
    pub fn list(&self, filter: &Filter) -> Result<Vec<Graph>, StoreError> {
        self.store.list(filter)
    }

    /// List every graph in the library
    pub fn all(&self) -> Result<Vec<Graph>, StoreError> {
        self.list(&Filter::Glob("*".to_string()))
    }

    /// List reusable template graphs
    pub fn templates(&self) -> Result<Vec<Graph>, StoreError> {
        Ok(self.all()?.into_iter().filter(|g| g.template).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"
[[graphs]]
id = "load-tmpl"
name = "load-template"
template = true
options = { title = "{{env}} load" }

[[graphs.groups]]
name = "cpu"
operator = 2
consolidate = 1
series = [{ name = "cpu", origin = "{{env}}", source = "cpu", metric = "usage" }]

[[graphs]]
id = "prod-load"
name = "prod-load"
alias = "prod"
link = "load-tmpl"
attributes = { env = "prod" }
"#;

    #[test]
    fn test_from_toml_str() {
        let library = Library::from_toml_str(LIBRARY).expect("Should load");
        assert_eq!(library.all().unwrap().len(), 2);
        assert_eq!(library.templates().unwrap().len(), 1);
    }

    #[test]
    fn test_graph_by_alias() {
        let library = Library::from_toml_str(LIBRARY).unwrap();
        let graph = library.graph("prod").unwrap();
        assert_eq!(graph.id, "prod-load");
        assert!(graph.is_attached());
    }

    #[test]
    fn test_expand() {
        let library = Library::from_toml_str(LIBRARY).unwrap();
        let graph = library.expand("prod-load", &AttributeMap::new()).unwrap();

        assert_eq!(graph.options.get_str("title"), Some("prod load"));
        assert_eq!(graph.groups.0[0].operator, crate::graph::Operator::Sum);
        assert_eq!(graph.series().next().unwrap().origin, "prod");
    }

    #[test]
    fn test_missing_graph() {
        let library = Library::from_toml_str(LIBRARY).unwrap();
        let err = library.graph("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref field, .. } if field == "alias"));
    }

    #[test]
    fn test_from_json_str() {
        let library = Library::from_json_str(
            r#"{"graphs":[{"id":"g1","name":"cpu","options":{"title":"x"}}]}"#,
        )
        .unwrap();
        assert_eq!(library.graph("g1").unwrap().name, "cpu");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Library::from_toml_str("[[graphs]\n"),
            Err(LibraryError::TomlError(_))
        ));
    }

    #[test]
    fn test_duplicate_id_rejected_on_load() {
        let result = Library::from_toml_str(
            r#"
[[graphs]]
id = "g1"
name = "cpu"

[[graphs]]
id = "g1"
name = "mem"
"#,
        );
        assert!(matches!(
            result,
            Err(LibraryError::StoreError(StoreError::Conflict { ref field, ref value }))
                if field == "id" && value == "g1"
        ));
    }

    #[test]
    fn test_link_target() {
        let library = Library::from_toml_str(LIBRARY).unwrap();
        let instance = library.graph("prod").unwrap();
        let template = library.link_target(&instance).unwrap().expect("Should have link");
        assert_eq!(template.id, "load-tmpl");

        let template = library.graph("load-tmpl").unwrap();
        assert!(library.link_target(&template).unwrap().is_none());
    }

    #[test]
    fn test_link_by_alias_is_broken() {
        let library = Library::from_toml_str(
            r#"
[[graphs]]
id = "tmpl-id"
name = "tmpl"
alias = "tmpl-alias"
template = true

[[graphs]]
id = "inst"
name = "inst"
link = "tmpl-alias"
"#,
        )
        .unwrap();
        let instance = library.graph("inst").unwrap();

        let err = library.link_target(&instance).unwrap_err();
        assert!(err.is_not_found());
        assert!(library.expand("inst", &AttributeMap::new()).is_err());
    }

    #[test]
    fn test_invalid_alias_rejected_on_load() {
        let result = Library::from_toml_str(
            r#"
[[graphs]]
name = "cpu"
alias = "has space"
"#,
        );
        assert!(matches!(
            result,
            Err(LibraryError::StoreError(StoreError::InvalidAlias { .. }))
        ));
    }
}
