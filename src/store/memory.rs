//! In-memory graph store

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use super::{GraphStore, StoreError};
use crate::filter::Filter;
use crate::graph::{Graph, SeriesGroups};

/// A persisted graph: series groups are kept as their encoded text blob
#[derive(Debug, Clone)]
struct Row {
    graph: Graph,
    groups: String,
}

impl Row {
    fn encode(mut graph: Graph) -> Result<Self, StoreError> {
        let groups = std::mem::take(&mut graph.groups).encode()?;
        Ok(Self {
            graph: graph.into_stored(),
            groups,
        })
    }

    fn decode(&self) -> Result<Graph, StoreError> {
        let mut graph = self.graph.clone();
        graph.groups = SeriesGroups::decode(&self.groups)?;
        Ok(graph)
    }
}

/// Graph store keeping rows in memory, in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<IndexMap<String, Row>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a graph, returning its identifier
    ///
    /// The graph goes through [`Graph::before_save`] first. Saving an existing
    /// identifier replaces that graph; aliases must be unique.
    pub fn save(&self, mut graph: Graph) -> Result<String, StoreError> {
        graph.before_save()?;

        let mut rows = self.rows.write();
        if let Some(alias) = graph.alias.as_deref() {
            let taken = rows
                .values()
                .any(|row| row.graph.id != graph.id && row.graph.alias.as_deref() == Some(alias));
            if taken {
                return Err(StoreError::conflict("alias", alias));
            }
        }

        let id = graph.id.clone();
        debug!(graph = %id, name = %graph.name, "saving graph");
        rows.insert(id.clone(), Row::encode(graph)?);
        Ok(id)
    }

    /// Remove a graph by identifier
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.rows
            .write()
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("id", id))
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl GraphStore for MemoryStore {
    fn get(&self, field: &str, value: &str) -> Result<Graph, StoreError> {
        let rows = self.rows.read();
        let row = match field {
            "id" => rows.get(value),
            "alias" => rows
                .values()
                .find(|row| row.graph.alias.as_deref() == Some(value)),
            "name" => rows.values().find(|row| row.graph.name == value),
            _ => {
                return Err(StoreError::UnknownField {
                    field: field.to_string(),
                })
            }
        };

        row.ok_or_else(|| StoreError::not_found(field, value))?
            .decode()
    }

    fn list(&self, filter: &Filter) -> Result<Vec<Graph>, StoreError> {
        let matcher = filter.matcher()?;
        self.rows
            .read()
            .values()
            .filter(|row| {
                matcher.is_match(&row.graph.id)
                    || matcher.is_match(&row.graph.name)
                    || row
                        .graph
                        .alias
                        .as_deref()
                        .is_some_and(|alias| matcher.is_match(alias))
            })
            .map(Row::decode)
            .collect()
    }
}
