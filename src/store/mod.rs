//! Backing store port for library graphs
//!
//! The resolution engine only needs to fetch a graph by one of its unique
//! fields. Persistence itself lives behind [`GraphStore`]; [`MemoryStore`] is
//! the in-process implementation used by the CLI and the tests.

mod memory;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::filter::{Filter, FilterError};
use crate::graph::{CodecError, Graph};

pub use memory::MemoryStore;

/// Errors raised by graph stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// No graph has the requested field value
    #[error("no graph with {field} '{value}'")]
    NotFound { field: String, value: String },

    /// A unique field is already taken by another graph
    #[error("a graph with {field} '{value}' already exists")]
    Conflict { field: String, value: String },

    /// The lookup field is not a unique graph field
    #[error("unsupported lookup field '{field}'")]
    UnknownField { field: String },

    /// Alias rejected by the pre-save hook
    #[error("invalid alias '{alias}'")]
    InvalidAlias { alias: String },

    /// Name rejected by the pre-save hook
    #[error("invalid name '{name}'")]
    InvalidName { name: String },

    /// Stored series groups could not be converted
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// List filter could not be compiled
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Opaque backend failure
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a not-found error
    pub fn not_found(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotFound {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Lookup interface the resolution engine depends on
pub trait GraphStore: Send + Sync {
    /// Fetch a graph by a unique field (`id`, `alias` or `name`)
    ///
    /// Returned graphs are detached and in their initial unresolved,
    /// unexpanded state.
    fn get(&self, field: &str, value: &str) -> Result<Graph, StoreError>;

    /// List graphs whose id, name or alias matches `filter`
    fn list(&self, filter: &Filter) -> Result<Vec<Graph>, StoreError>;
}

/// Shared, non-owning reference from a graph to the store it came from
#[derive(Clone)]
pub struct StoreHandle(Arc<dyn GraphStore>);

impl StoreHandle {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self(store)
    }

    pub fn get(&self, field: &str, value: &str) -> Result<Graph, StoreError> {
        self.0.get(field, value)
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreHandle { .. }")
    }
}

impl From<Arc<dyn GraphStore>> for StoreHandle {
    fn from(store: Arc<dyn GraphStore>) -> Self {
        Self(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found("id", "abc");
        assert_eq!(err.to_string(), "no graph with id 'abc'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_conflict_display() {
        let err = StoreError::conflict("alias", "cpu");
        assert!(err.to_string().contains("already exists"));
        assert!(!err.is_not_found());
    }
}
