//! Error types for graph resolution and expansion

use thiserror::Error;

use crate::store::StoreError;
use crate::template::TemplateError;

/// Errors that can occur while resolving or expanding a graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph has no backing store to look its link up in
    #[error("graph '{id}' is not attached to a store and cannot be resolved")]
    UnresolvableItem { id: String },

    /// Link lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Placeholder substitution failed
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl GraphError {
    /// Create an unresolvable item error
    pub fn unresolvable(id: impl Into<String>) -> Self {
        Self::UnresolvableItem { id: id.into() }
    }

    /// Get the template error if substitution failed
    pub fn template_error(&self) -> Option<&TemplateError> {
        match self {
            Self::Template(e) => Some(e),
            _ => None,
        }
    }
}
