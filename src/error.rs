//! Crate-level error type

use thiserror::Error;

use crate::filter::FilterError;
use crate::graph::GraphError;
use crate::library::LibraryError;
use crate::store::StoreError;
use crate::template::TemplateError;

/// Any error raised while loading, looking up or expanding graphs
#[derive(Debug, Error)]
pub enum Error {
    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("expansion error: {0}")]
    Graph(#[from] GraphError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
}

impl Error {
    /// The underlying template error, if any
    pub fn template_error(&self) -> Option<&TemplateError> {
        match self {
            Error::Template(e) => Some(e),
            Error::Graph(e) => e.template_error(),
            _ => None,
        }
    }

    /// Format the error for display, with source context for template errors
    pub fn format(&self, filename: &str) -> String {
        match self.template_error() {
            Some(e) => e.format(filename),
            None => self.to_string(),
        }
    }
}
