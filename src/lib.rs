//! Graph Template - resolution and expansion of metrics-dashboard graphs
//!
//! Library graphs are either direct definitions or instances linking to a
//! reusable template graph. This crate resolves those links through a backing
//! store, layers instance attributes over template defaults, and substitutes
//! `{{attribute}}` placeholders in graph titles and series coordinates. It also
//! provides the glob/regexp filter modifiers used to select library entries.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use graph_template::{AttributeMap, Graph, MemoryStore, Series, SeriesGroup};
//!
//! let store = Arc::new(MemoryStore::new());
//! store.save(
//!     Graph::detached()
//!         .with_id("tmpl")
//!         .with_name("load")
//!         .as_template()
//!         .with_option("title", "{{env}} load")
//!         .with_group(SeriesGroup::new("cpu").with_series(Series::new("{{env}}", "cpu", "usage"))),
//! ).unwrap();
//!
//! let mut graph = Graph::new(store)
//!     .with_id("prod")
//!     .with_link("tmpl")
//!     .with_attribute("env", "prod");
//! graph.expand(&AttributeMap::new()).unwrap();
//!
//! assert_eq!(graph.options.get_str("title"), Some("prod load"));
//! assert_eq!(graph.series().next().unwrap().origin, "prod");
//! ```

pub mod attributes;
pub mod error;
pub mod filter;
pub mod graph;
pub mod library;
pub mod store;
pub mod template;

pub use attributes::AttributeMap;
pub use error::Error;
pub use filter::{apply_modifier, Filter, FilterError, GLOB_PREFIX, REGEXP_PREFIX};
pub use graph::{
    is_valid_name, CodecError, Consolidate, Expansion, Graph, GraphError, Operator, Resolution,
    Series, SeriesGroup, SeriesGroups,
};
pub use library::{Library, LibraryError};
pub use store::{GraphStore, MemoryStore, StoreError};
pub use template::TemplateError;

/// Load a library file and expand one of its graphs
///
/// `key` is a graph identifier or alias.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use graph_template::{expand_from_file, AttributeMap};
///
/// let graph = expand_from_file(Path::new("library.toml"), "prod-load", &AttributeMap::new())?;
/// println!("{}", graph.name);
/// # Ok::<(), graph_template::Error>(())
/// ```
pub fn expand_from_file(
    path: &std::path::Path,
    key: &str,
    attrs: &AttributeMap,
) -> Result<Graph, Error> {
    let library = Library::from_file(path)?;
    Ok(library.expand(key, attrs)?)
}
