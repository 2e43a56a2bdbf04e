//! Link resolution and template expansion
//!
//! Each graph instance moves through two independent one-way latches:
//!
//! ```text
//! Unresolved --resolve()--> Resolved      (link fetched or confirmed absent)
//! Unexpanded --expand()---> Expanded      (placeholders substituted)
//! ```
//!
//! Both operations return immediately once their latch is set. Only one level
//! of indirection is followed: when the fetched template itself links to
//! another graph, that link is left untouched.

use tracing::{debug, warn};

use super::{Graph, GraphError};
use crate::attributes::AttributeMap;
use crate::template;

/// Whether a graph's link has been looked up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    Unresolved,
    Resolved,
}

/// Whether a graph's templated fields have been substituted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expansion {
    #[default]
    Unexpanded,
    Expanded,
}

impl Graph {
    /// Fetch the linked template graph from the backing store
    ///
    /// Graphs without a link are marked resolved without any lookup. A failed
    /// lookup leaves the graph unresolved.
    pub fn resolve(&mut self) -> Result<(), GraphError> {
        if self.resolution == Resolution::Resolved {
            return Ok(());
        }

        let store = self
            .store
            .clone()
            .ok_or_else(|| GraphError::unresolvable(self.id.clone()))?;

        if let Some(link_id) = self.link_id().map(str::to_owned) {
            debug!(graph = %self.id, link = %link_id, "resolving graph link");
            let mut link = store.get("id", &link_id)?;
            link.store = Some(store);
            if link.is_instance() {
                warn!(
                    graph = %self.id,
                    link = %link_id,
                    "linked graph is itself an instance, its own link is not followed"
                );
            }
            self.link = Some(Box::new(link));
        }

        self.resolution = Resolution::Resolved;
        Ok(())
    }

    /// Materialize the graph against its template and the given attributes
    ///
    /// `attrs` override the graph's own attributes. An attached instance is
    /// replaced by its template, keeping its own identifier and layering its
    /// attributes and options over the template defaults. The title option and
    /// the name, origin, source and metric of every series are then expanded.
    ///
    /// The first substitution failure aborts; fields already rewritten stay
    /// rewritten and the graph remains unexpanded.
    pub fn expand(&mut self, attrs: &AttributeMap) -> Result<(), GraphError> {
        if self.expansion == Expansion::Expanded {
            return Ok(());
        }

        self.attributes.merge(attrs, true);

        if self.store.is_some() && self.is_instance() {
            self.resolve()?;
            if let Some(link) = self.link.as_deref() {
                let instance = self.instantiate(link.clone());
                *self = instance;
            }
        }

        if let Some(title) = self.options.get_str("title").map(str::to_owned) {
            let title = template::expand(&title, &self.attributes)?;
            self.options.insert("title", title);
        }

        for group in self.groups.iter_mut() {
            for series in group.series.iter_mut() {
                series.name = template::expand(&series.name, &self.attributes)?;
                series.origin = template::expand(&series.origin, &self.attributes)?;
                series.source = template::expand(&series.source, &self.attributes)?;
                series.metric = template::expand(&series.metric, &self.attributes)?;
            }
        }

        debug!(graph = %self.id, "graph expanded");
        self.expansion = Expansion::Expanded;
        Ok(())
    }

    /// Build the expanded value of this instance from a copy of its template
    fn instantiate(&self, mut template: Graph) -> Graph {
        template.id = self.id.clone();
        template.attributes.merge(&self.attributes, true);
        template.options.merge(&self.options, true);
        template.template = false;
        template.store = self.store.clone();
        template
    }
}
