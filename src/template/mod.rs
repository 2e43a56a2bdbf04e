//! Template substitution for graph string fields
//!
//! Graph titles and series coordinates may embed attribute placeholders that
//! are replaced at expansion time:
//!
//! ```text
//! title:  "{{env}} load"        attrs: env = "prod"   ->  "prod load"
//! origin: "{{ .env }}-web"                            ->  "prod-web"
//! ```
//!
//! Only flat substitution is supported; there are no conditionals, loops or
//! nested lookups.

mod expand;
mod lexer;

pub use expand::{expand, referenced_attributes, TemplateError};
pub use lexer::Span;
