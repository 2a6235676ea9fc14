//! Template compilation and rendering.
//!
//! Templates are compiled once and rendered per recipient. The default syntax
//! is the `{{.field}}` placeholder language described in [`placeholder`]; see
//! [`Syntax`] for the alternatives.
//!
//! ## Strictness
//!
//! Every backend treats a missing field as an error. A message with a silent
//! blank where a name or order number belongs is worse than no message.
//!
//! ```rust
//! use missive_render::data::FieldMap;
//! use missive_render::template;
//!
//! let compiled = template::compile("Hello {{.name}}!").unwrap();
//! let fields = FieldMap::from([("name".to_string(), "Alice".to_string())]);
//! assert_eq!(template::render(&compiled, &fields).unwrap(), "Hello Alice!");
//! ```

mod engine;
mod jinja;
pub mod placeholder;

pub use engine::{CompiledTemplate, PlaceholderEngine, Syntax, TemplateEngine, UnknownSyntax};
pub use jinja::{JinjaTemplate, MiniJinjaEngine};
pub use placeholder::PlaceholderTemplate;

use crate::data::FieldMap;
use crate::error::Result;

/// Compiles `source` with the placeholder syntax.
pub fn compile(source: &str) -> Result<PlaceholderTemplate> {
    PlaceholderTemplate::compile(source)
}

/// Renders a compiled template against one recipient's fields.
pub fn render(template: &dyn CompiledTemplate, fields: &FieldMap) -> Result<String> {
    template.render(fields)
}
