//! Convenient imports.
//!
//! ```rust
//! use missive_render::prelude::*;
//!
//! let registry = DecoderRegistry::new();
//! let pipeline = Pipeline::with_options(RenderOptions::new().with_syntax(Syntax::Placeholder));
//! let decoder = registry.lookup("data.json").unwrap();
//! let messages = pipeline
//!     .run("{{.x}}".as_bytes(), r#"{"r": {"x": "1"}}"#.as_bytes(), decoder.as_ref())
//!     .unwrap();
//! assert_eq!(messages["r"], "1");
//! ```

pub use crate::data::{Decoder, DecoderRegistry, FieldMap, RecipientData};
pub use crate::error::RenderError;
pub use crate::pipeline::{MessageBatch, Pipeline, RenderOptions, RenderedMessages};
pub use crate::template::{CompiledTemplate, Syntax, TemplateEngine};
