//! # Missive Render - Strict Per-Recipient Message Rendering
//!
//! `missive-render` turns one message template and one data file into a
//! personalized message per recipient, ready for a chat surface that accepts a
//! small HTML subset.
//!
//! ## Core Concepts
//!
//! - [`DecoderRegistry`]: picks a decoder from the data file's extension
//!   (`.json`, `.yaml`/`.yml`, `.toml`)
//! - [`PlaceholderTemplate`]: `{{.field}}` templates that fail on missing fields
//! - [`normalize()`]: plain text gets `<br>` line breaks, markup is left alone
//! - [`Pipeline`]: composes the three, all-or-nothing
//!
//! ## Quick Start
//!
//! ```rust
//! use missive_render::{pipeline, DecoderRegistry};
//!
//! let registry = DecoderRegistry::new();
//! let decoder = registry.lookup("recipients.yaml").unwrap();
//!
//! let template = "Hello {{.name}}!\nYour order #{{.order}} is ready.";
//! let data = r#"
//! alice:
//!   name: Alice
//!   order: "12345"
//! bob:
//!   name: Bob
//!   order: "67890"
//! "#;
//!
//! let messages = pipeline::run(template.as_bytes(), data.as_bytes(), decoder.as_ref()).unwrap();
//! assert_eq!(messages["alice"], "Hello Alice!<br>Your order #12345 is ready.");
//! assert_eq!(messages["bob"], "Hello Bob!<br>Your order #67890 is ready.");
//! ```
//!
//! ## Strictness
//!
//! A field referenced by the template but absent from a recipient's data fails
//! the whole run. Nothing is rendered with a blank in its place:
//!
//! ```rust
//! use missive_render::{pipeline, data::decode_json, RenderError};
//!
//! let err = pipeline::run(
//!     "Hi {{.name}}, reply to {{.email}}".as_bytes(),
//!     r#"{"alice": {"name": "Alice"}}"#.as_bytes(),
//!     &decode_json,
//! )
//! .unwrap_err();
//!
//! assert!(matches!(err, RenderError::MissingPlaceholder { ref field, .. } if field == "email"));
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events and never
//! installs a subscriber. Applications choose where events go.

pub mod data;
mod error;
pub mod normalize;
pub mod pipeline;
pub mod prelude;
pub mod template;

pub use error::{BoxError, RenderError, Result};

pub use data::{Decoder, DecoderRegistry, FieldMap, RecipientData};
pub use normalize::{classify, normalize, ContentKind};
pub use pipeline::{run, MessageBatch, Pipeline, RenderOptions, RenderedMessages};
pub use template::{
    CompiledTemplate, MiniJinjaEngine, PlaceholderEngine, PlaceholderTemplate, Syntax,
    TemplateEngine,
};
