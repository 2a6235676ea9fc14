//! Recipient data decoding.
//!
//! A data file maps each recipient identifier (a channel reference, a user name)
//! to a flat map of field values:
//!
//! ```yaml
//! alice:
//!   name: Alice
//!   order: "12345"
//! bob:
//!   name: Bob
//!   order: "67890"
//! ```
//!
//! The same structure can be written as a JSON object or a TOML table. Whatever
//! the format, decoding produces a [`RecipientData`] value.
//!
//! ## Format Dispatch
//!
//! [`DecoderRegistry`] picks a [`Decoder`] from the data file's extension. The
//! extension is the only signal; content is never sniffed.
//!
//! | Extension | Decoder |
//! |-----------|---------|
//! | `.json` | [`decode_json`] |
//! | `.yaml`, `.yml` | [`decode_yaml`] |
//! | `.toml` | [`decode_toml`] |
//!
//! Additional formats are plain functions or closures registered under a new key:
//!
//! ```rust
//! use std::io::Read;
//! use missive_render::data::{DecoderRegistry, RecipientData};
//! use missive_render::RenderError;
//!
//! fn decode_empty(_reader: &mut dyn Read) -> Result<RecipientData, RenderError> {
//!     Ok(RecipientData::new())
//! }
//!
//! let mut registry = DecoderRegistry::new();
//! registry.register("none", decode_empty);
//! assert!(registry.supported_formats().contains("none"));
//! ```

mod decoders;
mod registry;

use std::collections::HashMap;

pub use decoders::{decode_json, decode_toml, decode_yaml};
pub use registry::{format_key, Decoder, DecoderRegistry};

/// Field values for a single recipient.
pub type FieldMap = HashMap<String, String>;

/// Recipient identifier to field map, as decoded from one data file.
pub type RecipientData = HashMap<String, FieldMap>;
