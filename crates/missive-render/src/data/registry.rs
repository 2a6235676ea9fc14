//! Extension-keyed decoder registry.
//!
//! [`DecoderRegistry`] maps a normalized format key to a [`Decoder`]. Keys are
//! lower-cased and stored without a leading dot, so `"YAML"`, `".yaml"` and
//! `"yaml"` all name the same entry.
//!
//! Registration never fails: registering an existing key replaces the previous
//! decoder. The default registry aliases `yaml` and `yml` to one decoder.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::{decode_json, decode_toml, decode_yaml, RecipientData};
use crate::error::{RenderError, Result};

/// Turns a raw byte stream into [`RecipientData`].
///
/// Implemented for every `Fn(&mut dyn Read) -> Result<RecipientData>`, so plain
/// functions such as [`decode_json`] and annotated closures can be registered
/// directly.
pub trait Decoder: Send + Sync {
    /// Decodes the stream, failing with [`RenderError::DataDecodeFailed`] on
    /// malformed input.
    fn decode(&self, reader: &mut dyn Read) -> Result<RecipientData>;
}

impl<F> Decoder for F
where
    F: Fn(&mut dyn Read) -> Result<RecipientData> + Send + Sync,
{
    fn decode(&self, reader: &mut dyn Read) -> Result<RecipientData> {
        self(reader)
    }
}

/// Derives the registry key from a file name.
///
/// The key is the text after the last `.` of the final path component,
/// lower-cased. A name without a dot yields the empty key.
///
/// ```rust
/// use missive_render::data::format_key;
///
/// assert_eq!(format_key("recipients.YML"), "yml");
/// assert_eq!(format_key("./in/data.backup.json"), "json");
/// assert_eq!(format_key("README"), "");
/// ```
pub fn format_key(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name);

    match base.rfind('.') {
        Some(dot) => base[dot + 1..].to_lowercase(),
        None => String::new(),
    }
}

fn normalize_key(format: &str) -> String {
    let lower = format.to_lowercase();
    match lower.strip_prefix('.') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Registry of decoders keyed by file extension.
///
/// # Example
///
/// ```rust
/// use missive_render::data::DecoderRegistry;
///
/// let registry = DecoderRegistry::new();
/// let decoder = registry.lookup("recipients.yaml").unwrap();
///
/// let data = decoder.decode(&mut "alice:\n  name: Alice\n".as_bytes()).unwrap();
/// assert_eq!(data["alice"]["name"], "Alice");
///
/// let err = registry.lookup("recipients.xml").err().unwrap();
/// assert!(err.is_unsupported_format());
/// ```
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn Decoder>>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("formats", &self.supported_formats())
            .finish()
    }
}

impl DecoderRegistry {
    /// Creates a registry with the built-in JSON, YAML (`yaml` and `yml`) and
    /// TOML decoders.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        let yaml: Arc<dyn Decoder> = Arc::new(decode_yaml);
        registry.register("json", decode_json);
        registry.register_shared("yaml", Arc::clone(&yaml));
        registry.register_shared("yml", yaml);
        registry.register("toml", decode_toml);

        tracing::info!(
            supported_formats = ?registry.supported_formats(),
            "decoder registry initialized"
        );
        registry
    }

    /// Creates a registry with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers `decoder` under `format`, replacing any previous entry.
    pub fn register<D>(&mut self, format: &str, decoder: D)
    where
        D: Decoder + 'static,
    {
        self.register_shared(format, Arc::new(decoder));
    }

    /// Registers an already shared decoder, e.g. to alias several extensions.
    pub fn register_shared(&mut self, format: &str, decoder: Arc<dyn Decoder>) {
        let key = normalize_key(format);
        tracing::debug!(extension = %key, "registering decoder");
        self.decoders.insert(key, decoder);
    }

    /// Returns the decoder for `file_name`'s extension.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedFormat`] naming the extension and the
    /// registered keys when nothing is registered for it.
    pub fn lookup(&self, file_name: &str) -> Result<Arc<dyn Decoder>> {
        let extension = format_key(file_name);
        tracing::debug!(file_name, extension = %extension, "looking up decoder");

        match self.decoders.get(&extension) {
            Some(decoder) => Ok(Arc::clone(decoder)),
            None => {
                let supported: Vec<String> = self.supported_formats().into_iter().collect();
                tracing::warn!(
                    extension = %extension,
                    supported_formats = ?supported,
                    "no decoder registered for extension"
                );
                Err(RenderError::UnsupportedFormat {
                    extension,
                    supported,
                })
            }
        }
    }

    /// Looks up the decoder for `file_name` and decodes `reader` with it.
    pub fn decode(&self, file_name: &str, reader: &mut dyn Read) -> Result<RecipientData> {
        self.lookup(file_name)?.decode(reader)
    }

    /// Returns the registered format keys.
    ///
    /// Intended for diagnostics and help output.
    pub fn supported_formats(&self) -> BTreeSet<String> {
        self.decoders.keys().cloned().collect()
    }

    /// Whether a decoder is registered for `format` (normalized like a key).
    pub fn supports(&self, format: &str) -> bool {
        self.decoders.contains_key(&normalize_key(format))
    }
}
