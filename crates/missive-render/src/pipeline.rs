//! Rendering orchestration.
//!
//! A run reads and compiles the template, decodes the data with the caller's
//! decoder, then renders and normalizes one message per recipient:
//!
//! ```text
//! template bytes ──► compile ─┐
//!                             ├─► render per recipient ──► normalize ──► RenderedMessages
//! data bytes ──► decode ──────┘
//! ```
//!
//! Runs are all-or-nothing. The first failure is returned and no partial map
//! is produced, so a caller never delivers to some recipients and not others
//! because of a bad template.
//!
//! # Example
//!
//! ```rust
//! use missive_render::data::decode_json;
//! use missive_render::pipeline;
//!
//! let template = "Hello {{.name}}!\nSee you soon.";
//! let data = r#"{"alice": {"name": "Alice"}, "bob": {"name": "Bob"}}"#;
//!
//! let messages = pipeline::run(template.as_bytes(), data.as_bytes(), &decode_json).unwrap();
//! assert_eq!(messages["alice"], "Hello Alice!<br>See you soon.");
//! assert_eq!(messages["bob"], "Hello Bob!<br>See you soon.");
//! ```

use std::collections::{BTreeSet, HashMap};
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::data::{Decoder, RecipientData};
use crate::error::Result;
use crate::normalize::normalize;
use crate::template::{CompiledTemplate, Syntax};

/// Recipient identifier to final message content.
pub type RenderedMessages = HashMap<String, String>;

/// Options for a rendering run.
///
/// ```rust
/// use missive_render::pipeline::RenderOptions;
/// use missive_render::template::Syntax;
///
/// let options = RenderOptions::new()
///     .with_syntax(Syntax::Jinja)
///     .with_normalize(false);
/// assert_eq!(options.syntax, Syntax::Jinja);
/// assert!(!options.normalize);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Template syntax. Defaults to `{{.field}}` placeholders.
    pub syntax: Syntax,
    /// Apply content normalization to each rendered message.
    pub normalize: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            syntax: Syntax::default(),
            normalize: true,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Disabling normalization returns the raw rendered text.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

/// A configured rendering pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: RenderOptions,
}

impl Pipeline {
    /// Creates a pipeline with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Compiles the template and decodes the data without rendering.
    ///
    /// # Errors
    ///
    /// [`RenderError::Io`](crate::RenderError::Io) if either stream cannot be
    /// read, [`RenderError::TemplateSyntax`](crate::RenderError::TemplateSyntax)
    /// for a bad template, or the decoder's error.
    pub fn prepare<D>(
        &self,
        mut template: impl Read,
        mut data: impl Read,
        decoder: &D,
    ) -> Result<MessageBatch>
    where
        D: Decoder + ?Sized,
    {
        let mut source = String::new();
        template.read_to_string(&mut source).map_err(|e| {
            tracing::error!(error = %e, "failed to read template");
            e
        })?;

        let engine = self.options.syntax.engine();
        tracing::debug!(engine = engine.name(), bytes = source.len(), "compiling template");
        let compiled = engine.compile(&source).map_err(|e| {
            tracing::error!(error = %e, "failed to compile template");
            e
        })?;

        let recipients = decoder.decode(&mut data)?;
        tracing::info!(recipient_count = recipients.len(), "loaded recipient data");

        Ok(MessageBatch {
            template: compiled,
            data: recipients,
            normalize: self.options.normalize,
        })
    }

    /// Prepares and renders in one step.
    pub fn run<D>(
        &self,
        template: impl Read,
        data: impl Read,
        decoder: &D,
    ) -> Result<RenderedMessages>
    where
        D: Decoder + ?Sized,
    {
        self.prepare(template, data, decoder)?.render()
    }
}

/// A compiled template paired with decoded recipient data.
///
/// Splitting preparation from rendering lets a caller report how many
/// recipients a run targets, or which fields the template needs, before
/// producing any message.
pub struct MessageBatch {
    template: Box<dyn CompiledTemplate>,
    data: RecipientData,
    normalize: bool,
}

impl std::fmt::Debug for MessageBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBatch")
            .field("placeholders", &self.template.placeholders())
            .field("recipient_count", &self.data.len())
            .field("normalize", &self.normalize)
            .finish()
    }
}

impl MessageBatch {
    /// Prepares a batch with default options.
    pub fn prepare<D>(template: impl Read, data: impl Read, decoder: &D) -> Result<Self>
    where
        D: Decoder + ?Sized,
    {
        Pipeline::new().prepare(template, data, decoder)
    }

    pub fn recipient_count(&self) -> usize {
        self.data.len()
    }

    /// Field names the template references.
    pub fn placeholders(&self) -> BTreeSet<String> {
        self.template.placeholders()
    }

    /// Recipient identifiers, sorted.
    pub fn recipients(&self) -> BTreeSet<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    /// Renders every recipient.
    ///
    /// # Errors
    ///
    /// Returns the first failure, with the recipient attached to a
    /// [`RenderError::MissingPlaceholder`](crate::RenderError::MissingPlaceholder).
    pub fn render(&self) -> Result<RenderedMessages> {
        let mut messages = RenderedMessages::with_capacity(self.data.len());

        for (recipient, fields) in &self.data {
            tracing::debug!(recipient = %recipient, "rendering message");

            let rendered = self.template.render(fields).map_err(|e| {
                let e = e.with_recipient(recipient);
                tracing::error!(recipient = %recipient, error = %e, "failed to render message");
                e
            })?;

            let content = if self.normalize {
                normalize(&rendered)
            } else {
                rendered
            };
            messages.insert(recipient.clone(), content);
        }

        tracing::info!(message_count = messages.len(), "rendered messages");
        Ok(messages)
    }
}

/// Renders every recipient with default options.
///
/// # Errors
///
/// See [`Pipeline::prepare`] and [`MessageBatch::render`].
pub fn run<D>(template: impl Read, data: impl Read, decoder: &D) -> Result<RenderedMessages>
where
    D: Decoder + ?Sized,
{
    Pipeline::new().run(template, data, decoder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{decode_json, decode_yaml, DecoderRegistry};
    use crate::error::RenderError;

    const PEOPLE: &str = r#"{"alice": {"name": "Alice"}, "bob": {"name": "Bob"}}"#;

    #[test]
    fn test_run_renders_every_recipient() {
        let messages = run("Hello {{.name}}!".as_bytes(), PEOPLE.as_bytes(), &decode_json).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages["alice"], "Hello Alice!");
        assert_eq!(messages["bob"], "Hello Bob!");
    }

    #[test]
    fn test_run_with_registry_decoder() {
        let registry = DecoderRegistry::new();
        let decoder = registry.lookup("people.yml").unwrap();
        let data = "alice:\n  name: Alice\n";
        let messages = run("Hi {{.name}}".as_bytes(), data.as_bytes(), decoder.as_ref()).unwrap();
        assert_eq!(messages["alice"], "Hi Alice");
    }

    #[test]
    fn test_missing_field_aborts_run() {
        let err = run(
            "Hello {{.name}}! Your email is {{.email}}".as_bytes(),
            r#"{"alice": {"name": "Alice"}}"#.as_bytes(),
            &decode_json,
        )
        .unwrap_err();

        match err {
            RenderError::MissingPlaceholder { field, recipient } => {
                assert_eq!(field, "email");
                assert_eq!(recipient.as_deref(), Some("alice"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_one_bad_recipient_fails_everything() {
        let data = r#"{"alice": {"name": "Alice"}, "bob": {"nick": "B"}}"#;
        let err = run("{{.name}}".as_bytes(), data.as_bytes(), &decode_json).unwrap_err();
        assert!(err.is_missing_placeholder());
        assert!(err.to_string().contains("'bob'"));
    }

    #[test]
    fn test_syntax_error_before_decoding() {
        // the data is malformed too; compile runs first
        let err = run("{{.name".as_bytes(), "{".as_bytes(), &decode_json).unwrap_err();
        assert!(err.is_syntax_error());
    }

    #[test]
    fn test_decode_failure() {
        let err = run("{{.name}}".as_bytes(), "alice: [".as_bytes(), &decode_yaml).unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_empty_data_yields_empty_map() {
        let messages = run("Hello {{.name}}!".as_bytes(), "{}".as_bytes(), &decode_json).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_unreadable_template_is_io_error() {
        let bytes: &[u8] = &[0xff, 0xfe];
        let err = run(bytes, PEOPLE.as_bytes(), &decode_json).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }

    #[test]
    fn test_normalization_applied() {
        let messages =
            run("Hi {{.name}}\nBye".as_bytes(), PEOPLE.as_bytes(), &decode_json).unwrap();
        assert_eq!(messages["alice"], "Hi Alice<br>Bye");
    }

    #[test]
    fn test_raw_option_skips_normalization() {
        let pipeline = Pipeline::with_options(RenderOptions::new().with_normalize(false));
        let messages = pipeline
            .run("Hi {{.name}}\nBye".as_bytes(), PEOPLE.as_bytes(), &decode_json)
            .unwrap();
        assert_eq!(messages["alice"], "Hi Alice\nBye");
    }

    #[test]
    fn test_jinja_syntax() {
        let pipeline = Pipeline::with_options(RenderOptions::new().with_syntax(Syntax::Jinja));
        let messages = pipeline
            .run("Hello {{ name }}!".as_bytes(), PEOPLE.as_bytes(), &decode_json)
            .unwrap();
        assert_eq!(messages["bob"], "Hello Bob!");
    }

    #[test]
    fn test_batch_introspection() {
        let batch = MessageBatch::prepare(
            "{{.greeting}} {{.name}}".as_bytes(),
            PEOPLE.as_bytes(),
            &decode_json,
        )
        .unwrap();

        assert_eq!(batch.recipient_count(), 2);
        assert_eq!(
            batch.placeholders().into_iter().collect::<Vec<_>>(),
            vec!["greeting", "name"]
        );
        assert_eq!(batch.recipients().into_iter().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert!(batch.render().unwrap_err().is_missing_placeholder());
    }

    #[test]
    fn test_render_options_serde() {
        let options: RenderOptions = serde_json::from_str(r#"{"syntax": "jinja"}"#).unwrap();
        assert_eq!(options, RenderOptions::new().with_syntax(Syntax::Jinja));
    }
}
