//! Error types for message rendering.
//!
//! This module provides [`RenderError`], the single error type returned by every
//! stage of the pipeline: decoder lookup, data decoding, template compilation and
//! per-recipient rendering. No stage recovers locally; the first failure is
//! returned to the caller and the run produces no messages.

use std::io;

/// Boxed error produced by a format-specific deserializer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;

/// Error type for rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No decoder is registered for the data file's extension.
    #[error(
        "no decoder registered for extension .{extension} (supported: {})",
        .supported.join(", ")
    )]
    UnsupportedFormat {
        /// The normalized extension that was queried.
        extension: String,
        /// Registered format keys, sorted.
        supported: Vec<String>,
    },

    /// The data source is not a well-formed instance of its format.
    #[error("failed to decode {format} data: {source}")]
    DataDecodeFailed {
        /// Format key of the decoder that failed (e.g. `"yaml"`).
        format: String,
        /// The underlying parser error.
        #[source]
        source: BoxError,
    },

    /// The template source is not valid template syntax.
    #[error("template syntax error at line {line}, column {column}: {message}")]
    TemplateSyntax {
        /// 1-based line of the offending action.
        line: usize,
        /// 1-based column of the offending action.
        column: usize,
        message: String,
    },

    /// The template references a field the recipient's data does not supply.
    #[error("{}", missing_message(.field, .recipient.as_deref()))]
    MissingPlaceholder {
        field: String,
        /// Filled in by the pipeline once the failing recipient is known.
        recipient: Option<String>,
    },

    /// Reading a template or data stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn missing_message(field: &str, recipient: Option<&str>) -> String {
    match recipient {
        Some(recipient) => format!(
            "field '{}' is missing from the data for recipient '{}'",
            field, recipient
        ),
        None => format!("field '{}' is missing from the data", field),
    }
}

impl RenderError {
    /// Creates a decode failure for `format`, boxing the parser error.
    pub fn decode(format: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RenderError::DataDecodeFailed {
            format: format.into(),
            source: source.into(),
        }
    }

    /// Creates a syntax error at the given 1-based position.
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        RenderError::TemplateSyntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates a missing-field error without recipient context.
    pub fn missing(field: impl Into<String>) -> Self {
        RenderError::MissingPlaceholder {
            field: field.into(),
            recipient: None,
        }
    }

    /// Attaches the recipient identifier to a [`RenderError::MissingPlaceholder`].
    ///
    /// Other variants are returned unchanged.
    pub fn with_recipient(self, recipient: &str) -> Self {
        match self {
            RenderError::MissingPlaceholder { field, .. } => RenderError::MissingPlaceholder {
                field,
                recipient: Some(recipient.to_string()),
            },
            other => other,
        }
    }

    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, RenderError::UnsupportedFormat { .. })
    }

    pub fn is_decode_failure(&self) -> bool {
        matches!(self, RenderError::DataDecodeFailed { .. })
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(self, RenderError::TemplateSyntax { .. })
    }

    pub fn is_missing_placeholder(&self) -> bool {
        matches!(self, RenderError::MissingPlaceholder { .. })
    }
}
