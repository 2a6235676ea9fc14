//! Output formatting for rendered messages.
//!
//! [`OutputMode`] decides how the preview is printed. Text mode is meant for
//! people: a bold recipient header followed by the message. The structured
//! modes serialize the whole batch at once so the output stays a single valid
//! document.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use console::style;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Controls how messages are printed.
///
/// This is the user-facing enum for the `--output` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Recipient header plus message, styled when stdout is a terminal
    #[default]
    Text,
    /// Pretty-printed JSON object, recipient to message
    Json,
    /// YAML mapping, recipient to message
    Yaml,
    /// Two columns: recipient, message
    Csv,
}

impl OutputMode {
    /// Returns true for modes that serialize the batch as one document.
    pub fn is_structured(&self) -> bool {
        !matches!(self, OutputMode::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Text => "text",
            OutputMode::Json => "json",
            OutputMode::Yaml => "yaml",
            OutputMode::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown output mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output mode '{0}' (expected text, json, yaml or csv)")]
pub struct UnknownOutputMode(pub String);

impl FromStr for OutputMode {
    type Err = UnknownOutputMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(OutputMode::Text),
            "json" => Ok(OutputMode::Json),
            "yaml" | "yml" => Ok(OutputMode::Yaml),
            "csv" => Ok(OutputMode::Csv),
            _ => Err(UnknownOutputMode(s.to_string())),
        }
    }
}

/// One rendered message, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub recipient: String,
    pub message: String,
}

/// Writes one text-mode entry.
///
/// Entries after the first are separated by a blank line.
pub fn write_text_entry<W: Write>(
    writer: &mut W,
    recipient: &str,
    content: &str,
    first: bool,
) -> Result<(), OutputError> {
    if !first {
        writeln!(writer)?;
    }
    writeln!(writer, "{}", style(recipient).bold())?;
    writeln!(writer, "{}", content)?;
    Ok(())
}

/// Writes `rows` in `mode`, in the order given.
pub fn write_messages<W: Write>(
    writer: &mut W,
    rows: &[MessageRow],
    mode: OutputMode,
) -> Result<(), OutputError> {
    match mode {
        OutputMode::Text => {
            for (i, row) in rows.iter().enumerate() {
                write_text_entry(writer, &row.recipient, &row.message, i == 0)?;
            }
        }
        OutputMode::Json => {
            let map = OrderedMap(rows);
            serde_json::to_writer_pretty(&mut *writer, &map)?;
            writeln!(writer)?;
        }
        OutputMode::Yaml => {
            let map = OrderedMap(rows);
            serde_yaml::to_writer(&mut *writer, &map)?;
        }
        OutputMode::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *writer);
            wtr.write_record(["recipient", "message"])?;
            for row in rows {
                wtr.write_record([row.recipient.as_str(), row.message.as_str()])?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

/// Serializes rows as a map, in row order.
struct OrderedMap<'a>(&'a [MessageRow]);

impl Serialize for OrderedMap<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for row in self.0 {
            map.serialize_entry(&row.recipient, &row.message)?;
        }
        map.end()
    }
}
