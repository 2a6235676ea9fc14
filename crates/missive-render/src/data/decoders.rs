//! Built-in decoders for JSON, YAML and TOML data files.
//!
//! Each decoder is a thin wrapper over the format's serde deserializer. No
//! semantic checks are applied beyond what deserializing into [`RecipientData`]
//! enforces: a top-level mapping of mappings with string values.

use std::io::Read;

use super::RecipientData;
use crate::error::{RenderError, Result};

/// Decodes a JSON object of recipient objects.
pub fn decode_json(reader: &mut dyn Read) -> Result<RecipientData> {
    tracing::debug!("decoding json data");
    let data: RecipientData = serde_json::from_reader(reader).map_err(|e| {
        tracing::error!(error = %e, "failed to decode json data");
        RenderError::decode("json", e)
    })?;
    tracing::debug!(recipient_count = data.len(), "decoded json data");
    Ok(data)
}

/// Decodes a YAML mapping of recipient mappings.
///
/// Registered for both `yaml` and `yml`.
pub fn decode_yaml(reader: &mut dyn Read) -> Result<RecipientData> {
    tracing::debug!("decoding yaml data");
    let data: RecipientData = serde_yaml::from_reader(reader).map_err(|e| {
        tracing::error!(error = %e, "failed to decode yaml data");
        RenderError::decode("yaml", e)
    })?;
    tracing::debug!(recipient_count = data.len(), "decoded yaml data");
    Ok(data)
}

/// Decodes a TOML document whose top-level tables are recipients.
///
/// The toml parser works on complete documents, so the stream is read fully
/// before parsing. Input that is not UTF-8 is a decode failure.
pub fn decode_toml(reader: &mut dyn Read) -> Result<RecipientData> {
    tracing::debug!("decoding toml data");
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let text = std::str::from_utf8(&bytes).map_err(|e| RenderError::decode("toml", e))?;
    let data: RecipientData = toml::from_str(text).map_err(|e| {
        tracing::error!(error = %e, "failed to decode toml data");
        RenderError::decode("toml", e)
    })?;
    tracing::debug!(recipient_count = data.len(), "decoded toml data");
    Ok(data)
}
