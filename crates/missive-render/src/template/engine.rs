//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait which lets the pipeline
//! compile message templates with different backends. The default is
//! [`PlaceholderEngine`], which understands `{{.field}}` substitution only.
//! [`MiniJinjaEngine`](super::MiniJinjaEngine) accepts Jinja syntax with the
//! same strict handling of undefined fields.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::jinja::MiniJinjaEngine;
use super::placeholder::PlaceholderTemplate;
use crate::data::FieldMap;
use crate::error::Result;

/// A template that has been parsed and is ready to render.
pub trait CompiledTemplate: Send + Sync {
    /// Renders the template against one recipient's fields.
    ///
    /// Fails with [`RenderError::MissingPlaceholder`](crate::RenderError::MissingPlaceholder)
    /// when a referenced field is absent.
    fn render(&self, fields: &FieldMap) -> Result<String>;

    /// Field names the template references.
    fn placeholders(&self) -> BTreeSet<String>;
}

/// A template backend.
///
/// Engines are stateless factories: everything a render needs lives in the
/// returned [`CompiledTemplate`].
pub trait TemplateEngine: Send + Sync {
    /// Parses `source`, failing with
    /// [`RenderError::TemplateSyntax`](crate::RenderError::TemplateSyntax).
    fn compile(&self, source: &str) -> Result<Box<dyn CompiledTemplate>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// The `{{.field}}` engine.
///
/// # Example
///
/// ```rust
/// use missive_render::data::FieldMap;
/// use missive_render::template::{PlaceholderEngine, TemplateEngine};
///
/// let template = PlaceholderEngine.compile("Order #{{.order}}").unwrap();
/// let fields = FieldMap::from([("order".to_string(), "42".to_string())]);
/// assert_eq!(template.render(&fields).unwrap(), "Order #42");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEngine;

impl CompiledTemplate for PlaceholderTemplate {
    fn render(&self, fields: &FieldMap) -> Result<String> {
        PlaceholderTemplate::render(self, fields)
    }

    fn placeholders(&self) -> BTreeSet<String> {
        PlaceholderTemplate::placeholders(self)
    }
}

impl TemplateEngine for PlaceholderEngine {
    fn compile(&self, source: &str) -> Result<Box<dyn CompiledTemplate>> {
        Ok(Box::new(PlaceholderTemplate::compile(source)?))
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

/// Selects the template syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `{{.field}}` placeholders.
    #[default]
    Placeholder,
    /// Jinja expressions, `{{ field }}`.
    Jinja,
}

impl Syntax {
    /// All syntaxes, in declaration order.
    pub const ALL: [Syntax; 2] = [Syntax::Placeholder, Syntax::Jinja];

    /// Returns the engine implementing this syntax.
    pub fn engine(self) -> Box<dyn TemplateEngine> {
        match self {
            Syntax::Placeholder => Box::new(PlaceholderEngine),
            Syntax::Jinja => Box::new(MiniJinjaEngine::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Syntax::Placeholder => "placeholder",
            Syntax::Jinja => "jinja",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown syntax name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template syntax '{0}' (expected 'placeholder' or 'jinja')")]
pub struct UnknownSyntax(pub String);

impl FromStr for Syntax {
    type Err = UnknownSyntax;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "placeholder" => Ok(Syntax::Placeholder),
            "jinja" | "minijinja" => Ok(Syntax::Jinja),
            _ => Err(UnknownSyntax(s.to_string())),
        }
    }
}
