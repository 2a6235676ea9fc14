//! MiniJinja backend.
//!
//! The environment is configured so rendering stays strict: any undefined
//! variable is an error rather than an empty string, and a trailing newline in
//! the template survives rendering. Output is never HTML-escaped; markup
//! decisions belong to the normalizer.
//!
//! Every variable the template mentions must be present in the recipient's
//! fields before rendering starts, even one the template guards itself with
//! `{% if x is defined %}` or `{{ x|default('d') }}`. Such guards never take
//! effect; a missing `x` fails with [`RenderError::MissingPlaceholder`].
//!
//! Failures other than undefined values, such as `{{ name + 1 }}` on a string
//! field, surface as [`RenderError::TemplateSyntax`] pointing at the failing
//! expression, whether MiniJinja raised them while parsing or while rendering.

use std::collections::BTreeSet;

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};

use super::engine::{CompiledTemplate, TemplateEngine};
use crate::data::FieldMap;
use crate::error::{RenderError, Result};

const TEMPLATE_NAME: &str = "message";

/// Functions MiniJinja provides to every template; never data fields.
const BUILTIN_GLOBALS: &[&str] = &["debug", "dict", "namespace", "range"];

/// Template engine backed by MiniJinja.
///
/// # Example
///
/// ```rust
/// use missive_render::data::FieldMap;
/// use missive_render::template::{MiniJinjaEngine, TemplateEngine};
///
/// let template = MiniJinjaEngine::new().compile("Hi {{ name }}\n").unwrap();
/// let fields = FieldMap::from([("name".to_string(), "Bob".to_string())]);
/// assert_eq!(template.render(&fields).unwrap(), "Hi Bob\n");
///
/// let err = template.render(&FieldMap::new()).unwrap_err();
/// assert!(err.is_missing_placeholder());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniJinjaEngine;

impl MiniJinjaEngine {
    pub fn new() -> Self {
        Self
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn compile(&self, source: &str) -> Result<Box<dyn CompiledTemplate>> {
        let mut env = Self::environment();
        env.add_template_owned(TEMPLATE_NAME, source.to_string())
            .map_err(|err| syntax_error(source, err))?;

        let placeholders = env
            .get_template(TEMPLATE_NAME)
            .map_err(|err| syntax_error(source, err))?
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !BUILTIN_GLOBALS.contains(&name.as_str()))
            .collect();

        Ok(Box::new(JinjaTemplate {
            env,
            source: source.to_string(),
            placeholders,
        }))
    }

    fn name(&self) -> &'static str {
        "minijinja"
    }
}

/// A compiled MiniJinja template.
pub struct JinjaTemplate {
    env: Environment<'static>,
    source: String,
    placeholders: BTreeSet<String>,
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

impl CompiledTemplate for JinjaTemplate {
    fn render(&self, fields: &FieldMap) -> Result<String> {
        if let Some(field) = self
            .placeholders
            .iter()
            .find(|name| !fields.contains_key(*name))
        {
            return Err(RenderError::missing(field.as_str()));
        }

        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|err| syntax_error(&self.source, err))?;

        template.render(fields).map_err(|err| {
            if err.kind() == ErrorKind::UndefinedError {
                // e.g. an attribute lookup on a flat string value
                let field = failing_expression(&self.source, &err)
                    .map(str::to_string)
                    .unwrap_or_else(|| message(&err));
                RenderError::missing(field)
            } else {
                syntax_error(&self.source, err)
            }
        })
    }

    fn placeholders(&self) -> BTreeSet<String> {
        self.placeholders.clone()
    }
}

/// Source text of the expression `err` points at.
fn failing_expression<'a>(source: &'a str, err: &minijinja::Error) -> Option<&'a str> {
    let expr = source.get(err.range()?)?.trim();
    (!expr.is_empty()).then_some(expr)
}

fn message(err: &minijinja::Error) -> String {
    err.detail()
        .map(str::to_string)
        .unwrap_or_else(|| err.kind().to_string())
}

fn syntax_error(source: &str, err: minijinja::Error) -> RenderError {
    let (line, column) = match err.range().filter(|range| range.start <= source.len()) {
        Some(range) => {
            let before = source.get(..range.start).unwrap_or_default();
            let line_start = before.rfind('\n').map_or(0, |i| i + 1);
            (
                before.matches('\n').count() + 1,
                before[line_start..].chars().count() + 1,
            )
        }
        None => (err.line().unwrap_or(1), 1),
    };
    RenderError::syntax(line, column, message(&err))
}
