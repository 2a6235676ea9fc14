//! Placeholder templates: `{{.field}}` substitution with strict lookups.
//!
//! # Syntax
//!
//! - `{{.name}}` - replaced by the recipient's `name` field. Whitespace inside
//!   the braces is ignored: `{{ .name }}` is equivalent.
//! - `{{/* note */}}` - a comment; renders nothing. The comment must start
//!   and end at the delimiters (`{{- /* note */ -}}` with trim markers) and
//!   may contain `}}`.
//! - `{{- ` and ` -}}` - trim markers. A dash followed by whitespace right after
//!   `{{` removes all whitespace before the action; whitespace followed by a
//!   dash right before `}}` removes all whitespace after it.
//!
//! Anything else inside `{{ }}` is rejected at compile time: control flow,
//! pipelines, bare identifiers, nested paths such as `{{.user.name}}`. An
//! unclosed `{{` and a stray `}}` outside an action are syntax errors too.
//!
//! # Strictness
//!
//! Rendering never substitutes a blank. A field the template references but the
//! recipient's map lacks fails with [`RenderError::MissingPlaceholder`].

use std::collections::BTreeSet;

use crate::data::FieldMap;
use crate::error::{RenderError, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

const KEYWORDS: &[&str] = &[
    "block", "break", "continue", "define", "else", "end", "if", "range", "template", "with",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A parsed placeholder template.
///
/// Compiling is the only step that inspects the source; the result is immutable
/// and can be rendered any number of times, from any thread.
///
/// ```rust
/// use missive_render::data::FieldMap;
/// use missive_render::template::PlaceholderTemplate;
///
/// let template = PlaceholderTemplate::compile("Hello {{.name}}!").unwrap();
///
/// let mut fields = FieldMap::new();
/// fields.insert("name".into(), "Alice".into());
/// assert_eq!(template.render(&fields).unwrap(), "Hello Alice!");
///
/// let err = template.render(&FieldMap::new()).unwrap_err();
/// assert!(err.is_missing_placeholder());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTemplate {
    segments: Vec<Segment>,
    text_len: usize,
}

impl PlaceholderTemplate {
    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TemplateSyntax`] with the 1-based position of the
    /// offending action.
    pub fn compile(source: &str) -> Result<Self> {
        let segments = parse(source)?;
        let text_len = segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.len(),
                Segment::Field(_) => 0,
            })
            .sum();

        Ok(Self { segments, text_len })
    }

    /// Substitutes every placeholder with its value from `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingPlaceholder`] for the first referenced field
    /// that `fields` does not contain.
    pub fn render(&self, fields: &FieldMap) -> Result<String> {
        let mut output = String::with_capacity(self.text_len);

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Field(name) => match fields.get(name) {
                    Some(value) => output.push_str(value),
                    None => return Err(RenderError::missing(name.as_str())),
                },
            }
        }

        Ok(output)
    }

    /// Distinct field names referenced by the template.
    pub fn placeholders(&self) -> BTreeSet<String> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Field(name) => Some(name.clone()),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// True when the template renders to an empty string for every recipient.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// What an action between `{{` and `}}` does.
#[derive(Debug, PartialEq, Eq)]
enum ActionKind {
    Field(String),
    Comment,
}

#[derive(Debug, PartialEq, Eq)]
struct Action {
    kind: ActionKind,
    trim_before: bool,
    trim_after: bool,
}

fn is_trim_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn trim_start_space(text: &str) -> &str {
    text.trim_start_matches(is_trim_space)
}

fn trim_end_space(text: &str) -> &str {
    text.trim_end_matches(is_trim_space)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl Action {
    /// Parses the text between the delimiters.
    fn parse(raw: &str) -> std::result::Result<Self, String> {
        let mut body = raw;

        let trim_before = body.starts_with('-') && body[1..].starts_with(is_trim_space);
        if trim_before {
            body = &body[1..];
        }

        let trim_after = body.len() > 1
            && body.ends_with('-')
            && body[..body.len() - 1].ends_with(is_trim_space);
        if trim_after {
            body = &body[..body.len() - 1];
        }

        let body = body.trim_matches(is_trim_space);
        let kind = Self::parse_body(body)?;

        Ok(Self {
            kind,
            trim_before,
            trim_after,
        })
    }

    fn parse_body(body: &str) -> std::result::Result<ActionKind, String> {
        if body.is_empty() {
            return Err("empty action".to_string());
        }

        if body.starts_with(COMMENT_OPEN) {
            return Err("comment must start and end at the delimiters".to_string());
        }

        if let Some(name) = body.strip_prefix('.') {
            if name.is_empty() {
                return Err("'{{.}}' is not supported; name a field such as {{.name}}".to_string());
            }
            if name.contains(|c: char| is_trim_space(c) || c == '|') {
                return Err(format!("pipelines and arguments are not supported in '{}'", body));
            }
            if name.contains('.') {
                return Err(format!("nested field access '{}' is not supported", body));
            }
            if !is_identifier(name) {
                return Err(format!("invalid field name '{}'", name));
            }
            return Ok(ActionKind::Field(name.to_string()));
        }

        let word = body.split(is_trim_space).next().unwrap_or(body);
        if KEYWORDS.contains(&word) {
            return Err(format!("'{}' actions are not supported", word));
        }

        Err(format!(
            "unsupported action '{}'; placeholders take the form {{{{.field}}}}",
            body
        ))
    }
}

/// Length of the opening of a comment action whose body starts `body`, and
/// whether it carries a trim marker.
fn comment_open(body: &str) -> Option<(usize, bool)> {
    if body.starts_with(COMMENT_OPEN) {
        return Some((COMMENT_OPEN.len(), false));
    }
    let mut chars = body.strip_prefix('-')?.chars();
    chars.next().filter(|c| is_trim_space(*c))?;
    chars
        .as_str()
        .starts_with(COMMENT_OPEN)
        .then_some((2 + COMMENT_OPEN.len(), true))
}

/// Parses a comment action whose text starts at `text_start`, returning it
/// with the offset just past its closing delimiter.
fn parse_comment(
    source: &str,
    action_start: usize,
    text_start: usize,
    trim_before: bool,
) -> Result<(Action, usize)> {
    let text_len = source[text_start..]
        .find(COMMENT_CLOSE)
        .ok_or_else(|| syntax_error(source, action_start, "unclosed comment"))?;
    let after = text_start + text_len + COMMENT_CLOSE.len();
    let rest = &source[after..];

    let (trim_after, close_len) = if rest.starts_with(CLOSE) {
        (false, CLOSE.len())
    } else {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if is_trim_space(c) && chars.as_str().starts_with("-}}") => {
                (true, 2 + CLOSE.len())
            }
            _ => {
                return Err(syntax_error(
                    source,
                    action_start,
                    "comment ends before closing delimiter",
                ))
            }
        }
    };

    let action = Action {
        kind: ActionKind::Comment,
        trim_before,
        trim_after,
    };
    Ok((action, after + close_len))
}

/// Converts a byte offset into a 1-based (line, column) pair.
fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn syntax_error(source: &str, offset: usize, message: impl Into<String>) -> RenderError {
    let (line, column) = position(source, offset);
    RenderError::syntax(line, column, message)
}

fn flush(segments: &mut Vec<Segment>, pending: &mut String) {
    if !pending.is_empty() {
        segments.push(Segment::Text(std::mem::take(pending)));
    }
}

fn parse(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut trim_next = false;
    let mut pos = 0;

    loop {
        let rest = &source[pos..];
        let open = rest.find(OPEN);

        if let Some(stray) = rest.find(CLOSE) {
            if open.map_or(true, |open| stray < open) {
                return Err(syntax_error(
                    source,
                    pos + stray,
                    "unexpected \"}}\" outside of an action",
                ));
            }
        }

        let Some(open) = open else {
            let text = if trim_next { trim_start_space(rest) } else { rest };
            pending.push_str(text);
            break;
        };

        let action_start = pos + open;
        let body_start = action_start + OPEN.len();

        let (action, next) = match comment_open(&source[body_start..]) {
            Some((skip, trim_before)) => {
                parse_comment(source, action_start, body_start + skip, trim_before)?
            }
            None => {
                let body_len = source[body_start..]
                    .find(CLOSE)
                    .ok_or_else(|| syntax_error(source, action_start, "unclosed action"))?;
                let body_end = body_start + body_len;
                let action = Action::parse(&source[body_start..body_end])
                    .map_err(|message| syntax_error(source, action_start, message))?;
                (action, body_end + CLOSE.len())
            }
        };

        let mut text = &rest[..open];
        if trim_next {
            text = trim_start_space(text);
        }
        if action.trim_before {
            text = trim_end_space(text);
        }
        pending.push_str(text);

        if let ActionKind::Field(name) = action.kind {
            flush(&mut segments, &mut pending);
            segments.push(Segment::Field(name));
        }

        trim_next = action.trim_after;
        pos = next;
    }

    flush(&mut segments, &mut pending);
    Ok(segments)
}
