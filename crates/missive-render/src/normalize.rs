//! Content normalization for rich-text chat surfaces.
//!
//! The receiving surface accepts a small HTML subset and ignores bare line
//! feeds. A rendered message is therefore classified as a whole:
//!
//! - If it contains any recognized markup tag it is sent unchanged. The author
//!   controls layout, and the line feeds between paragraphs are kept as-is.
//! - Otherwise it is plain text, and every `\n` becomes `<br>`.
//!
//! Recognized markers: `<i>`, `</i>`, `<b>`, `</b>`, `<p>`, `</p>`, `<br>`,
//! `</a>` and `<a href="...">`. Detection is a fixed regular expression, not an
//! HTML parser. A message mixing one tag with plain line breaks gets no
//! conversion at all.
//!
//! Carriage returns are never touched, so a CRLF line ending becomes `\r<br>`.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"</?[ibp]>|<br>|<a\s+href="[^"]*">|</a>"#).expect("markup pattern compiles")
});

/// How a rendered message was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Contains at least one recognized tag; sent verbatim.
    Markup,
    /// No recognized tag; line feeds are converted.
    PlainText,
}

/// Classifies `text` as markup or plain text.
///
/// ```rust
/// use missive_render::normalize::{classify, ContentKind};
///
/// assert_eq!(classify("<b>hi</b>"), ContentKind::Markup);
/// assert_eq!(classify(r#"see <a href="https://example.com">this</a>"#), ContentKind::Markup);
/// assert_eq!(classify("<div>hi</div>"), ContentKind::PlainText);
/// ```
pub fn classify(text: &str) -> ContentKind {
    if MARKUP_PATTERN.is_match(text) {
        ContentKind::Markup
    } else {
        ContentKind::PlainText
    }
}

/// Normalizes a rendered message for delivery.
///
/// ```rust
/// use missive_render::normalize::normalize;
///
/// assert_eq!(normalize("Line 1\nLine 2"), "Line 1<br>Line 2");
/// assert_eq!(normalize("<p>One</p>\n<p>Two</p>"), "<p>One</p>\n<p>Two</p>");
/// ```
pub fn normalize(rendered: &str) -> String {
    match classify(rendered) {
        ContentKind::Markup => rendered.to_string(),
        ContentKind::PlainText => rendered.replace('\n', "<br>"),
    }
}
