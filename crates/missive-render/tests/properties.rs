//! Property tests for the normalizer and placeholder templates.

use missive_render::normalize::{classify, normalize, ContentKind};
use missive_render::template::PlaceholderTemplate;
use missive_render::FieldMap;
use proptest::prelude::*;

// Text that cannot contain a markup marker: no '<' at all.
fn plain_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?\r\n\t]{0,64}"
}

fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,12}"
}

// Values may contain braces and newlines; they are never re-parsed.
fn field_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 {}.\n]{0,24}"
}

fn marker_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("<b>"),
        Just("</b>"),
        Just("<i>"),
        Just("</i>"),
        Just("<p>"),
        Just("</p>"),
        Just("<br>"),
        Just("</a>"),
        Just("<a href=\"https://example.com\">"),
    ]
}

proptest! {
    #[test]
    fn test_plain_text_has_no_line_feeds_after_normalize(text in plain_text_strategy()) {
        let out = normalize(&text);
        prop_assert!(!out.contains('\n'));
        prop_assert_eq!(out.matches("<br>").count(), text.matches('\n').count());
        prop_assert_eq!(out.matches('\r').count(), text.matches('\r').count());
    }

    #[test]
    fn test_markup_is_returned_unchanged(
        before in plain_text_strategy(),
        marker in marker_strategy(),
        after in plain_text_strategy(),
    ) {
        let text = format!("{}{}{}", before, marker, after);
        prop_assert_eq!(classify(&text), ContentKind::Markup);
        prop_assert_eq!(normalize(&text), text);
    }

    #[test]
    fn test_normalize_is_idempotent(text in plain_text_strategy()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_compile_is_idempotent(
        prefix in plain_text_strategy(),
        name in field_name_strategy(),
        value in field_value_strategy(),
    ) {
        let source = format!("{}{{{{.{}}}}}", prefix, name);
        let first = PlaceholderTemplate::compile(&source).unwrap();
        let second = PlaceholderTemplate::compile(&source).unwrap();

        let fields = FieldMap::from([(name, value)]);
        prop_assert_eq!(first.render(&fields).unwrap(), second.render(&fields).unwrap());
    }

    #[test]
    fn test_placeholder_substitution(
        name in field_name_strategy(),
        value in field_value_strategy(),
        text in "[a-zA-Z0-9 .,]{0,32}",
    ) {
        let source = format!("{}{{{{ .{} }}}}{}", text, name, text);
        let template = PlaceholderTemplate::compile(&source).unwrap();
        let fields = FieldMap::from([(name.clone(), value.clone())]);
        prop_assert_eq!(template.render(&fields).unwrap(), format!("{}{}{}", text, value, text));
        prop_assert!(template.placeholders().contains(&name));
    }

    #[test]
    fn test_absent_field_always_fails(
        name in field_name_strategy(),
        other in field_name_strategy(),
    ) {
        prop_assume!(name != other);
        let template = PlaceholderTemplate::compile(&format!("{{{{.{}}}}}", name)).unwrap();
        let fields = FieldMap::from([(other, "x".to_string())]);
        prop_assert!(template.render(&fields).unwrap_err().is_missing_placeholder());
    }
}
