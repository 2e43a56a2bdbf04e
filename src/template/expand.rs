//! Placeholder substitution against an attribute map

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

use super::lexer::{lex, Span, Token};
use crate::attributes::AttributeMap;

/// Errors that can occur while expanding a templated string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// A placeholder names an attribute absent from the attribute map
    #[error("unresolved attribute '{name}'")]
    UnresolvedAttribute {
        name: String,
        text: String,
        span: Span,
    },

    /// Placeholder delimiters that do not form a valid placeholder
    #[error("malformed placeholder: {message}")]
    MalformedPlaceholder {
        message: String,
        text: String,
        span: Span,
    },
}

impl TemplateError {
    fn malformed(message: &str, text: &str, span: Span) -> Self {
        Self::MalformedPlaceholder {
            message: message.to_string(),
            text: text.to_string(),
            span,
        }
    }

    /// The templated text the error refers to
    pub fn text(&self) -> &str {
        match self {
            Self::UnresolvedAttribute { text, .. } | Self::MalformedPlaceholder { text, .. } => {
                text
            }
        }
    }

    /// Byte range of the offending placeholder
    pub fn span(&self) -> &Span {
        match self {
            Self::UnresolvedAttribute { span, .. } | Self::MalformedPlaceholder { span, .. } => {
                span
            }
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// `filename` labels the report, typically the graph field being expanded.
    /// Output is plain text so it can be logged or captured.
    pub fn format(&self, filename: &str) -> String {
        let text = self.text();
        let span = char_span(text, self.span());
        let label = match self {
            Self::UnresolvedAttribute { name, .. } => {
                format!("attribute '{}' is not defined", name)
            }
            Self::MalformedPlaceholder { message, .. } => message.clone(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(text)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// ariadne labels count characters, not bytes
fn char_span(text: &str, span: &Span) -> Span {
    let start = text.get(..span.start).map_or(0, |s| s.chars().count());
    let len = text.get(span.clone()).map_or(0, |s| s.chars().count());
    start..start + len
}

/// A piece of a templated string
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder { name: &'a str, span: Span },
}

/// Split text into literal runs and placeholders
fn segments(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut out = Vec::new();
    // Start offset of the currently open placeholder and its inner text
    let mut open: Option<(usize, Option<Span>)> = None;

    for (token, span) in lex(text) {
        match (open.take(), token) {
            (None, Token::Open) => open = Some((span.start, None)),
            (None, _) => out.push(Segment::Text(&text[span])),
            (Some((start, _)), Token::Text) => open = Some((start, Some(span))),
            (Some((start, inner)), Token::Close) => {
                let full = start..span.end;
                let raw = inner.map_or("", |s| text[s].trim());
                let name = raw.strip_prefix('.').unwrap_or(raw);
                if name.is_empty() {
                    return Err(TemplateError::malformed("empty placeholder", text, full));
                }
                if name.chars().any(char::is_whitespace) {
                    return Err(TemplateError::malformed(
                        "placeholder must name a single attribute",
                        text,
                        full,
                    ));
                }
                out.push(Segment::Placeholder { name, span: full });
            }
            (Some((start, _)), Token::Open | Token::Brace) => {
                return Err(TemplateError::malformed(
                    "unexpected brace inside placeholder",
                    text,
                    start..span.end,
                ));
            }
        }
    }

    if let Some((start, _)) = open {
        return Err(TemplateError::malformed(
            "unterminated placeholder",
            text,
            start..text.len(),
        ));
    }

    Ok(out)
}

/// Expand every `{{attribute}}` placeholder in `text`
///
/// Substitution is a single pass: placeholder syntax inside substituted values
/// is copied through untouched. The first missing attribute aborts the whole
/// expansion.
///
/// # Example
///
/// ```rust
/// use graph_template::{template, AttributeMap};
///
/// let attrs: AttributeMap = [("env", "prod")].into_iter().collect();
/// assert_eq!(template::expand("{{env}} load", &attrs).unwrap(), "prod load");
/// assert!(template::expand("{{host}}", &attrs).is_err());
/// ```
pub fn expand(text: &str, attrs: &AttributeMap) -> Result<String, TemplateError> {
    let segments = segments(text)?;
    if !segments
        .iter()
        .any(|s| matches!(s, Segment::Placeholder { .. }))
    {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    for segment in segments {
        match segment {
            Segment::Text(s) => out.push_str(s),
            Segment::Placeholder { name, span } => {
                let value = attrs
                    .render(name)
                    .ok_or_else(|| TemplateError::UnresolvedAttribute {
                        name: name.to_string(),
                        text: text.to_string(),
                        span,
                    })?;
                out.push_str(&value);
            }
        }
    }
    Ok(out)
}

/// List the attribute names referenced by `text`, in order of first use
pub fn referenced_attributes(text: &str) -> Result<Vec<String>, TemplateError> {
    let mut names: Vec<String> = Vec::new();
    for segment in segments(text)? {
        if let Segment::Placeholder { name, .. } = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_expand_single_placeholder() {
        assert_eq!(expand("{{x}}", &attrs(&[("x", "5")])).unwrap(), "5");
    }

    #[test]
    fn test_expand_missing_attribute() {
        let err = expand("{{x}}", &AttributeMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnresolvedAttribute {
                name: "x".to_string(),
                text: "{{x}}".to_string(),
                span: 0..5,
            }
        );
    }

    #[test]
    fn test_expand_mixed_text() {
        let a = attrs(&[("env", "prod"), ("host", "web1")]);
        assert_eq!(
            expand("{{env}}.{{ host }}.cpu-{{.env}}", &a).unwrap(),
            "prod.web1.cpu-prod"
        );
    }

    #[test]
    fn test_expand_aborts_on_first_missing() {
        let err = expand("{{a}} {{b}} {{c}}", &attrs(&[("a", "1")])).unwrap_err();
        assert!(matches!(err, TemplateError::UnresolvedAttribute { ref name, .. } if name == "b"));
    }

    #[test]
    fn test_expand_is_single_pass() {
        let a = attrs(&[("a", "{{b}}"), ("b", "2")]);
        assert_eq!(expand("{{a}}", &a).unwrap(), "{{b}}");
    }

    #[test]
    fn test_expand_non_string_values() {
        let mut a = AttributeMap::new();
        a.insert("port", 8080);
        assert_eq!(expand("port {{port}}", &a).unwrap(), "port 8080");
    }

    #[test]
    fn test_single_braces_are_text() {
        assert_eq!(expand("a{b}c", &AttributeMap::new()).unwrap(), "a{b}c");
        assert_eq!(expand("}}", &AttributeMap::new()).unwrap(), "}}");
    }

    #[test]
    fn test_malformed_placeholders() {
        let empty = AttributeMap::new();
        for text in ["{{", "x {{env", "{{}}", "{{ }}", "{{a b}}", "{{a{b}}"] {
            assert!(
                matches!(expand(text, &empty), Err(TemplateError::MalformedPlaceholder { .. })),
                "expected malformed error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_referenced_attributes() {
        let names = referenced_attributes("{{env}}.{{host}}.{{env}}").unwrap();
        assert_eq!(names, vec!["env".to_string(), "host".to_string()]);
        assert!(referenced_attributes("plain").unwrap().is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = expand("{{env}} load", &AttributeMap::new()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"unresolved attribute 'env'");
    }

    #[test]
    fn test_error_format_mentions_attribute() {
        let err = expand("cpu of {{host}}", &AttributeMap::new()).unwrap_err();
        let report = err.format("series.origin");
        assert!(report.contains("series.origin"));
        assert!(report.contains("attribute 'host' is not defined"));
    }

    #[test]
    fn test_char_span_multibyte() {
        assert_eq!(char_span("é{{x}}", &(2..7)), 1..6);
    }

    proptest! {
        #[test]
        fn prop_text_without_placeholders_unchanged(text in "[^{}]*") {
            let a = attrs(&[("x", "1")]);
            prop_assert_eq!(expand(&text, &a).unwrap(), text);
        }
    }
}
