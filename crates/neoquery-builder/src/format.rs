//! Rendering of property maps into query text.
//!
//! Two layouts share one quoting rule: numbers (and strings that parse as
//! finite numbers), booleans and `null` go in bare, other strings are
//! double-quoted, and [`PropertyValue::Reference`] is written bare as a
//! placeholder name.

use crate::types::{Properties, PropertyValue};

/// Layout selected by the separator passed to [`prepare_parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout<'a> {
    /// `{k: v, ...}` for node and relationship patterns.
    PropertyMap,
    /// `prefix.k = v, ...` for SET lists. The prefix includes the dot.
    Assignment(&'a str),
}

impl<'a> Layout<'a> {
    fn from_separator(separator: &'a str) -> Option<Self> {
        if separator == ":" {
            Some(Self::PropertyMap)
        } else if separator.contains('.') {
            Some(Self::Assignment(separator))
        } else {
            None
        }
    }
}

/// Renders `props` with the layout picked by `separator`.
///
/// `":"` gives a brace-delimited map literal, a separator containing `"."`
/// gives an assignment list prefixed by it. Any other separator renders
/// nothing.
pub(crate) fn prepare_parameter(separator: &str, props: &Properties) -> String {
    let Some(layout) = Layout::from_separator(separator) else {
        tracing::debug!(separator, "unknown parameter separator, nothing rendered");
        return String::new();
    };

    let items: Vec<String> = props
        .iter()
        .map(|(key, value)| {
            let value = render_value(value);
            match layout {
                Layout::PropertyMap => format!("{key}: {value}"),
                Layout::Assignment(prefix) => format!("{prefix}{key} = {value}"),
            }
        })
        .collect();

    match layout {
        Layout::PropertyMap => format!("{{{}}}", items.join(", ")),
        Layout::Assignment(_) => items.join(", "),
    }
}

/// Renders a single value using the shared quoting rule.
pub fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Reference(name) => name.clone(),
        PropertyValue::Literal(json) => render_json(json),
    }
}

fn render_json(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if is_numeric(s) => s.trim().to_owned(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_json).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", render_json(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn is_numeric(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_map_quotes_strings_only() {
        let props = Properties::new().with("name", "Gabi").with("age", 30);
        assert_eq!(prepare_parameter(":", &props), r#"{name: "Gabi", age: 30}"#);
    }

    #[test]
    fn numeric_strings_render_bare() {
        let props = Properties::new().with("zip", "01234").with("ratio", "1.5");
        assert_eq!(prepare_parameter(":", &props), "{zip: 01234, ratio: 1.5}");
    }

    #[test]
    fn non_finite_words_stay_quoted() {
        let props = Properties::new().with("a", "NaN").with("b", "inf").with("c", "");
        assert_eq!(
            prepare_parameter(":", &props),
            r#"{a: "NaN", b: "inf", c: ""}"#
        );
    }

    #[test]
    fn references_render_bare() {
        let props = Properties::new()
            .with("title", "Note")
            .with_reference("owner", "u");
        assert_eq!(prepare_parameter(":", &props), r#"{title: "Note", owner: u}"#);
    }

    #[test]
    fn assignment_layout_uses_prefix() {
        let props = Properties::new().with("found", true).with("name", "Gabi");
        assert_eq!(
            prepare_parameter("u.", &props),
            r#"u.found = true, u.name = "Gabi""#
        );
    }

    #[test]
    fn empty_map_renders_braces() {
        assert_eq!(prepare_parameter(":", &Properties::new()), "{}");
        assert_eq!(prepare_parameter("u.", &Properties::new()), "");
    }

    #[test]
    fn unknown_separator_renders_nothing() {
        let props = Properties::new().with("a", 1);
        assert_eq!(prepare_parameter("=", &props), "");
    }

    #[test]
    fn nested_values_and_escaping() {
        let value = PropertyValue::from(json!({"tags": ["a", 2], "q": "say \"hi\""}));
        assert_eq!(
            render_value(&value),
            r#"{q: "say \"hi\"", tags: ["a", 2]}"#
        );
    }
}
