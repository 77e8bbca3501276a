//! Rendering values back to script text.
//!
//! JSON has no regular-expression literal, so rendering is done in two
//! passes: every [`RegExpLiteral`] is first replaced by a sentinel string,
//! the tree is pretty-printed as JSON, and the quoted sentinels are then
//! substituted back to bare `/pattern/flags` literals.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    error::Result,
    value::{JsValue, RegExpLiteral},
};

const SENTINEL_OPEN: &str = "__REGEXP ";
const SENTINEL_CLOSE: &str = " REGEXP__";

// Every `"` inside a JSON string is escaped, so the closing ` REGEXP__"`
// only matches at the end of a wrapped literal, whatever the pattern holds.
static SENTINEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""__REGEXP (.*?) REGEXP__""#).expect("sentinel pattern is valid")
});

fn wrap(re: &RegExpLiteral) -> serde_json::Value {
    serde_json::Value::String(format!("{SENTINEL_OPEN}{re}{SENTINEL_CLOSE}"))
}

/// Undoes the JSON string escaping applied to a wrapped literal.
///
/// Only `\\` and `\"` are reversed; a regular-expression literal cannot
/// contain the raw control characters JSON would escape otherwise.
fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\\' | '"')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Renders `value` as pretty-printed literal text, regular expressions
/// included.
pub fn to_literal_string(value: &JsValue) -> Result<String> {
    let json = value.to_json_with(&wrap);
    let text = serde_json::to_string_pretty(&json)?;
    let restored = SENTINEL.replace_all(&text, |caps: &Captures| unescape(&caps[1]));
    Ok(restored.into_owned())
}

/// Renders `name = <value>;`, the form a script-loading consumer evaluates.
pub fn to_assignment_string(name: &str, value: &JsValue) -> Result<String> {
    Ok(format!("{name} = {};", to_literal_string(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse_assignment, value::JsObject};

    fn sample() -> JsValue {
        let mut tags = JsObject::new();
        tags.insert("amd", JsValue::RegExp(RegExpLiteral::new(r"\.js$", "")));
        tags.insert(
            "copyOnly",
            JsValue::from(vec![JsValue::RegExp(RegExpLiteral::new(
                r#"^widgets\/[^/]+\/"x"\\d"#,
                "i",
            ))]),
        );
        let mut root = JsObject::new();
        root.insert("basePath", JsValue::from("./"));
        root.insert("resourceTags", JsValue::Object(tags));
        JsValue::Object(root)
    }

    #[test]
    fn test_regexp_rendered_unquoted() {
        let text = to_assignment_string("profile", &sample()).unwrap();
        assert!(text.starts_with("profile = {\n  \"basePath\": \"./\","));
        assert!(text.ends_with("};"));
        assert!(text.contains(r#""amd": /\.js$/"#), "{text}");
        assert!(text.contains(r#"/^widgets\/[^/]+\/"x"\\d/i"#), "{text}");
        assert!(!text.contains("__REGEXP"));
    }

    #[test]
    fn test_rendered_text_parses_back_to_regexp() {
        let original = sample();
        let text = to_assignment_string("profile", &original).unwrap();
        let (name, reparsed) = parse_assignment(&text).unwrap();

        assert_eq!(name.as_deref(), Some("profile"));
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_pattern_containing_sentinel_text() {
        let tricky = RegExpLiteral::new(r#"x REGEXP__"y"#, "g");
        let mut root = JsObject::new();
        root.insert("first", JsValue::RegExp(tricky));
        root.insert("second", JsValue::RegExp(RegExpLiteral::new("__REGEXP z", "")));
        let original = JsValue::Object(root);

        let text = to_literal_string(&original).unwrap();
        assert!(text.contains(r#""first": /x REGEXP__"y/g,"#), "{text}");
        assert!(text.contains(r#""second": /__REGEXP z/"#), "{text}");
        assert_eq!(crate::parse::parse(&text).unwrap(), original);
    }

    #[test]
    fn test_plain_strings_untouched() {
        let value = JsValue::from(vec!["a\\b", "say \"hi\""]);
        let text = to_literal_string(&value).unwrap();
        assert_eq!(text, "[\n  \"a\\\\b\",\n  \"say \\\"hi\\\"\"\n]");
    }
}
