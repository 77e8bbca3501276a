//! The literal value tree.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;

use crate::error::{Error, Result};

/// A JavaScript object-literal value.
///
/// This is `serde_json::Value` plus a first-class regular-expression
/// variant, which JSON cannot express.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsValue>),
    Object(JsObject),
    RegExp(RegExpLiteral),
}

/// A regular-expression literal, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegExpLiteral {
    pub pattern: String,
    pub flags: String,
}

impl RegExpLiteral {
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Compiles the literal with the `regex` crate.
    ///
    /// `i`, `m` and `s` map to inline flags. `g`, `y` and `u` only affect
    /// how JavaScript iterates matches and are ignored. Anything else is
    /// rejected.
    pub fn to_regex(&self) -> Result<regex::Regex> {
        let mut inline = String::new();
        for flag in self.flags.chars() {
            match flag {
                'i' | 'm' | 's' => inline.push(flag),
                'g' | 'y' | 'u' => {}
                _ => {
                    return Err(Error::UnsupportedFlag {
                        pattern: self.pattern.clone(),
                        flag,
                    });
                }
            }
        }
        let source = if inline.is_empty() {
            self.pattern.clone()
        } else {
            format!("(?{inline}){}", self.pattern)
        };
        regex::Regex::new(&source).map_err(|source| Error::InvalidRegExp {
            pattern: self.pattern.clone(),
            source,
        })
    }
}

impl std::fmt::Display for RegExpLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

/// An object literal whose keys keep their source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsObject {
    entries: Vec<(String, JsValue)>,
}

impl JsObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&JsValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsValue> {
        let i = self.position(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Inserts `value` under `key`.
    ///
    /// An existing key keeps its position and the previous value is
    /// returned, matching property assignment on a JavaScript object.
    pub fn insert(&mut self, key: impl Into<String>, value: JsValue) -> Option<JsValue> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<JsValue> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    /// Returns the value under `key`, inserting the result of `default` first
    /// when the key is absent.
    pub fn entry_or_insert_with(
        &mut self,
        key: &str,
        default: impl FnOnce() -> JsValue,
    ) -> &mut JsValue {
        let i = match self.position(key) {
            Some(i) => i,
            None => {
                self.entries.push((key.to_string(), default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl FromIterator<(String, JsValue)> for JsObject {
    fn from_iter<I: IntoIterator<Item = (String, JsValue)>>(iter: I) -> Self {
        let mut obj = JsObject::new();
        for (k, v) in iter {
            obj.insert(k, v);
        }
        obj
    }
}

impl JsValue {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            JsValue::Null => "null",
            JsValue::Bool(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Array(_) => "array",
            JsValue::Object(_) => "object",
            JsValue::RegExp(_) => "regexp",
        }
    }

    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut JsObject> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<JsValue>> {
        match self {
            JsValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<JsValue>> {
        match self {
            JsValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_regexp(&self) -> Option<&RegExpLiteral> {
        match self {
            JsValue::RegExp(re) => Some(re),
            _ => None,
        }
    }

    /// Like [`JsValue::as_object`], but reports the actual type on mismatch.
    pub fn expect_object(&self) -> Result<&JsObject> {
        self.as_object()
            .ok_or_else(|| Error::shape("object", self.kind()))
    }

    pub fn expect_object_mut(&mut self) -> Result<&mut JsObject> {
        let kind = self.kind();
        self.as_object_mut()
            .ok_or_else(|| Error::shape("object", kind))
    }

    /// Converts to JSON, rendering regular expressions as their literal text.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_with(&|re| serde_json::Value::String(re.to_string()))
    }

    pub(crate) fn to_json_with(
        &self,
        regexp: &dyn Fn(&RegExpLiteral) -> serde_json::Value,
    ) -> serde_json::Value {
        use serde_json::Value;
        match self {
            JsValue::Null => Value::Null,
            JsValue::Bool(b) => Value::Bool(*b),
            JsValue::Number(n) => Value::Number(n.clone()),
            JsValue::String(s) => Value::String(s.clone()),
            JsValue::Array(items) => {
                Value::Array(items.iter().map(|v| v.to_json_with(regexp)).collect())
            }
            JsValue::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json_with(regexp)))
                    .collect(),
            ),
            JsValue::RegExp(re) => regexp(re),
        }
    }
}

impl From<serde_json::Value> for JsValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => JsValue::Null,
            Value::Bool(b) => JsValue::Bool(b),
            Value::Number(n) => JsValue::Number(n),
            Value::String(s) => JsValue::String(s),
            Value::Array(items) => JsValue::Array(items.into_iter().map(JsValue::from).collect()),
            Value::Object(map) => JsValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Bool(b)
    }
}

impl From<RegExpLiteral> for JsValue {
    fn from(re: RegExpLiteral) -> Self {
        JsValue::RegExp(re)
    }
}

impl From<JsObject> for JsValue {
    fn from(obj: JsObject) -> Self {
        JsValue::Object(obj)
    }
}

impl<T: Into<JsValue>> From<Vec<T>> for JsValue {
    fn from(items: Vec<T>) -> Self {
        JsValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for JsValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            JsValue::Null => serializer.serialize_unit(),
            JsValue::Bool(b) => serializer.serialize_bool(*b),
            JsValue::Number(n) => n.serialize(serializer),
            JsValue::String(s) => serializer.serialize_str(s),
            JsValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsValue::Object(obj) => {
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            JsValue::RegExp(re) => serializer.collect_str(re),
        }
    }
}
