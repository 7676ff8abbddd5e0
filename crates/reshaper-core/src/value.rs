//! Dynamically typed payload flowing through paths and filter chains
//!
//! A [`Value`] is either a scalar (null, bool, integer, float, text), an
//! absolute instant, an ordered list or an insertion ordered map. It converts
//! losslessly from `serde_json::Value`, so decoded JSON or YAML documents can
//! be fed to a transformer directly.
//!
//! The coercion helpers in this module ([`Value::truthy`], [`Value::to_integer`],
//! [`Value::to_float`], [`Value::to_text`]) define the host casting rules the
//! built-in filters rely on.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Insertion ordered mapping used for nested objects
pub type Map = IndexMap<String, Value>;

/// Universal value type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Absolute instant carrying the offset it was resolved in
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Empty map value
    pub fn map() -> Self {
        Value::Map(Map::new())
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a map
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// True for lists and maps without entries
    pub fn is_empty_container(&self) -> bool {
        match self {
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Host truthiness: null, false, zero, `""`, `"0"` and empty containers are false
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !(s.is_empty() || s == "0"),
            Value::DateTime(_) => true,
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Integer cast, truncating toward zero
    ///
    /// Text contributes its leading numeric prefix (`"12abc"` is 12, `"abc"` is 0).
    pub fn to_integer(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => i64::from(*b),
            Value::Integer(i) => *i,
            // `as` saturates and maps NaN to zero
            Value::Float(f) => f.trunc() as i64,
            Value::String(s) => {
                let prefix = numeric_prefix(s).trim_start();
                if prefix.contains(['.', 'e', 'E']) {
                    prefix.parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0)
                } else {
                    prefix
                        .parse::<i64>()
                        .or_else(|_| prefix.parse::<f64>().map(|f| f as i64))
                        .unwrap_or(0)
                }
            }
            Value::DateTime(dt) => dt.timestamp(),
            Value::List(items) => i64::from(!items.is_empty()),
            Value::Map(map) => i64::from(!map.is_empty()),
        }
    }

    /// Floating point cast
    pub fn to_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Integer(i) => *i as f64,
            Value::Float(f) => *f,
            Value::String(s) => numeric_prefix(s).trim_start().parse::<f64>().unwrap_or(0.0),
            Value::DateTime(dt) => dt.timestamp() as f64,
            Value::List(items) => f64::from(u8::from(!items.is_empty())),
            Value::Map(map) => f64::from(u8::from(!map.is_empty())),
        }
    }

    /// Text cast; containers have no text form
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::DateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

/// Longest prefix of `text` that reads as a decimal number
///
/// Leading whitespace is part of the prefix; an empty prefix means the text
/// is not numeric at all.
pub(crate) fn numeric_prefix(text: &str) -> &str {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    let re = NUMERIC.get_or_init(|| {
        Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("numeric prefix pattern is valid")
    });
    re.find(text).map(|m| m.as_str()).unwrap_or("")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::Value::from(self.clone());
        write!(f, "{}", json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_shape_and_order() {
        let value = Value::from(json!({"b": 1, "a": [true, null, 2.5], "c": "x"}));
        let map = value.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(map["b"], Value::Integer(1));
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Bool(true), Value::Null, Value::Float(2.5)])
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::from("0").truthy());
        assert!(!Value::from("").truthy());
        assert!(!Value::from(0.0).truthy());
        assert!(!Value::List(vec![]).truthy());
        assert!(Value::from("1").truthy());
        assert!(Value::from("false").truthy());
        assert!(Value::from(-1).truthy());
    }

    #[test]
    fn test_integer_cast() {
        assert_eq!(Value::from("2").to_integer(), 2);
        assert_eq!(Value::from(" 12abc").to_integer(), 12);
        assert_eq!(Value::from("3.9").to_integer(), 3);
        assert_eq!(Value::from("1e3").to_integer(), 1000);
        assert_eq!(Value::from("abc").to_integer(), 0);
        assert_eq!(Value::from(-3.9).to_integer(), -3);
        assert_eq!(Value::from(f64::NAN).to_integer(), 0);
        assert_eq!(Value::from(true).to_integer(), 1);
    }

    #[test]
    fn test_float_cast() {
        assert_eq!(Value::from("3.14 apples").to_float(), 3.14);
        assert_eq!(Value::from(".5").to_float(), 0.5);
        assert_eq!(Value::from("-2e2").to_float(), -200.0);
        assert_eq!(Value::from("x1").to_float(), 0.0);
    }

    #[test]
    fn test_text_cast() {
        assert_eq!(Value::from(3.0).to_text().as_deref(), Some("3"));
        assert_eq!(Value::from(3.14159).to_text().as_deref(), Some("3.14159"));
        assert_eq!(Value::from(false).to_text().as_deref(), Some(""));
        assert_eq!(Value::map().to_text(), None);

        let dt = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 1, 24, 15, 45, 30)
            .unwrap();
        assert_eq!(
            Value::from(dt).to_text().as_deref(),
            Some("2021-01-24T15:45:30+01:00")
        );
    }

    #[test]
    fn test_deserialize_untagged() {
        let value: Value = serde_json::from_str(r#"{"n": null, "i": 7, "f": 1.5, "s": "x"}"#).unwrap();
        assert_eq!(value.get("n"), Some(&Value::Null));
        assert_eq!(value.get("i"), Some(&Value::Integer(7)));
        assert_eq!(value.get("f"), Some(&Value::Float(1.5)));
        assert_eq!(value.get("s"), Some(&Value::from("x")));
    }

    #[test]
    fn test_collect_into_map() {
        let value: Value = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(value.to_string(), r#"{"a":1,"b":2}"#);
    }
}
