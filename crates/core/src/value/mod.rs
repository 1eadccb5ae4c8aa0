//! Attribute values and items.
//!
//! `Value` mirrors the document types the store understands. Items are ordered
//! maps so that two items with the same attributes compare equal regardless of
//! the order the store returned them in.

mod number;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

pub use number::{Number, NumberError, MAX_PRECISION};

/// An item: attribute name to value.
pub type Item = BTreeMap<String, Value>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// String.
    S(String),
    /// Exact decimal number.
    N(Number),
    /// Boolean.
    Bool(bool),
    /// Null.
    Null,
    /// Ordered list of values.
    L(Vec<Value>),
    /// Nested map.
    M(Item),
    /// String set.
    Ss(BTreeSet<String>),
    /// Number set.
    Ns(BTreeSet<Number>),
}

impl Value {
    /// Checks every number in the value, including nested ones, against the
    /// store's limits.
    pub fn check_numbers(&self) -> Result<(), NumberError> {
        match self {
            Value::N(n) => n.check_range(),
            Value::L(items) => items.iter().try_for_each(Value::check_numbers),
            Value::M(map) => map.values().try_for_each(Value::check_numbers),
            Value::Ns(set) => set.iter().try_for_each(Number::check_range),
            Value::S(_) | Value::Bool(_) | Value::Null | Value::Ss(_) => Ok(()),
        }
    }

    /// Parses a decimal literal into a number value.
    pub fn number(text: &str) -> Result<Self, NumberError> {
        text.parse().map(Value::N)
    }

    /// Short type descriptor as used by the store (`S`, `N`, `M`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::S(_) => "S",
            Value::N(_) => "N",
            Value::Bool(_) => "BOOL",
            Value::Null => "NULL",
            Value::L(_) => "L",
            Value::M(_) => "M",
            Value::Ss(_) => "SS",
            Value::Ns(_) => "NS",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::N(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Item> {
        match self {
            Value::M(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::L(l) => Some(l),
            _ => None,
        }
    }

    /// Converts a JSON document into a value.
    ///
    /// JSON numbers are taken from their source text, so with
    /// `arbitrary_precision` enabled `3.5` never passes through `f64`.
    pub fn from_json(json: serde_json::Value) -> Result<Self, NumberError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::N(n.to_string().parse()?),
            serde_json::Value::String(s) => Value::S(s),
            serde_json::Value::Array(items) => Value::L(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => Value::M(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::from_json(v)?)))
                    .collect::<Result<_, NumberError>>()?,
            ),
        })
    }

    /// Converts the value into a plain JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::S(s) => serde_json::Value::String(s.clone()),
            Value::N(n) => number_to_json(n),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
            Value::L(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::M(map) => item_to_json(map),
            Value::Ss(set) => serde_json::Value::Array(
                set.iter().cloned().map(serde_json::Value::String).collect(),
            ),
            Value::Ns(set) => serde_json::Value::Array(set.iter().map(number_to_json).collect()),
        }
    }
}

/// Converts an item into a JSON object.
pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::Value::Object(
        item.iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

fn number_to_json(n: &Number) -> serde_json::Value {
    let text = n.to_string();
    match text.parse::<serde_json::Number>() {
        Ok(number) => serde_json::Value::Number(number),
        Err(_) => serde_json::Value::String(text),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::S(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::S(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::N(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::N(Number::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::N(Number::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::N(Number::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::L(value)
    }
}

impl From<Item> for Value {
    fn from(value: Item) -> Self {
        Value::M(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_numbers_finds_nested_out_of_range() {
        let mut info = Item::new();
        info.insert("rating".to_string(), Value::N(Number::from_scaled(1, 200)));
        let value = Value::L(vec![Value::from(1), Value::M(info)]);
        assert!(matches!(
            value.check_numbers(),
            Err(NumberError::OutOfRange(_))
        ));

        assert_eq!(Value::N(Number::from_scaled(35, 1)).check_numbers(), Ok(()));
    }

    #[test]
    fn test_from_json_keeps_decimals_exact() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"rating": 6.2, "rank": 11, "tiny": 0.1}"#).unwrap();

        let value = Value::from_json(json).unwrap();
        let map = value.as_map().unwrap();

        assert_eq!(map["rating"], Value::number("6.2").unwrap());
        assert_eq!(map["rank"], Value::from(11));
        assert_eq!(map["tiny"].as_number().unwrap().to_string(), "0.1");
    }

    #[test]
    fn test_from_json_nested_structures() {
        let json = serde_json::json!({
            "actors": ["Daniel Bruhl", "Chris Hemsworth"],
            "release": null,
            "running": true,
        });

        let value = Value::from_json(json).unwrap();
        let map = value.as_map().unwrap();

        assert_eq!(
            map["actors"],
            Value::L(vec!["Daniel Bruhl".into(), "Chris Hemsworth".into()])
        );
        assert_eq!(map["release"], Value::Null);
        assert_eq!(map["running"], Value::Bool(true));
    }

    #[test]
    fn test_to_json_prints_numbers_exactly() {
        let mut info = Item::new();
        info.insert("rating".to_string(), Value::number("3.5").unwrap());
        info.insert("plot".to_string(), "How you doing ?".into());

        let json = serde_json::to_string(&Value::M(info)).unwrap();

        assert_eq!(json, r#"{"plot":"How you doing ?","rating":3.5}"#);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from("x").type_name(), "S");
        assert_eq!(Value::from(1).type_name(), "N");
        assert_eq!(Value::Null.type_name(), "NULL");
        assert_eq!(Value::M(Item::new()).type_name(), "M");
        assert_eq!(Value::Ss(BTreeSet::new()).type_name(), "SS");
    }
}
