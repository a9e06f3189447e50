use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// A record's field mapping, in the store's native attribute representation.
///
/// `Item` is the single intermediate form between typed records and the store:
/// records are turned into an `Item` for key derivation and writes, and rows
/// returned by the store come back as `Item`s before being materialized.
///
/// # Attribute conversion
///
/// Conversion from and to typed values is delegated to `serde_dynamo`, which
/// maps `String` to `S`, integers and floats to `N`, `bool` to `BOOL` and
/// `Option::None` to `NULL`.
///
/// # Example
///
/// ```
/// use dynamo_single_table::dynamodb::Item;
///
/// let item = Item::new()
///     .set_string("user_id", "12345")
///     .set_string("username", "johndoe")
///     .set_number("age", 30.0);
/// assert_eq!(item.get_number("age"), Some(30.0));
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    pub(crate) attributes: HashMap<String, AttributeValue>,
}

/// Key-relevant view of a single attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    String(&'a str),
    /// Decimal text exactly as the store encodes it.
    Number(&'a str),
    Bool(bool),
    /// Present but without a value (`NULL`, what `None` serializes to).
    Absent,
    /// Any attribute kind that cannot take part in a key.
    Unsupported(&'static str),
}

impl<'a> From<&'a AttributeValue> for FieldValue<'a> {
    fn from(value: &'a AttributeValue) -> Self {
        match value {
            AttributeValue::S(s) => FieldValue::String(s),
            AttributeValue::N(n) => FieldValue::Number(n),
            AttributeValue::Bool(b) => FieldValue::Bool(*b),
            AttributeValue::Null(_) => FieldValue::Absent,
            AttributeValue::B(_) => FieldValue::Unsupported("binary"),
            AttributeValue::L(_) => FieldValue::Unsupported("list"),
            AttributeValue::M(_) => FieldValue::Unsupported("map"),
            AttributeValue::Ss(_) | AttributeValue::Ns(_) | AttributeValue::Bs(_) => {
                FieldValue::Unsupported("set")
            }
            _ => FieldValue::Unsupported("unknown"),
        }
    }
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a typed value into an `Item`.
    pub fn from_record<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let attributes: HashMap<String, AttributeValue> = serde_dynamo::to_item(value)?;
        Ok(Self { attributes })
    }

    /// Deserializes the item into a typed value. Attributes the type does not
    /// declare (derived keys, the type attribute) are ignored.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_dynamo::from_item(self.attributes)?)
    }

    /// Sets a string attribute.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_string(key, value);
        self
    }

    /// Sets a number attribute.
    pub fn set_number(mut self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        self.insert(key, AttributeValue::N(value.into().to_string()));
        self
    }

    /// Inserts a raw attribute, replacing any previous value under that name.
    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }

    pub fn insert_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, AttributeValue::S(value.into()));
    }

    /// Copies every attribute of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: Item) {
        self.attributes.extend(other.attributes);
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns the key-relevant view of an attribute, `None` if the attribute
    /// is not in the item at all.
    pub fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.attributes.get(key).map(FieldValue::from)
    }

    /// Gets the value of an attribute as a string.
    ///
    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&String> {
        self.attributes.get(key).and_then(|av| av.as_s().ok())
    }

    /// Gets the value of an attribute as a number (f64).
    ///
    /// Returns `None` if the attribute doesn't exist, is not a number, or can't be parsed as f64.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Self { attributes }
    }
}
