//! Composite key derivation.
//!
//! A [`KeyRule`] turns an ordered list of [`FieldSpec`]s into one key string:
//!
//! - a literal spec (`"!TAG"`) contributes `TAG` verbatim;
//! - a field spec (`"date"`) contributes the field name followed by its value,
//!   so `date` = `d1` becomes `date#d1`.
//!
//! Parts are joined with [`KEY_DELIMITER`]. A field that is present but has no
//! value (`NULL`, i.e. a `None` on the record) ends the rule early; this is how
//! key objects with only their leading fields set produce sort key prefixes for
//! `begins_with` queries.
//!
//! Numbers are used as the store encodes them, without padding, so numeric key
//! parts only sort numerically when callers format them to a fixed width.
//!
//! ```
//! use dynamo_single_table::dynamodb::Item;
//! use dynamo_single_table::keys::{derive_keys, KeyRule};
//!
//! let rules = [KeyRule::new("PK", ["k1"]), KeyRule::new("SK", ["!TAG", "k2", "k1"])];
//! let record = Item::new().set_string("k1", "a1").set_string("k2", "a2");
//!
//! let keys = derive_keys(&rules, &record).unwrap();
//! assert_eq!(keys["PK"], "k1#a1");
//! assert_eq!(keys["SK"], "TAG#k2#a2#k1#a1");
//! ```

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use crate::dynamodb::{FieldValue, Item};
use crate::error::{DaoError, Result};

pub const KEY_DELIMITER: char = '#';
pub const LITERAL_MARKER: char = '!';

/// One entry of a key rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Emitted as-is, without looking at the record.
    Literal(String),
    /// Looked up in the record; emitted as `name#value`.
    Field(String),
}

impl FieldSpec {
    /// Parses the string form: a leading `!` marks a literal.
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix(LITERAL_MARKER) {
            Some(literal) => FieldSpec::Literal(literal.to_string()),
            None => FieldSpec::Field(spec.to_string()),
        }
    }
}

impl From<&str> for FieldSpec {
    fn from(spec: &str) -> Self {
        FieldSpec::parse(spec)
    }
}

/// Builds the value of one key attribute from an ordered list of specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRule {
    attribute: String,
    specs: Vec<FieldSpec>,
}

impl KeyRule {
    pub fn new<I, S>(attribute: impl Into<String>, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldSpec>,
    {
        Self {
            attribute: attribute.into(),
            specs: specs.into_iter().map(Into::into).collect(),
        }
    }

    /// The attribute this rule writes to.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Derives the composite key string for `record`.
    pub fn derive(&self, record: &Item) -> Result<String> {
        let mut parts: Vec<String> = Vec::with_capacity(self.specs.len() * 2);

        for spec in &self.specs {
            let field = match spec {
                FieldSpec::Literal(text) => {
                    parts.push(text.clone());
                    continue;
                }
                FieldSpec::Field(field) => field,
            };

            let value = match record.field(field) {
                None => return Err(DaoError::MissingField(field.clone())),
                // First valueless field truncates the key here, leaving a
                // prefix of the full key. Later specs are not even checked.
                Some(FieldValue::Absent) => break,
                Some(FieldValue::String(s)) => s.to_string(),
                Some(FieldValue::Number(n)) => n.to_string(),
                Some(FieldValue::Bool(b)) => b.to_string(),
                Some(FieldValue::Unsupported(kind)) => {
                    return Err(DaoError::UnsupportedKeyValue {
                        field: field.clone(),
                        kind,
                    })
                }
            };

            if value.contains(KEY_DELIMITER) {
                return Err(DaoError::DelimiterInValue {
                    field: field.clone(),
                    delimiter: KEY_DELIMITER,
                });
            }
            parts.push(field.clone());
            parts.push(value);
        }

        Ok(parts.join(KEY_DELIMITER.to_string().as_str()))
    }

    /// Fails with `MissingPartitionKey` unless the leading spec yields a value.
    /// Used for partition rules, where an empty identity cannot address anything.
    pub fn ensure_identity(&self, record: &Item) -> Result<()> {
        let missing = || DaoError::MissingPartitionKey {
            attribute: self.attribute.clone(),
        };
        match self.specs.first() {
            None => Err(missing()),
            Some(FieldSpec::Literal(_)) => Ok(()),
            Some(FieldSpec::Field(field)) => match record.field(field) {
                None => Err(DaoError::MissingField(field.clone())),
                Some(FieldValue::Absent) => Err(missing()),
                Some(_) => Ok(()),
            },
        }
    }
}

/// Derives every rule's key for `record`, keyed by target attribute.
pub fn derive_keys(rules: &[KeyRule], record: &Item) -> Result<HashMap<String, String>> {
    rules
        .iter()
        .map(|rule| -> Result<(String, String)> {
            Ok((rule.attribute.clone(), rule.derive(record)?))
        })
        .collect()
}

/// Partition and sort key specs of a record type, plus fixed attributes that
/// are merged into every record of that type before keys are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRuleSet {
    partition: Vec<FieldSpec>,
    sort: Vec<FieldSpec>,
    fixed: Item,
}

impl KeyRuleSet {
    pub fn new<P, S>(partition: P, sort: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<FieldSpec>,
        S: IntoIterator,
        S::Item: Into<FieldSpec>,
    {
        Self {
            partition: partition.into_iter().map(Into::into).collect(),
            sort: sort.into_iter().map(Into::into).collect(),
            fixed: Item::new(),
        }
    }

    /// Adds a constant attribute. It is stored with every record and can be
    /// referenced from either spec list like any other field.
    pub fn with_fixed(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.fixed.insert(name, value);
        self
    }

    pub fn partition(&self) -> &[FieldSpec] {
        &self.partition
    }

    pub fn sort(&self) -> &[FieldSpec] {
        &self.sort
    }

    pub fn fixed(&self) -> &Item {
        &self.fixed
    }

    /// Binds the spec lists to concrete key attributes.
    pub fn into_rules(self, partition_key: &str, sort_key: &str) -> (KeyRule, KeyRule, Item) {
        (
            KeyRule {
                attribute: partition_key.to_string(),
                specs: self.partition,
            },
            KeyRule {
                attribute: sort_key.to_string(),
                specs: self.sort,
            },
            self.fixed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_rules() -> Vec<KeyRule> {
        vec![
            KeyRule::new("pk", ["k1"]),
            KeyRule::new("sk", ["!TAG", "k2", "k1"]),
        ]
    }

    #[test]
    fn test_parse_field_specs() {
        assert_eq!(FieldSpec::parse("!TAG"), FieldSpec::Literal("TAG".into()));
        assert_eq!(FieldSpec::parse("date"), FieldSpec::Field("date".into()));
        assert_eq!(FieldSpec::parse("!"), FieldSpec::Literal(String::new()));
    }

    #[test]
    fn test_literal_then_field_pairs() {
        let record = Item::new().set_string("k1", "a1").set_string("k2", "a2");
        let keys = derive_keys(&tag_rules(), &record).unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys["pk"], "k1#a1");
        assert_eq!(keys["sk"], "TAG#k2#a2#k1#a1");
    }

    #[test]
    fn test_absent_value_truncates_rule() {
        let mut record = Item::new().set_string("k1", "a1");
        record.insert("k2", AttributeValue::Null(true));

        let keys = derive_keys(&tag_rules(), &record).unwrap();
        assert_eq!(keys["pk"], "k1#a1");
        assert_eq!(keys["sk"], "TAG");
    }

    #[test]
    fn test_truncation_skips_later_missing_fields() {
        let rule = KeyRule::new("sk", ["!Foo", "date", "never_supplied"]);
        let mut record = Item::new();
        record.insert("date", AttributeValue::Null(true));

        assert_eq!(rule.derive(&record).unwrap(), "Foo");
    }

    #[test]
    fn test_missing_field_fails() {
        let record = Item::new().set_string("k1", "a1");
        let err = derive_keys(&tag_rules(), &record).unwrap_err();
        assert!(matches!(err, DaoError::MissingField(ref f) if f == "k2"));
    }

    #[test]
    fn test_literal_only_rule_ignores_record() {
        let rule = KeyRule::new("sk", ["!META", "!v1"]);
        assert_eq!(rule.derive(&Item::new()).unwrap(), "META#v1");
    }

    #[test]
    fn test_numbers_and_booleans_are_stringified() {
        let mut record = Item::new().set_number("n", 12.0);
        record.insert("b", AttributeValue::Bool(false));
        record.insert("i", AttributeValue::N("7".into()));

        let rule = KeyRule::new("sk", ["i", "n", "b"]);
        assert_eq!(rule.derive(&record).unwrap(), "i#7#n#12#b#false");
    }

    #[test]
    fn test_delimiter_in_value_is_rejected() {
        let record = Item::new().set_string("k1", "a#1");
        let err = KeyRule::new("pk", ["k1"]).derive(&record).unwrap_err();
        assert!(matches!(err, DaoError::DelimiterInValue { ref field, .. } if field == "k1"));
    }

    #[test]
    fn test_collection_values_are_rejected() {
        let mut record = Item::new();
        record.insert("tags", AttributeValue::Ss(vec!["a".into()]));
        let err = KeyRule::new("pk", ["tags"]).derive(&record).unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedKeyValue { kind: "set", .. }));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let record = Item::new()
            .set_string("k1", "a1")
            .set_string("k2", "a2")
            .set_string("unused", "x");
        let first = derive_keys(&tag_rules(), &record).unwrap();
        for _ in 0..10 {
            assert_eq!(derive_keys(&tag_rules(), &record.clone()).unwrap(), first);
        }
    }

    #[test]
    fn test_partial_key_is_prefix_of_full_key() {
        let rule = KeyRule::new("sk", ["!Foo", "year", "month", "day"]);
        let full = Item::new()
            .set_string("year", "2024")
            .set_string("month", "03")
            .set_string("day", "09");
        let mut partial = Item::new().set_string("year", "2024").set_string("month", "03");
        partial.insert("day", AttributeValue::Null(true));

        let full_key = rule.derive(&full).unwrap();
        let partial_key = rule.derive(&partial).unwrap();
        assert_eq!(partial_key, "Foo#year#2024#month#03");
        assert!(full_key.starts_with(&partial_key));
        assert!(!partial_key.ends_with(KEY_DELIMITER));
    }

    #[test]
    fn test_identity_requires_leading_value() {
        let rule = KeyRule::new("pk", ["k1"]);
        let mut record = Item::new();
        record.insert("k1", AttributeValue::Null(true));

        assert!(matches!(
            rule.ensure_identity(&record),
            Err(DaoError::MissingPartitionKey { .. })
        ));
        assert!(matches!(
            rule.ensure_identity(&Item::new()),
            Err(DaoError::MissingField(_))
        ));
        assert!(KeyRule::new("pk", ["!ROOT"]).ensure_identity(&Item::new()).is_ok());
        assert!(KeyRule::new("pk", Vec::<&str>::new())
            .ensure_identity(&Item::new())
            .is_err());
    }

    #[test]
    fn test_rule_set_binds_to_table_attributes() {
        let set = KeyRuleSet::new(["k1"], ["!TAG", "k2"])
            .with_fixed("tenant", AttributeValue::S("t1".into()));
        let (pk, sk, fixed) = set.into_rules("PK", "SK");

        assert_eq!(pk.attribute(), "PK");
        assert_eq!(pk.specs(), [FieldSpec::Field("k1".into())]);
        assert_eq!(sk.attribute(), "SK");
        assert_eq!(sk.specs()[0], FieldSpec::Literal("TAG".into()));
        assert_eq!(fixed.get_string("tenant"), Some(&"t1".to_string()));
    }
}
