//! Key conditions for `Query` requests.
//!
//! A [`KeyCondition`] always pins the partition key to a single value and may
//! add one [`SortCondition`] on the sort key. Sort conditions are built from a
//! [`SortKey`] handle, which is what the DAO hands to caller supplied
//! condition builders.

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// Placeholder used for the partition attribute name in rendered expressions.
pub const PARTITION_NAME: &str = "#pk";
/// Placeholder used for the sort attribute name in rendered expressions.
pub const SORT_NAME: &str = "#sk";

/// Comparison applied to the sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOp {
    Eq(String),
    Lt(String),
    Le(String),
    Gt(String),
    Ge(String),
    /// Inclusive on both ends.
    Between(String, String),
    BeginsWith(String),
}

impl SortOp {
    /// The operand values, one for most operators and two for `Between`.
    pub fn values(&self) -> Vec<&str> {
        match self {
            SortOp::Eq(v)
            | SortOp::Lt(v)
            | SortOp::Le(v)
            | SortOp::Gt(v)
            | SortOp::Ge(v)
            | SortOp::BeginsWith(v) => vec![v.as_str()],
            SortOp::Between(lo, hi) => vec![lo.as_str(), hi.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCondition {
    attribute: String,
    op: SortOp,
}

/// Handle on a sort key attribute, used to build a [`SortCondition`].
///
/// ```
/// use dynamo_single_table::dynamodb::{SortKey, SortOp};
///
/// let cond = SortKey::new("SK").begins_with("Foo#date");
/// assert_eq!(cond.op(), &SortOp::BeginsWith("Foo#date".into()));
/// ```
#[derive(Debug, Clone)]
pub struct SortKey {
    attribute: String,
}

impl SortKey {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn eq(self, value: impl Into<String>) -> SortCondition {
        self.with(SortOp::Eq(value.into()))
    }

    pub fn lt(self, value: impl Into<String>) -> SortCondition {
        self.with(SortOp::Lt(value.into()))
    }

    pub fn le(self, value: impl Into<String>) -> SortCondition {
        self.with(SortOp::Le(value.into()))
    }

    pub fn gt(self, value: impl Into<String>) -> SortCondition {
        self.with(SortOp::Gt(value.into()))
    }

    pub fn ge(self, value: impl Into<String>) -> SortCondition {
        self.with(SortOp::Ge(value.into()))
    }

    pub fn between(self, low: impl Into<String>, high: impl Into<String>) -> SortCondition {
        self.with(SortOp::Between(low.into(), high.into()))
    }

    pub fn begins_with(self, prefix: impl Into<String>) -> SortCondition {
        self.with(SortOp::BeginsWith(prefix.into()))
    }

    fn with(self, op: SortOp) -> SortCondition {
        SortCondition {
            attribute: self.attribute,
            op,
        }
    }
}

impl SortCondition {
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn op(&self) -> &SortOp {
        &self.op
    }

    /// Evaluates the condition against a sort key value using plain string
    /// ordering, which is how the store orders `S` keys.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.op {
            SortOp::Eq(v) => candidate == v,
            SortOp::Lt(v) => candidate < v.as_str(),
            SortOp::Le(v) => candidate <= v.as_str(),
            SortOp::Gt(v) => candidate > v.as_str(),
            SortOp::Ge(v) => candidate >= v.as_str(),
            SortOp::Between(lo, hi) => lo.as_str() <= candidate && candidate <= hi.as_str(),
            SortOp::BeginsWith(prefix) => candidate.starts_with(prefix.as_str()),
        }
    }

    /// Renders the expression fragment and its value placeholders.
    fn render(&self) -> (String, Vec<(String, AttributeValue)>) {
        let value = |name: &str, v: &String| (name.to_string(), AttributeValue::S(v.clone()));
        match &self.op {
            SortOp::Eq(v) => (format!("{SORT_NAME} = :sk"), vec![value(":sk", v)]),
            SortOp::Lt(v) => (format!("{SORT_NAME} < :sk"), vec![value(":sk", v)]),
            SortOp::Le(v) => (format!("{SORT_NAME} <= :sk"), vec![value(":sk", v)]),
            SortOp::Gt(v) => (format!("{SORT_NAME} > :sk"), vec![value(":sk", v)]),
            SortOp::Ge(v) => (format!("{SORT_NAME} >= :sk"), vec![value(":sk", v)]),
            SortOp::Between(lo, hi) => (
                format!("{SORT_NAME} BETWEEN :sk AND :sk_hi"),
                vec![value(":sk", lo), value(":sk_hi", hi)],
            ),
            SortOp::BeginsWith(v) => (
                format!("begins_with({SORT_NAME}, :sk)"),
                vec![value(":sk", v)],
            ),
        }
    }
}

/// Condition for a `Query` request: partition equality plus an optional sort
/// key condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    partition_attribute: String,
    partition_value: String,
    sort: Option<SortCondition>,
}

/// A [`KeyCondition`] rendered into the three request parameters DynamoDB expects.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConditionExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl KeyCondition {
    pub fn partition(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            partition_attribute: attribute.into(),
            partition_value: value.into(),
            sort: None,
        }
    }

    pub fn and_sort(mut self, sort: SortCondition) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn partition_attribute(&self) -> &str {
        &self.partition_attribute
    }

    pub fn partition_value(&self) -> &str {
        &self.partition_value
    }

    pub fn sort(&self) -> Option<&SortCondition> {
        self.sort.as_ref()
    }

    pub fn to_expression(&self) -> KeyConditionExpression {
        let mut expression = format!("{PARTITION_NAME} = :pk");
        let mut names = HashMap::from([(
            PARTITION_NAME.to_string(),
            self.partition_attribute.clone(),
        )]);
        let mut values = HashMap::from([(
            ":pk".to_string(),
            AttributeValue::S(self.partition_value.clone()),
        )]);

        if let Some(sort) = &self.sort {
            let (fragment, sort_values) = sort.render();
            expression.push_str(" AND ");
            expression.push_str(&fragment);
            names.insert(SORT_NAME.to_string(), sort.attribute.clone());
            values.extend(sort_values);
        }

        KeyConditionExpression {
            expression,
            names,
            values,
        }
    }
}
