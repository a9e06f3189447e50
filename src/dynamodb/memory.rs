//! In-process [`Store`] for tests.
//!
//! Mirrors the parts of DynamoDB's behavior the DAO relies on: tables must be
//! created before use, items are keyed by their string partition and sort
//! key attributes, puts replace, and queries return rows in ascending sort
//! key order.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::dynamodb::{Item, KeyCondition, Store, TableSpec};
use crate::error::StoreError;

#[derive(Debug)]
struct MemoryTable {
    partition_key: String,
    sort_key: String,
    rows: BTreeMap<(String, String), Item>,
}

impl MemoryTable {
    fn primary_key(&self, item: &Item) -> Result<(String, String), StoreError> {
        let string_key = |attribute: &str| match item.get(attribute) {
            Some(AttributeValue::S(value)) if !value.is_empty() => Ok(value.clone()),
            Some(_) => Err(StoreError::rejected(
                "ValidationException",
                format!("key attribute '{attribute}' must be a non-empty string"),
            )),
            None => Err(StoreError::rejected(
                "ValidationException",
                format!("missing key attribute '{attribute}'"),
            )),
        };
        Ok((
            string_key(&self.partition_key)?,
            string_key(&self.sort_key)?,
        ))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table. Returns `false` if it already existed.
    pub fn create_table(&self, table: &TableSpec) -> bool {
        let mut tables = self.lock();
        if tables.contains_key(table.name()) {
            return false;
        }
        tables.insert(
            table.name().to_string(),
            MemoryTable {
                partition_key: table.partition_key().to_string(),
                sort_key: table.sort_key().to_string(),
                rows: BTreeMap::new(),
            },
        );
        true
    }

    /// Number of items stored in `table_name`, `None` if the table doesn't exist.
    pub fn item_count(&self, table_name: &str) -> Option<usize> {
        self.lock().get(table_name).map(|t| t.rows.len())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryTable>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn table_not_found(table_name: &str) -> StoreError {
    StoreError::rejected(
        "ResourceNotFoundException",
        format!("table '{table_name}' not found"),
    )
}

#[async_trait]
impl Store for MemoryStore {
    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| table_not_found(table_name))?;
        let key = table.primary_key(&item)?;
        debug!("memory put {table_name} {key:?}");
        table.rows.insert(key, item);
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>, StoreError> {
        let tables = self.lock();
        let table = tables
            .get(table_name)
            .ok_or_else(|| table_not_found(table_name))?;
        if key.len() != 2 {
            return Err(StoreError::rejected(
                "ValidationException",
                "the provided key does not match the table's key schema",
            ));
        }
        let key = table.primary_key(&key)?;
        Ok(table.rows.get(&key).cloned())
    }

    async fn query(
        &self,
        table_name: &str,
        condition: KeyCondition,
    ) -> Result<Vec<Item>, StoreError> {
        let tables = self.lock();
        let table = tables
            .get(table_name)
            .ok_or_else(|| table_not_found(table_name))?;
        if condition.partition_attribute() != table.partition_key {
            return Err(StoreError::rejected(
                "ValidationException",
                format!(
                    "'{}' is not the partition key of '{table_name}'",
                    condition.partition_attribute()
                ),
            ));
        }
        if let Some(sort) = condition.sort() {
            if sort.attribute() != table.sort_key {
                return Err(StoreError::rejected(
                    "ValidationException",
                    format!("'{}' is not the sort key of '{table_name}'", sort.attribute()),
                ));
            }
            if sort.op().values().iter().any(|v| v.is_empty()) {
                return Err(StoreError::rejected(
                    "ValidationException",
                    "one or more key condition values are empty strings",
                ));
            }
        }

        let partition = condition.partition_value();
        Ok(table
            .rows
            .iter()
            .filter(|((pk, sk), _)| {
                pk == partition && condition.sort().map_or(true, |sort| sort.matches(sk))
            })
            .map(|(_, item)| item.clone())
            .collect())
    }
}
