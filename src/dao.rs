//! Generic data access object over a single table.
//!
//! A [`Dao`] binds a key type `K`, a record type `V` and a [`TableSpec`]. The
//! record type's [`KeyRuleSet`](crate::keys::KeyRuleSet) is bound to the
//! table's key attributes once, at construction, and never changes afterwards,
//! so a `Dao` can be shared between tasks without locking.
//!
//! Derived keys are written next to the record's own fields:
//!
//! | attribute | value |
//! |---|---|
//! | partition key | partition rule applied to the record |
//! | sort key | sort rule applied to the record |
//! | type attribute (optional) | `V::type_name()` |

use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::dynamodb::{Item, KeyCondition, SortCondition, SortKey, Store, TableSpec};
use crate::error::Result;
use crate::keys::{derive_keys, KeyRule};
use crate::record::Record;

pub struct Dao<K, V, S: ?Sized = dyn Store> {
    store: Arc<S>,
    table: TableSpec,
    /// Partition rule first, sort rule second.
    rules: [KeyRule; 2],
    fixed: Item,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V, S> Dao<K, V, S>
where
    K: Serialize,
    V: Record,
    S: Store + ?Sized,
{
    pub fn new(store: Arc<S>, table: TableSpec) -> Result<Self> {
        table.validate()?;
        let (partition, sort, fixed) =
            V::key_rules().into_rules(table.partition_key(), table.sort_key());
        debug!(
            "Dao for {} on '{}': {:?} / {:?}",
            V::type_name(),
            table.name(),
            partition.specs(),
            sort.specs()
        );
        Ok(Self {
            store,
            table,
            rules: [partition, sort],
            fixed,
            _types: PhantomData,
        })
    }

    pub fn table(&self) -> &TableSpec {
        &self.table
    }

    pub fn partition_rule(&self) -> &KeyRule {
        &self.rules[0]
    }

    pub fn sort_rule(&self) -> &KeyRule {
        &self.rules[1]
    }

    /// Writes `value`, replacing any item with the same derived keys.
    #[instrument(skip_all, fields(table = %self.table.name(), record = V::type_name()))]
    pub async fn add(&self, value: &V) -> Result<()> {
        let mut item = value.to_item()?;
        item.merge(self.fixed.clone());

        let keys = self.primary_key(&item)?;
        debug!("derived keys {:?}", keys);
        item.merge(keys);

        if let Some(type_attribute) = self.table.type_attribute() {
            item.insert_string(type_attribute, V::type_name());
        }

        self.store.put_item(self.table.name(), item).await?;
        Ok(())
    }

    /// Fetches the record addressed by `key`. Absence is `Ok(None)`.
    #[instrument(skip_all, fields(table = %self.table.name(), record = V::type_name()))]
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        let fields = self.fields(key)?;
        let primary_key = self.primary_key(&fields)?;
        debug!("get {:?}", primary_key);

        match self.store.get_item(self.table.name(), primary_key).await? {
            Some(item) => Ok(Some(V::from_item(item)?)),
            None => Ok(None),
        }
    }

    /// Returns every item in the partition derived from `key`, whatever its
    /// record type or sort key. Use [`Dao::records`] to keep only `V` rows.
    #[instrument(skip_all, fields(table = %self.table.name(), record = V::type_name()))]
    pub async fn query_partition(&self, key: &K) -> Result<Vec<Item>> {
        let fields = self.fields(key)?;
        let condition =
            KeyCondition::partition(self.table.partition_key(), self.partition_value(&fields)?);
        debug!("query {:?}", condition);
        Ok(self.store.query(self.table.name(), condition).await?)
    }

    /// Items whose sort key begins with the (possibly truncated) sort key
    /// derived from `key`.
    ///
    /// When the sort rule starts with a field and `key` leaves that field
    /// out, the derived prefix is empty. DynamoDB rejects an empty key
    /// condition value, so the call fails with a `ValidationException`
    /// store error; use [`Dao::query_partition`] to read the whole partition.
    pub async fn query_prefix(&self, key: &K) -> Result<Vec<Item>> {
        self.query_condition(key, |sort_key, prefix| sort_key.begins_with(prefix))
            .await
    }

    /// Queries the partition derived from `key` with a caller built sort key
    /// condition. `build` receives the sort key attribute and the sort key
    /// derived from `key`, truncated at its first field without a value.
    ///
    /// ```ignore
    /// // everything sorted after the derived key
    /// dao.query_condition(&key, |sk, derived| sk.gt(derived)).await?;
    /// // a fixed range, ignoring the derived key
    /// dao.query_condition(&key, |sk, _| sk.between("Foo#date#d1", "Foo#date#d3")).await?;
    /// ```
    #[instrument(skip_all, fields(table = %self.table.name(), record = V::type_name()))]
    pub async fn query_condition<F>(&self, key: &K, build: F) -> Result<Vec<Item>>
    where
        F: FnOnce(SortKey, String) -> SortCondition,
    {
        let fields = self.fields(key)?;
        let partition_value = self.partition_value(&fields)?;
        let sort_value = self.sort_rule().derive(&fields)?;

        let sort = build(SortKey::new(self.table.sort_key()), sort_value);
        let condition =
            KeyCondition::partition(self.table.partition_key(), partition_value).and_sort(sort);
        debug!("query {:?}", condition);
        Ok(self.store.query(self.table.name(), condition).await?)
    }

    /// Materializes the rows that belong to `V`. When the table has a type
    /// attribute, rows stamped with another record type are skipped, and so
    /// are rows that lack the attribute entirely (for example rows written
    /// outside this crate). Without a type attribute every row is
    /// materialized.
    pub fn records(&self, items: Vec<Item>) -> Result<Vec<V>> {
        items
            .into_iter()
            .filter(|item| match self.table.type_attribute() {
                Some(attribute) => {
                    item.get_string(attribute).map(String::as_str) == Some(V::type_name())
                }
                None => true,
            })
            .map(V::from_item)
            .collect()
    }

    fn fields<T: Serialize>(&self, value: &T) -> Result<Item> {
        let mut item = Item::from_record(value)?;
        item.merge(self.fixed.clone());
        Ok(item)
    }

    fn partition_value(&self, fields: &Item) -> Result<String> {
        self.partition_rule().ensure_identity(fields)?;
        self.partition_rule().derive(fields)
    }

    fn primary_key(&self, fields: &Item) -> Result<Item> {
        self.partition_rule().ensure_identity(fields)?;
        let mut key = Item::new();
        for (attribute, value) in derive_keys(&self.rules, fields)? {
            key.insert_string(attribute, value);
        }
        Ok(key)
    }
}
