use async_trait::async_trait;

use crate::dynamodb::{Item, KeyCondition};
use crate::error::StoreError;

/// The key-value store the DAO talks to.
///
/// Kept as small as the DAO's needs so both the AWS backed [`DynamoDb`] and
/// the in-process [`MemoryStore`] can implement it. Implementations own
/// timeouts, retries and pagination; callers of the trait see one result per
/// request.
///
/// [`DynamoDb`]: crate::dynamodb::DynamoDb
/// [`MemoryStore`]: crate::dynamodb::MemoryStore
#[async_trait]
pub trait Store: Send + Sync {
    /// Writes an item, replacing any item with the same primary key.
    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), StoreError>;

    /// Fetches the item with exactly this primary key.
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>, StoreError>;

    /// Returns every item matching the key condition, in sort key order.
    async fn query(
        &self,
        table_name: &str,
        condition: KeyCondition,
    ) -> Result<Vec<Item>, StoreError>;
}
