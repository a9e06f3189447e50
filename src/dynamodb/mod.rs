//! # DynamoDB Module
//!
//! The store side of the crate: the item representation, key conditions, the
//! [`Store`] seam the DAO is written against, and two implementations of it.
//!
//! ## Components
//!
//! - `Item`: A record's field mapping in native DynamoDB attribute form.
//! - `KeyCondition` / `SortKey`: Partition equality plus an optional sort key condition.
//! - `Store`: put / get / query, the only operations the DAO needs.
//! - `DynamoDb`: `Store` over the AWS SDK, plus table provisioning.
//! - `MemoryStore`: `Store` held in process memory, for tests.
//! - `TableSpec`: Table name and the attributes holding derived keys.
//!
//! ## Usage
//!
//! `DynamoDb::connect` takes a [`StoreConfig`](crate::config::StoreConfig);
//! `StoreConfig::from_env` reads:
//!
//! - `AWS_REGION`: The AWS region where your DynamoDB tables are located.
//! - `AWS_ENDPOINT_URL`: For using a custom endpoint (e.g., DynamoDB Local).
//!
//! Credentials come from the SDK's default provider chain (`AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`, profiles, ...).

mod client;
mod condition;
mod item;
mod memory;
mod store;
mod table;

pub use client::DynamoDb;
pub use condition::{KeyCondition, KeyConditionExpression, SortCondition, SortKey, SortOp};
pub use item::{FieldValue, Item};
pub use memory::MemoryStore;
pub use store::Store;
pub use table::{TableSpec, DEFAULT_PARTITION_KEY, DEFAULT_SORT_KEY};
