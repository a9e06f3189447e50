//! Single-table data access on DynamoDB.
//!
//! Record types declare how their partition and sort keys are composed from
//! their own fields ([`keys`]); a generic [`dao::Dao`] derives those keys and
//! offers exact lookups, partition scans and sort key prefix / range queries
//! against any [`dynamodb::Store`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use dynamo_single_table::config::StoreConfig;
//! use dynamo_single_table::dao::Dao;
//! use dynamo_single_table::dynamodb::{DynamoDb, TableSpec};
//! use dynamo_single_table::keys::KeyRuleSet;
//! use dynamo_single_table::record::Record;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct PostKey {
//!     blog: String,
//!     day: Option<String>,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Post {
//!     blog: String,
//!     day: String,
//!     title: String,
//! }
//!
//! impl Record for Post {
//!     fn key_rules() -> KeyRuleSet {
//!         KeyRuleSet::new(["blog"], ["!POST", "day"])
//!     }
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let ddb = Arc::new(DynamoDb::connect(&StoreConfig::from_env()).await);
//! let dao: Dao<PostKey, Post, _> = Dao::new(ddb, TableSpec::new("blog-data"))?;
//!
//! dao.add(&Post { blog: "b1".into(), day: "2024-05-01".into(), title: "hello".into() }).await?;
//! let all_posts = dao.query_prefix(&PostKey { blog: "b1".into(), day: None }).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dao;
pub mod dynamodb;
pub mod error;
pub mod keys;
pub mod logging;
pub mod record;
pub mod utils;

#[cfg(test)]
mod tests;
