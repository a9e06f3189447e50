//! Integration tests against a live DynamoDB endpoint.
//!
//! These cover the AWS backed `Store`: table provisioning, the DAO's put / get
//! path and key condition rendering as DynamoDB actually evaluates it.
//!
//! # Setup
//!
//! Start DynamoDB Local and point the tests at it in your `.env` file:
//!
//! ```text
//! AWS_ENDPOINT_URL=http://localhost:8000
//! AWS_REGION=us-east-1
//! AWS_ACCESS_KEY_ID=dummy
//! AWS_SECRET_ACCESS_KEY=dummy
//! ```
//!
//! The tests use a table named "single-table-it" with `PK` / `SK` string keys
//! and a `type` attribute. It is created when missing.
//!
//! # Running Tests
//!
//! ```text
//! cargo test -- --ignored
//! ```
//!
//! Note: These tests may incur AWS charges if run against a real DynamoDB instance.

use crate::config::StoreConfig;
use crate::dao::Dao;
use crate::dynamodb::{DynamoDb, Item, KeyCondition, SortKey, Store, TableSpec};
use crate::error::{DaoError, StoreError};
use crate::keys::KeyRuleSet;
use crate::record::Record;
use crate::utils::{retry_with_backoff, Backoff};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{info, instrument};

const TEST_TABLE_NAME: &str = "single-table-it";
const SCRATCH_TABLE_NAME: &str = "single-table-it-scratch";

#[derive(Debug, Serialize)]
struct ProductKey {
    category: String,
    name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Product {
    category: String,
    name: String,
    price: f64,
}

impl Record for Product {
    fn key_rules() -> KeyRuleSet {
        KeyRuleSet::new(["category"], ["!PRODUCT", "name"])
    }
}

fn table() -> TableSpec {
    TableSpec::new(TEST_TABLE_NAME).with_type_attribute("type")
}

#[instrument]
async fn setup_test_table() -> Result<Arc<DynamoDb>> {
    dotenv::dotenv().ok();
    let ddb = Arc::new(DynamoDb::connect(&StoreConfig::from_env()).await);
    let table = table();

    retry_with_backoff(
        || ddb.create_table_if_not_exists(&table),
        Backoff::new(Duration::from_secs(3), 5),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create table after multiple retries: {e:?}"))?;
    info!("Table ready");

    Ok(ddb)
}

fn product(category: &str, name: &str, price: f64) -> Product {
    Product {
        category: category.into(),
        name: name.into(),
        price,
    }
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_check_auth() -> Result<()> {
    let ddb = setup_test_table().await?;
    ddb.check_auth().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_describe_table() -> Result<()> {
    let ddb = setup_test_table().await?;

    let description = ddb.describe_table(TEST_TABLE_NAME).await?;
    assert_eq!(
        description.table().and_then(|t| t.table_name()),
        Some(TEST_TABLE_NAME)
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_create_and_delete_scratch_table() -> Result<()> {
    let ddb = setup_test_table().await?;
    let scratch = TableSpec::new(SCRATCH_TABLE_NAME).with_keys("pk", "sk");

    if ddb.table_exists(scratch.name()).await? {
        ddb.delete_table(scratch.name()).await?;
    }
    assert!(ddb.create_table_if_not_exists(&scratch).await?.is_some());
    assert!(ddb.create_table_if_not_exists(&scratch).await?.is_none());
    assert!(ddb.table_exists(scratch.name()).await?);

    ddb.delete_table(scratch.name()).await?;
    assert!(!ddb.table_exists(scratch.name()).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_dao_round_trip() -> Result<()> {
    let ddb = setup_test_table().await?;
    let dao: Dao<ProductKey, Product, _> = Dao::new(ddb.clone(), table())?;

    let book = product("Books", "Rust", 39.99);
    dao.add(&book).await?;

    let got = dao
        .get(&ProductKey {
            category: "Books".into(),
            name: Some("Rust".into()),
        })
        .await?;
    assert_eq!(got, Some(book));

    let missing = dao
        .get(&ProductKey {
            category: "Books".into(),
            name: Some("Absent".into()),
        })
        .await?;
    assert!(missing.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_dao_queries() -> Result<()> {
    let ddb = setup_test_table().await?;
    let dao: Dao<ProductKey, Product, _> = Dao::new(ddb.clone(), table())?;

    for i in 1..=5 {
        dao.add(&product("Electronics", &format!("Product{i}"), i as f64 * 100.0))
            .await?;
    }

    let all = ProductKey {
        category: "Electronics".into(),
        name: None,
    };
    let partition = dao.records(dao.query_partition(&all).await?)?;
    assert_eq!(partition.len(), 5);

    let prefixed = dao.query_prefix(&all).await?;
    assert_eq!(prefixed.len(), 5);

    let exact = dao
        .query_prefix(&ProductKey {
            category: "Electronics".into(),
            name: Some("Product3".into()),
        })
        .await?;
    assert_eq!(exact.len(), 1);

    let range = dao
        .query_condition(&all, |sk, _| {
            sk.between("PRODUCT#name#Product2", "PRODUCT#name#Product4")
        })
        .await?;
    assert_eq!(range.len(), 3);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_store_query_renders_sort_conditions() -> Result<()> {
    let ddb = setup_test_table().await?;
    for sk in ["a#1", "a#2", "b#1"] {
        ddb.put_item(
            TEST_TABLE_NAME,
            Item::new().set_string("PK", "raw").set_string("SK", sk),
        )
        .await?;
    }

    let rows = ddb
        .query(
            TEST_TABLE_NAME,
            KeyCondition::partition("PK", "raw").and_sort(SortKey::new("SK").begins_with("a#")),
        )
        .await?;
    assert_eq!(rows.len(), 2);

    let rows = ddb
        .query(
            TEST_TABLE_NAME,
            KeyCondition::partition("PK", "raw").and_sort(SortKey::new("SK").gt("a#2")),
        )
        .await?;
    assert_eq!(rows.len(), 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a DynamoDB endpoint"]
async fn test_missing_table_is_a_store_rejection() -> Result<()> {
    let ddb = setup_test_table().await?;
    let dao: Dao<ProductKey, Product, _> =
        Dao::new(ddb, TableSpec::new("single-table-it-does-not-exist"))?;

    let err = dao
        .add(&product("Books", "Rust", 1.0))
        .await
        .expect_err("put into a missing table must fail");
    assert!(matches!(
        err,
        DaoError::Store(StoreError::Rejected { ref code, .. }) if code == "ResourceNotFoundException"
    ));
    Ok(())
}
