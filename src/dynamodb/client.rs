use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    operation::{create_table::CreateTableOutput, describe_table::DescribeTableOutput},
    types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
    },
    Client,
};
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::dynamodb::{Item, KeyCondition, Store, TableSpec};
use crate::error::StoreError;

/// DynamoDB client wrapper.
///
/// Implements [`Store`] over the AWS SDK and carries the table provisioning
/// helpers needed to stand up a single-table layout.
///
/// # Item operations
///
/// - **Put**: upsert, no condition expression.
/// - **Get**: lookup by full primary key.
/// - **Query**: partition equality plus an optional sort key condition. All
///   result pages are collected before returning.
///
/// # Example
///
/// ```no_run
/// use dynamo_single_table::config::StoreConfig;
/// use dynamo_single_table::dynamodb::{DynamoDb, TableSpec};
///
/// # async fn run() -> anyhow::Result<()> {
/// let ddb = DynamoDb::connect(&StoreConfig::local("http://localhost:8000")).await;
/// ddb.create_table_if_not_exists(&TableSpec::new("app-data")).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// Provisioning methods return `anyhow::Result`. The [`Store`] methods return
/// [`StoreError`], separating throttling/validation rejections from transport
/// failures.
#[derive(Debug, Clone)]
pub struct DynamoDb {
    client: Client,
}

impl DynamoDb {
    /// Creates a new `DynamoDb` instance.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Builds a client for the endpoint and region described by `config`.
    pub async fn connect(config: &StoreConfig) -> Self {
        info!("Connecting to {}", config.target_display());
        Self::new(&config.load_sdk_config().await)
    }

    /// Verifies authentication by attempting to list tables.
    pub async fn check_auth(&self) -> Result<()> {
        self.client.list_tables().send().await.map_err(|e| {
            error!("Authentication failed: {}", e);
            anyhow!("Authentication failed")
        })?;
        info!("Authentication successful");
        Ok(())
    }

    // --- Table Operations ---

    /// Creates a table with string partition and sort keys if it doesn't exist.
    pub async fn create_table_if_not_exists(
        &self,
        table: &TableSpec,
    ) -> Result<Option<CreateTableOutput>> {
        if self.table_exists(table.name()).await? {
            info!("Table '{}' exists", table.name());
            return Ok(None);
        }

        let mut attribute_definitions = Vec::with_capacity(2);
        let mut key_schema = Vec::with_capacity(2);
        for (attribute, key_type) in [
            (table.partition_key(), KeyType::Hash),
            (table.sort_key(), KeyType::Range),
        ] {
            attribute_definitions.push(
                AttributeDefinition::builder()
                    .attribute_name(attribute)
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            );
            key_schema.push(
                KeySchemaElement::builder()
                    .attribute_name(attribute)
                    .key_type(key_type)
                    .build()?,
            );
        }

        let output = self
            .client
            .create_table()
            .table_name(table.name())
            .billing_mode(BillingMode::PayPerRequest)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .send()
            .await?;
        info!("Table '{}' created", table.name());
        Ok(Some(output))
    }

    /// Deletes a table.
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await?;
        info!("Table '{table_name}' deleted");
        Ok(())
    }

    /// Checks if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let tables = self.client.list_tables().send().await?;
        Ok(tables.table_names().contains(&table_name.to_string()))
    }

    /// Retrieves table description.
    pub async fn describe_table(&self, table_name: &str) -> Result<DescribeTableOutput> {
        self.client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl Store for DynamoDb {
    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item.attributes))
            .send()
            .await?;

        debug!("Item added to '{table_name}'");
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>, StoreError> {
        let response = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .send()
            .await?;

        Ok(response.item.map(Item::from))
    }

    async fn query(
        &self,
        table_name: &str,
        condition: KeyCondition,
    ) -> Result<Vec<Item>, StoreError> {
        let rendered = condition.to_expression();
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let response = self
                .client
                .query()
                .table_name(table_name)
                .key_condition_expression(&rendered.expression)
                .set_expression_attribute_names(Some(rendered.names.clone()))
                .set_expression_attribute_values(Some(rendered.values.clone()))
                .set_exclusive_start_key(last_evaluated_key)
                .send()
                .await?;

            if let Some(page) = response.items {
                items.extend(page.into_iter().map(Item::from));
            }

            last_evaluated_key = response.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }

        debug!(
            "Query '{}' on '{table_name}' returned {} items",
            rendered.expression,
            items.len()
        );
        Ok(items)
    }
}
