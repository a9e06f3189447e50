use crate::error::{DaoError, Result};

pub const DEFAULT_PARTITION_KEY: &str = "PK";
pub const DEFAULT_SORT_KEY: &str = "SK";

/// Single-table descriptor.
///
/// Names the table and the attributes that carry the derived composite keys.
/// Every record type stored through a [`Dao`](crate::dao::Dao) shares these
/// attributes, so one physical table holds many logical record types.
///
/// # Table Structure
///
/// - **Table Name**: A unique identifier for the table within your AWS account and region.
/// - **Partition Key**: Attribute holding the derived partition key string.
/// - **Sort Key**: Attribute holding the derived sort key string.
/// - **Type Attribute**: Optional. When set, every written item is stamped with
///   the name of its record type, letting readers tell rows of a shared
///   partition apart.
///
/// Both key attributes are declared as strings when the table is provisioned.
///
/// # Example
///
/// ```
/// use dynamo_single_table::dynamodb::TableSpec;
///
/// let table = TableSpec::new("app-data")
///     .with_keys("pk", "sk")
///     .with_type_attribute("type");
/// assert!(table.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    name: String,
    partition_key: String,
    sort_key: String,
    type_attribute: Option<String>,
}

impl TableSpec {
    /// Creates a spec using the conventional `PK` / `SK` key attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: DEFAULT_PARTITION_KEY.to_string(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            type_attribute: None,
        }
    }

    pub fn with_keys(
        mut self,
        partition_key: impl Into<String>,
        sort_key: impl Into<String>,
    ) -> Self {
        self.partition_key = partition_key.into();
        self.sort_key = sort_key.into();
        self
    }

    pub fn with_type_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.type_attribute = Some(attribute.into());
        self
    }

    /// Returns the name of the table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the partition key attribute of the table.
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Returns the sort key attribute of the table.
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    pub fn type_attribute(&self) -> Option<&str> {
        self.type_attribute.as_deref()
    }

    /// Checks the descriptor is usable: a name, two distinct non-empty key
    /// attributes, and a type attribute that does not shadow either key.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DaoError::InvalidTable("table name is empty".into()));
        }
        if self.partition_key.is_empty() || self.sort_key.is_empty() {
            return Err(DaoError::InvalidTable(format!(
                "table '{}' has an empty key attribute name",
                self.name
            )));
        }
        if self.partition_key == self.sort_key {
            return Err(DaoError::InvalidTable(format!(
                "table '{}' uses '{}' as both partition and sort key",
                self.name, self.partition_key
            )));
        }
        if let Some(type_attribute) = self.type_attribute() {
            if type_attribute == self.partition_key || type_attribute == self.sort_key {
                return Err(DaoError::InvalidTable(format!(
                    "type attribute '{type_attribute}' collides with a key attribute"
                )));
            }
        }
        Ok(())
    }
}
