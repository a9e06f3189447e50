use anyhow::Result;
use dynamo_single_table::{
    config::StoreConfig,
    dao::Dao,
    dynamodb::{DynamoDb, TableSpec},
    keys::KeyRuleSet,
    logging,
    record::Record,
    utils::{retry_with_backoff, Backoff},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::info;

const TABLE_NAME: &str = "single-table-demo";
const TYPE_ATTRIBUTE: &str = "type";

/// Lookup key for readings: the sensor is mandatory, the day is optional and
/// leaving it out yields a prefix covering every day.
#[derive(Debug, Serialize)]
struct ReadingKey {
    sensor: String,
    day: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    day: String,
    celsius: f64,
}

impl Record for Reading {
    fn key_rules() -> KeyRuleSet {
        KeyRuleSet::new(["sensor"], ["!READING", "day"])
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging(logging::level_from_env())?;

    let config = StoreConfig::from_env();
    let ddb = Arc::new(DynamoDb::connect(&config).await);
    ddb.check_auth().await?;

    let table = TableSpec::new(TABLE_NAME).with_type_attribute(TYPE_ATTRIBUTE);
    let created = retry_with_backoff(
        || ddb.create_table_if_not_exists(&table),
        Backoff::new(Duration::from_secs(1), 5),
    )
    .await?;
    if let Some(output) = created {
        if let Some(description) = output.table_description() {
            info!("Table status: {:?}", description.table_status());
        }
    }

    let dao: Dao<ReadingKey, Reading, _> = Dao::new(ddb.clone(), table)?;
    for (day, celsius) in [("2024-03-01", 4.5), ("2024-03-02", 6.0)] {
        dao.add(&Reading {
            sensor: "greenhouse".into(),
            day: day.into(),
            celsius,
        })
        .await?;
    }

    let one = dao
        .get(&ReadingKey {
            sensor: "greenhouse".into(),
            day: Some("2024-03-01".into()),
        })
        .await?;
    info!("Single reading: {:?}", one);

    let all_days = ReadingKey {
        sensor: "greenhouse".into(),
        day: None,
    };
    let partition = dao.query_partition(&all_days).await?;
    info!("Partition holds {} items", partition.len());

    let readings = dao.records(dao.query_prefix(&all_days).await?)?;
    for reading in &readings {
        info!("{} {} {:.1}°C", reading.sensor, reading.day, reading.celsius);
    }

    Ok(())
}
