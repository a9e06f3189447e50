//! Store client configuration.
//!
//! The endpoint override lives in a value handed to
//! [`DynamoDb::connect`](crate::dynamodb::DynamoDb::connect), so clients for
//! different endpoints (e.g. DynamoDB Local and AWS) can coexist in one process.

use aws_config::{BehaviorVersion, Region, SdkConfig};

pub const ENDPOINT_URL_VAR: &str = "AWS_ENDPOINT_URL";
pub const REGION_VAR: &str = "AWS_REGION";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region. Falls back to the SDK's provider chain when unset.
    pub region: Option<String>,
}

impl StoreConfig {
    /// Reads `AWS_ENDPOINT_URL` and `AWS_REGION`. Call `dotenv::dotenv()` first
    /// if values should come from a `.env` file.
    pub fn from_env() -> Self {
        Self {
            endpoint_url: non_empty_var(ENDPOINT_URL_VAR),
            region: non_empty_var(REGION_VAR),
        }
    }

    /// Targets a local endpoint, e.g. `http://localhost:8000` for DynamoDB Local.
    pub fn local(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            region: Some("us-east-1".to_string()),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        let region = self.region.as_deref().unwrap_or("default");
        match &self.endpoint_url {
            Some(url) => format!("custom endpoint {url} (region: {region})"),
            None => format!("AWS DynamoDB (region: {region})"),
        }
    }

    /// Loads an SDK configuration honouring the overrides in `self`.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        loader.load().await
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
