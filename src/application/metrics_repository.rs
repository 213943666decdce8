// Repository trait for metric listing and dashboard publication
use crate::error::Result;
use async_trait::async_trait;

/// Parameters of a single listing call: every metric with this name in this
/// namespace that carries a dimension called `dimension_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMetricsRequest {
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionPair {
    pub name: String,
    pub value: String,
}

impl DimensionPair {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListedMetric {
    pub dimensions: Vec<DimensionPair>,
}

/// One page of listing results. `next_token` is set while more pages remain.
#[derive(Debug, Clone, Default)]
pub struct MetricsPage {
    pub metrics: Vec<ListedMetric>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Fetch one page of metrics matching the request
    async fn list_metrics(
        &self,
        request: &ListMetricsRequest,
        next_token: Option<String>,
    ) -> Result<MetricsPage>;

    /// Create or replace a dashboard, returning any validation messages
    async fn put_dashboard(&self, name: &str, body: &str) -> Result<Vec<String>>;
}
