// CloudWatch repository implementation
use crate::application::metrics_repository::{
    DimensionPair, ListMetricsRequest, ListedMetric, MetricsPage, MetricsRepository,
};
use crate::error::{DashboardError, ErrorKind, Result};
use crate::infrastructure::config::AwsSettings;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_cloudwatch::config::Region;
use aws_sdk_cloudwatch::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatch::types::DimensionFilter;
use aws_sdk_cloudwatch::Client;

/// Error codes CloudWatch returns for throttling and server-side faults.
const TRANSIENT_CODES: [&str; 6] = [
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "LimitExceeded",
    "InternalServiceFault",
    "ServiceUnavailable",
];

#[derive(Debug, Clone)]
pub struct CloudWatchRepository {
    client: Client,
}

impl CloudWatchRepository {
    /// Build a client from the standard AWS credential chain.
    pub async fn connect(settings: &AwsSettings) -> Self {
        Self::from_loader(sdk_loader(settings)).await
    }

    async fn from_loader(loader: ConfigLoader) -> Self {
        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
        }
    }
}

/// SDK retries are disabled; `RetryPolicy` owns the attempt count.
fn sdk_loader(settings: &AwsSettings) -> ConfigLoader {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .retry_config(RetryConfig::disabled());

    if let Some(endpoint) = settings.endpoint() {
        tracing::info!(endpoint, "Using custom CloudWatch endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    loader
}

pub(crate) fn classify_code(code: Option<&str>) -> ErrorKind {
    match code {
        Some(code) if TRANSIENT_CODES.contains(&code) => ErrorKind::Transient,
        _ => ErrorKind::Permanent,
    }
}

fn classify<E, R>(err: &SdkError<E, R>) -> ErrorKind
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ErrorKind::Transient
        }
        SdkError::ServiceError(service) => classify_code(service.err().code()),
        _ => ErrorKind::Permanent,
    }
}

#[async_trait]
impl MetricsRepository for CloudWatchRepository {
    async fn list_metrics(
        &self,
        request: &ListMetricsRequest,
        next_token: Option<String>,
    ) -> Result<MetricsPage> {
        let dimension = DimensionFilter::builder()
            .name(&request.dimension_name)
            .build();

        let output = self
            .client
            .list_metrics()
            .namespace(&request.namespace)
            .metric_name(&request.metric_name)
            .dimensions(dimension)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|err| DashboardError::ListMetrics {
                namespace: request.namespace.clone(),
                metric: request.metric_name.clone(),
                kind: classify(&err),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let metrics = output
            .metrics()
            .iter()
            .map(|metric| ListedMetric {
                dimensions: metric
                    .dimensions()
                    .iter()
                    .filter_map(|d| Some(DimensionPair::new(d.name()?, d.value()?)))
                    .collect(),
            })
            .collect();

        Ok(MetricsPage {
            metrics,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn put_dashboard(&self, name: &str, body: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .put_dashboard()
            .dashboard_name(name)
            .dashboard_body(body)
            .send()
            .await
            .map_err(|err| DashboardError::PutDashboard {
                dashboard: name.to_string(),
                kind: classify(&err),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(output
            .dashboard_validation_messages()
            .iter()
            .map(|m| match m.data_path() {
                Some(path) => format!("{}: {}", path, m.message().unwrap_or_default()),
                None => m.message().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
