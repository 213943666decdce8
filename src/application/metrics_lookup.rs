// Metrics lookup - Turns listed dimension values into widget series
use crate::application::metrics_repository::{ListMetricsRequest, MetricsRepository};
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::metric::{AxisSide, MetricRef, RenderProperties};
use crate::error::Result;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// What to plot: one metric, split by the values of one dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
    pub properties: RenderProperties,
    pub include_filter: Option<String>,
    pub exclude_filter: Option<String>,
    pub right_axis_items: Vec<String>,
}

impl MetricQuery {
    pub fn new(namespace: &str, metric_name: &str, dimension_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimension_name: dimension_name.to_string(),
            ..Default::default()
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_filter = Some(pattern.into());
        self
    }

    pub fn right_axis(mut self, items: &[String]) -> Self {
        self.right_axis_items = items.to_vec();
        self
    }

    fn request(&self) -> ListMetricsRequest {
        ListMetricsRequest {
            namespace: self.namespace.clone(),
            metric_name: self.metric_name.clone(),
            dimension_name: self.dimension_name.clone(),
        }
    }
}

/// Case-insensitive, unanchored include/exclude patterns.
#[derive(Debug, Clone, Default)]
pub struct DimensionFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl DimensionFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(compile).transpose()?,
            exclude: exclude.map(compile).transpose()?,
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        let included = self.include.as_ref().is_none_or(|re| re.is_match(value));
        let excluded = self.exclude.as_ref().is_some_and(|re| re.is_match(value));
        included && !excluded
    }
}

fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Filter, sort and dedupe raw dimension values
pub fn select_values<I>(values: I, filter: &DimensionFilter) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut selected: Vec<String> = values.into_iter().filter(|v| filter.matches(v)).collect();
    selected.sort();
    selected.dedup();
    selected
}

/// Build one series per value, labelled with the value itself
pub fn metric_refs(query: &MetricQuery, values: Vec<String>) -> Vec<MetricRef> {
    values
        .into_iter()
        .map(|value| {
            let mut properties = query.properties.clone();
            properties.label = Some(value.clone());
            if query.right_axis_items.contains(&value) {
                properties.y_axis = Some(AxisSide::Right);
            }
            MetricRef::new(
                query.namespace.clone(),
                query.metric_name.clone(),
                query.dimension_name.clone(),
                value,
                properties,
            )
        })
        .collect()
}

#[derive(Clone)]
pub struct MetricsLookup {
    repository: Arc<dyn MetricsRepository>,
    retry: RetryPolicy,
}

impl MetricsLookup {
    pub fn new(repository: Arc<dyn MetricsRepository>, retry: RetryPolicy) -> Self {
        Self { repository, retry }
    }

    /// All values of the query's dimension, across every listing page
    pub async fn dimension_values(&self, query: &MetricQuery) -> Result<Vec<String>> {
        let request = query.request();
        let repository = self.repository.as_ref();
        let mut values = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page_token = next_token.take();
            let request_ref = &request;
            let page = with_retry(&self.retry, "ListMetrics", move || {
                repository.list_metrics(request_ref, page_token.clone())
            })
            .await?;

            tracing::debug!(
                namespace = %request.namespace,
                metric = %request.metric_name,
                metrics = page.metrics.len(),
                "Fetched metrics page"
            );

            for metric in page.metrics {
                values.extend(
                    metric
                        .dimensions
                        .into_iter()
                        .filter(|d| d.name == request.dimension_name)
                        .map(|d| d.value),
                );
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(values)
    }

    pub async fn lookup(&self, query: &MetricQuery) -> Result<Vec<MetricRef>> {
        // Compile first so a bad pattern fails before any remote call
        let filter = DimensionFilter::new(
            query.include_filter.as_deref(),
            query.exclude_filter.as_deref(),
        )?;

        let values = select_values(self.dimension_values(query).await?, &filter);

        tracing::info!(
            namespace = %query.namespace,
            metric = %query.metric_name,
            dimension = %query.dimension_name,
            values = values.len(),
            "Resolved dimension values"
        );

        Ok(metric_refs(query, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::metrics_repository::{DimensionPair, ListedMetric, MetricsPage};
    use crate::error::{DashboardError, ErrorKind};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// Serves pre-baked pages in order, optionally failing the first call.
    struct PagedRepository {
        pages: Mutex<Vec<MetricsPage>>,
        tokens_seen: Mutex<Vec<Option<String>>>,
        fail_first: Mutex<Option<ErrorKind>>,
    }

    impl PagedRepository {
        fn new(pages: Vec<MetricsPage>) -> Self {
            Self {
                pages: Mutex::new(pages),
                tokens_seen: Mutex::new(Vec::new()),
                fail_first: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl MetricsRepository for PagedRepository {
        async fn list_metrics(
            &self,
            request: &ListMetricsRequest,
            next_token: Option<String>,
        ) -> Result<MetricsPage> {
            if let Some(kind) = self.fail_first.lock().unwrap().take() {
                return Err(DashboardError::ListMetrics {
                    namespace: request.namespace.clone(),
                    metric: request.metric_name.clone(),
                    kind,
                    message: "injected".to_string(),
                });
            }
            self.tokens_seen.lock().unwrap().push(next_token);
            let mut pages = self.pages.lock().unwrap();
            Ok(if pages.is_empty() {
                MetricsPage::default()
            } else {
                pages.remove(0)
            })
        }

        async fn put_dashboard(&self, _name: &str, _body: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn queue_metric(queue: &str) -> ListedMetric {
        ListedMetric {
            dimensions: vec![DimensionPair::new("queue", queue)],
        }
    }

    fn lookup_with(repository: PagedRepository) -> (Arc<PagedRepository>, MetricsLookup) {
        let repository = Arc::new(repository);
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);
        (repository.clone(), MetricsLookup::new(repository, policy))
    }

    #[test]
    fn test_select_values_filters_and_sorts() {
        let filter = DimensionFilter::new(Some("^edx.lms"), None).unwrap();
        let values = owned(&[
            "edx.lms.core.high",
            "edx.cms.core.default",
            "EDX.LMS.core.ace",
            "edx.lms.core.default",
            "ecommerce.fulfillment",
        ]);

        assert_eq!(
            select_values(values, &filter),
            owned(&["EDX.LMS.core.ace", "edx.lms.core.default", "edx.lms.core.high"])
        );
    }

    #[test]
    fn test_exclude_filter_drops_matches() {
        let filter = DimensionFilter::new(Some("edx"), Some("default$")).unwrap();
        let values = owned(&["edx.lms.core.default", "edx.lms.core.high", "celery"]);

        assert_eq!(select_values(values, &filter), owned(&["edx.lms.core.high"]));
    }

    #[test]
    fn test_select_values_removes_duplicates() {
        let values = owned(&["b", "a", "b", "a"]);
        assert_eq!(select_values(values, &DimensionFilter::default()), owned(&["a", "b"]));
    }

    #[test]
    fn test_include_is_unanchored_search() {
        let filter = DimensionFilter::new(Some("celery"), None).unwrap();
        assert!(filter.matches("ecommerce.celery"));
        assert!(filter.matches("Celery"));
        assert!(!filter.matches("ecommerce.fulfillment"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = DimensionFilter::new(Some("edx.(lms"), None).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidFilter(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_metric_refs_label_values_and_mark_right_axis() {
        let query = MetricQuery::new("celery/prod-edx", "queue_length", "queue")
            .right_axis(&owned(&["edx.lms.core.ace"]));

        let refs = metric_refs(&query, owned(&["edx.lms.core.ace", "edx.lms.core.default"]));

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].dimension_value, "edx.lms.core.ace");
        assert_eq!(refs[0].properties.label.as_deref(), Some("edx.lms.core.ace"));
        assert_eq!(refs[0].properties.y_axis, Some(AxisSide::Right));
        assert_eq!(refs[1].properties.label.as_deref(), Some("edx.lms.core.default"));
        assert_eq!(refs[1].properties.y_axis, None);
    }

    #[test]
    fn test_metric_refs_keep_base_properties() {
        let mut query = MetricQuery::new("AWS/EC2", "CPUUtilization", "AutoScalingGroupName");
        query.properties.period = Some(300);

        let refs = metric_refs(&query, owned(&["asg-1"]));

        assert_eq!(refs[0].properties.period, Some(300));
        assert_eq!(refs[0].properties.label.as_deref(), Some("asg-1"));
    }

    #[tokio::test]
    async fn test_lookup_follows_pages_and_ignores_other_dimensions() {
        let pages = vec![
            MetricsPage {
                metrics: vec![
                    queue_metric("edx.lms.core.high"),
                    ListedMetric {
                        dimensions: vec![
                            DimensionPair::new("host", "worker-1"),
                            DimensionPair::new("queue", "edx.cms.core.default"),
                        ],
                    },
                ],
                next_token: Some("page-2".to_string()),
            },
            MetricsPage {
                metrics: vec![queue_metric("edx.lms.core.default"), queue_metric("edx.lms.core.high")],
                next_token: None,
            },
        ];
        let (repository, lookup) = lookup_with(PagedRepository::new(pages));

        let query = MetricQuery::new("celery/prod-edx", "queue_length", "queue");
        let refs = lookup.lookup(&query).await.unwrap();

        let values: Vec<&str> = refs.iter().map(|r| r.dimension_value.as_str()).collect();
        assert_eq!(
            values,
            vec!["edx.cms.core.default", "edx.lms.core.default", "edx.lms.core.high"]
        );
        assert_eq!(
            *repository.tokens_seen.lock().unwrap(),
            vec![None, Some("page-2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_lookup_applies_exclude_filter() {
        let (_, lookup) = lookup_with(PagedRepository::new(vec![MetricsPage {
            metrics: vec![
                queue_metric("edx.lms.core.default"),
                queue_metric("edx.lms.core.high"),
                queue_metric("EDX.LMS.CORE.HIGH_MEM"),
                queue_metric("edx.cms.core.high"),
            ],
            next_token: None,
        }]));

        let mut query = MetricQuery::new("celery/prod-edx", "queue_length", "queue").include("^edx.lms");
        query.exclude_filter = Some("high".to_string());
        let refs = lookup.lookup(&query).await.unwrap();

        let values: Vec<&str> = refs.iter().map(|r| r.dimension_value.as_str()).collect();
        assert_eq!(values, vec!["edx.lms.core.default"]);
    }

    #[tokio::test]
    async fn test_lookup_rejects_bad_exclude_before_listing() {
        let (repository, lookup) = lookup_with(PagedRepository::new(Vec::new()));

        let mut query = MetricQuery::new("celery/prod-edx", "queue_length", "queue");
        query.exclude_filter = Some("(".to_string());
        let result = lookup.lookup(&query).await;

        assert!(matches!(result, Err(DashboardError::InvalidFilter(_))));
        assert!(repository.tokens_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_retries_transient_listing_failure() {
        let repository = PagedRepository::new(vec![MetricsPage {
            metrics: vec![queue_metric("celery")],
            next_token: None,
        }]);
        *repository.fail_first.lock().unwrap() = Some(ErrorKind::Transient);
        let (_, lookup) = lookup_with(repository);

        let refs = lookup
            .lookup(&MetricQuery::new("celery/prod-edx", "queue_length", "queue"))
            .await
            .unwrap();

        assert_eq!(refs.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_surfaces_permanent_listing_failure() {
        let repository = PagedRepository::new(Vec::new());
        *repository.fail_first.lock().unwrap() = Some(ErrorKind::Permanent);
        let (repository, lookup) = lookup_with(repository);

        let result = lookup
            .lookup(&MetricQuery::new("celery/prod-edx", "queue_length", "queue"))
            .await;

        assert!(result.is_err());
        assert!(repository.tokens_seen.lock().unwrap().is_empty());
    }
}
