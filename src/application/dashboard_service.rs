// Dashboard service - Use case for building and publishing the queues dashboard
use crate::application::metrics_lookup::{MetricQuery, MetricsLookup};
use crate::application::metrics_repository::MetricsRepository;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::application::widget_builder::{assemble_widget, WidgetSpec};
use crate::domain::dashboard::Dashboard;
use crate::domain::widget::{AxisBounds, HorizontalAnnotation};
use crate::infrastructure::config::LayoutSettings;
use std::sync::Arc;

const CPU_HEIGHT: u32 = 9;
const WORKER_COUNT_HEIGHT: u32 = 6;
const QUEUE_HEIGHT: u32 = 9;

/// Deployments that run the ecommerce workers alongside the platform.
const ECOMMERCE_DEPLOYS: [&str; 2] = ["edx", "edge"];

/// The dashboard being generated: one environment of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardTarget {
    pub environment: String,
    pub deploy: String,
    pub region: String,
}

impl DashboardTarget {
    pub fn new(environment: &str, deploy: &str, region: &str) -> Self {
        Self {
            environment: environment.to_string(),
            deploy: deploy.to_string(),
            region: region.to_string(),
        }
    }

    /// `{environment}-{deploy}`, the prefix shared by titles and namespaces
    pub fn prefix(&self) -> String {
        format!("{}-{}", self.environment, self.deploy)
    }

    pub fn dashboard_name(&self) -> String {
        format!("{}-queues", self.prefix())
    }

    fn celery_namespace(&self) -> String {
        format!("celery/{}", self.prefix())
    }

    fn xqueue_namespace(&self) -> String {
        format!("xqueue/{}", self.prefix())
    }

    fn has_xqueue(&self) -> bool {
        self.environment == "prod" && self.deploy == "edx"
    }

    fn has_ecommerce(&self) -> bool {
        ECOMMERCE_DEPLOYS.contains(&self.deploy.as_str())
    }
}

/// A widget's layout together with the series query that fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetPlan {
    pub spec: WidgetSpec,
    pub query: MetricQuery,
}

/// Stacks widgets vertically in insertion order.
struct PlanBuilder<'a> {
    target: &'a DashboardTarget,
    layout: &'a LayoutSettings,
    next_y: u32,
    plans: Vec<WidgetPlan>,
}

impl<'a> PlanBuilder<'a> {
    fn new(target: &'a DashboardTarget, layout: &'a LayoutSettings) -> Self {
        Self {
            target,
            layout,
            next_y: 0,
            plans: Vec::new(),
        }
    }

    fn push(&mut self, title: String, height: u32, query: MetricQuery) -> &mut WidgetSpec {
        let mut spec = WidgetSpec::new(title, self.next_y, height);
        spec.width = self.layout.width;
        spec.period = self.layout.period;
        spec.region = self.target.region.clone();
        self.next_y += height;
        self.plans.push(WidgetPlan { spec, query });
        let last = self.plans.len() - 1;
        &mut self.plans[last].spec
    }

    fn finish(self) -> Vec<WidgetPlan> {
        self.plans
    }
}

/// The fixed widget sequence for a target, top to bottom
pub fn plan_widgets(target: &DashboardTarget, layout: &LayoutSettings) -> Vec<WidgetPlan> {
    let prefix = target.prefix();
    let celery = target.celery_namespace();
    let right_axis = &layout.right_axis_queues;
    let mut builder = PlanBuilder::new(target, layout);

    let cpu = builder.push(
        format!("{prefix}-Worker ASG Average CPU"),
        CPU_HEIGHT,
        MetricQuery::new("AWS/EC2", "CPUUtilization", "AutoScalingGroupName")
            .include(format!("{}-Worker", regex::escape(&prefix))),
    );
    cpu.annotations = vec![
        HorizontalAnnotation::new("Scale Up", 90, "#d62728"),
        HorizontalAnnotation::new("Scale Down", 45, "#2ca02c"),
    ];
    cpu.left_axis = Some(AxisBounds { min: 0, max: 100 });

    let workers = builder.push(
        format!("{prefix}-Worker Count"),
        WORKER_COUNT_HEIGHT,
        MetricQuery::new(&celery, "count", "workers"),
    );
    workers.stacked = true;

    builder.push(
        format!("{prefix} All Celery Queues"),
        QUEUE_HEIGHT,
        MetricQuery::new(&celery, "queue_length", "queue").right_axis(right_axis),
    );

    builder.push(
        format!("{prefix} All Queues Next Task Age"),
        QUEUE_HEIGHT,
        MetricQuery::new(&celery, "next_task_age", "queue"),
    );

    builder.push(
        format!("{prefix} LMS Queues"),
        QUEUE_HEIGHT,
        MetricQuery::new(&celery, "queue_length", "queue")
            .include("^edx.lms")
            .right_axis(right_axis),
    );

    builder.push(
        format!("{prefix} CMS Queues"),
        QUEUE_HEIGHT,
        MetricQuery::new(&celery, "queue_length", "queue")
            .include("^edx.cms")
            .right_axis(right_axis),
    );

    if target.has_xqueue() {
        builder.push(
            format!("{prefix} Xqueue Queues"),
            QUEUE_HEIGHT,
            MetricQuery::new(&target.xqueue_namespace(), "queue_length", "queue"),
        );
    }

    if target.has_ecommerce() {
        builder.push(
            format!("{prefix} Ecommerce"),
            QUEUE_HEIGHT,
            MetricQuery::new(&celery, "queue_length", "queue").include(r"^ecommerce\."),
        );

        builder.push(
            format!("{prefix} Legacy Celery (Ecommerce) should be 0"),
            QUEUE_HEIGHT,
            MetricQuery::new(&celery, "queue_length", "queue").include("celery"),
        );
    }

    builder.finish()
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn MetricsRepository>,
    lookup: MetricsLookup,
    retry: RetryPolicy,
    layout: LayoutSettings,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn MetricsRepository>,
        retry: RetryPolicy,
        layout: LayoutSettings,
    ) -> Self {
        Self {
            lookup: MetricsLookup::new(repository.clone(), retry),
            repository,
            retry,
            layout,
        }
    }

    pub async fn build(&self, target: &DashboardTarget) -> crate::error::Result<Dashboard> {
        let mut widgets = Vec::new();

        for plan in plan_widgets(target, &self.layout) {
            let metrics = self.lookup.lookup(&plan.query).await?;
            tracing::info!(
                title = %plan.spec.title,
                y = plan.spec.y,
                series = metrics.len(),
                "Assembled widget"
            );
            widgets.push(assemble_widget(&plan.spec, metrics));
        }

        Ok(Dashboard::new(target.dashboard_name(), widgets))
    }

    pub async fn publish(&self, dashboard: &Dashboard) -> crate::error::Result<()> {
        let body = dashboard.body()?;
        let repository = self.repository.as_ref();
        let name = dashboard.name.as_str();
        let body_ref = body.as_str();

        let messages = with_retry(&self.retry, "PutDashboard", move || {
            repository.put_dashboard(name, body_ref)
        })
        .await?;

        for message in &messages {
            tracing::warn!(dashboard = %dashboard.name, "Dashboard validation: {}", message);
        }
        tracing::info!(
            dashboard = %dashboard.name,
            widgets = dashboard.widgets.len(),
            "Published dashboard"
        );

        Ok(())
    }
}
