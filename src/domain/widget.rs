// Widget domain model
use super::metric::MetricRef;
use serde::Serialize;

/// A metric panel placed on the dashboard grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub height: u32,
    pub width: u32,
    pub x: u32,
    pub y: u32,
    pub properties: WidgetProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum View {
    #[serde(rename = "timeSeries")]
    TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetProperties {
    pub period: u32,
    pub view: View,
    pub stacked: bool,
    pub region: String,
    pub title: String,
    pub metrics: Vec<MetricRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    #[serde(rename = "yAxis", skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<YAxis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotations {
    pub horizontal: Vec<HorizontalAnnotation>,
}

/// A horizontal threshold line, e.g. an autoscaling trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizontalAnnotation {
    pub label: String,
    pub value: u32,
    pub color: String,
}

impl HorizontalAnnotation {
    pub fn new(label: &str, value: u32, color: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub left: AxisBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub min: u32,
    pub max: u32,
}
