// Widget assembly - Pure conversion of layout + series into a widget
use crate::domain::metric::MetricRef;
use crate::domain::widget::{
    Annotations, AxisBounds, HorizontalAnnotation, View, Widget, WidgetKind, WidgetProperties,
    YAxis,
};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_WIDTH: u32 = 24;
pub const DEFAULT_PERIOD: u32 = 60;

const TITLE_SUFFIX: &str = " (auto-generated)";

/// Position, size and rendering options of a widget, without its series.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub stacked: bool,
    pub region: String,
    pub period: u32,
    pub annotations: Vec<HorizontalAnnotation>,
    pub left_axis: Option<AxisBounds>,
}

impl WidgetSpec {
    pub fn new(title: impl Into<String>, y: u32, height: u32) -> Self {
        Self {
            x: 0,
            y,
            width: DEFAULT_WIDTH,
            height,
            title: title.into(),
            stacked: false,
            region: DEFAULT_REGION.to_string(),
            period: DEFAULT_PERIOD,
            annotations: Vec::new(),
            left_axis: None,
        }
    }
}

pub fn assemble_widget(spec: &WidgetSpec, metrics: Vec<MetricRef>) -> Widget {
    let annotations = if spec.annotations.is_empty() {
        None
    } else {
        Some(Annotations {
            horizontal: spec.annotations.clone(),
        })
    };

    Widget {
        kind: WidgetKind::Metric,
        height: spec.height,
        width: spec.width,
        x: spec.x,
        y: spec.y,
        properties: WidgetProperties {
            period: spec.period,
            view: View::TimeSeries,
            stacked: spec.stacked,
            region: spec.region.clone(),
            title: format!("{}{}", spec.title, TITLE_SUFFIX),
            metrics,
            annotations,
            y_axis: spec.left_axis.map(|left| YAxis { left }),
        },
    }
}
