// Metric reference domain model
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Axis override for a series; series default to the left axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Right,
}

/// Per-series rendering options. Unset options are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RenderProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "yAxis", skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<AxisSide>,
}

/// One series of a metric widget, identified by a single dimension value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRef {
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
    pub dimension_value: String,
    pub properties: RenderProperties,
}

impl MetricRef {
    pub fn new(
        namespace: String,
        metric_name: String,
        dimension_name: String,
        dimension_value: String,
        properties: RenderProperties,
    ) -> Self {
        Self {
            namespace,
            metric_name,
            dimension_name,
            dimension_value,
            properties,
        }
    }
}

// Dashboard bodies expect the array form:
// [Namespace, MetricName, DimensionName, DimensionValue, {rendering properties}]
impl Serialize for MetricRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.namespace)?;
        seq.serialize_element(&self.metric_name)?;
        seq.serialize_element(&self.dimension_name)?;
        seq.serialize_element(&self.dimension_value)?;
        seq.serialize_element(&self.properties)?;
        seq.end()
    }
}
