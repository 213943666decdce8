// Dashboard domain model
use super::widget::Widget;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub name: String,
    pub widgets: Vec<Widget>,
}

#[derive(Serialize)]
struct DashboardBody<'a> {
    widgets: &'a [Widget],
}

impl Dashboard {
    pub fn new(name: String, widgets: Vec<Widget>) -> Self {
        Self { name, widgets }
    }

    /// Compact JSON body as submitted to the dashboard API.
    pub fn body(&self) -> serde_json::Result<String> {
        serde_json::to_string(&DashboardBody {
            widgets: &self.widgets,
        })
    }

    /// Indented JSON body for display.
    pub fn pretty_body(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&DashboardBody {
            widgets: &self.widgets,
        })
    }
}
