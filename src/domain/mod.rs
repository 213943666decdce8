// Domain layer - Dashboard value types and their JSON shape
pub mod dashboard;
pub mod metric;
pub mod widget;
