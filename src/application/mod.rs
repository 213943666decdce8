// Application layer - Lookup, widget assembly and dashboard use cases
pub mod dashboard_service;
pub mod metrics_lookup;
pub mod metrics_repository;
pub mod retry;
pub mod widget_builder;
