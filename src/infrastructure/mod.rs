// Infrastructure layer - External dependencies and adapters
pub mod cloudwatch_repository;
pub mod config;
