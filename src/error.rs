// Error types shared by the application and infrastructure layers
use thiserror::Error;

/// Whether a failed remote call is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("listing {namespace}/{metric} failed: {message}")]
    ListMetrics {
        namespace: String,
        metric: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("publishing dashboard {dashboard} failed: {message}")]
    PutDashboard {
        dashboard: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("invalid dimension filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("dashboard serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn is_transient(&self) -> bool {
        match self {
            DashboardError::ListMetrics { kind, .. } | DashboardError::PutDashboard { kind, .. } => {
                *kind == ErrorKind::Transient
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
