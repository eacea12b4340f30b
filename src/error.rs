//! Caller-facing error taxonomy for view planning.
//!
//! The first five variants are request errors: non-retryable, the request
//! itself must change, and each carries enough detail to identify the
//! offending log type, column, or view id. The remaining variants wrap
//! infrastructure failures, which abort the whole planning call - a plan
//! is never returned with a join or connection silently missing.

use crate::registry::RegistryError;
use crate::request::TenantId;
use crate::tenant::{ConnectError, DirectoryError};

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Unified error type for `plan_view`, `list_views`, and `get_view`.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Requested log type absent from the catalog.
    #[error("unknown log type '{0}'")]
    InvalidLogType(String),

    /// Tenant outside the caller's scope, or no owning identity found.
    #[error("access denied for tenant {tenant_id}: {reason}")]
    AccessDenied { tenant_id: TenantId, reason: String },

    /// Resolved cache-column count outside the configured bound.
    #[error("resolved {count} cache columns; requests must resolve to between 1 and {max}")]
    ColumnCountOutOfBounds { count: usize, max: usize },

    /// A resolved cache column is absent from the catalog. Defensive:
    /// a correct resolver never produces one.
    #[error("column '{column}' is not in the catalog for log type '{log_type}'")]
    UnknownColumn { log_type: String, column: String },

    /// `get_view` was given an identifier not matching the expected
    /// `<log_type>_<tenant_id>` pattern.
    #[error("invalid view identifier '{0}'")]
    InvalidViewIdentifier(String),

    // ===== Infrastructure failures =====
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

impl PlanError {
    /// True for errors the caller can fix by changing the request.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            PlanError::InvalidLogType(_)
                | PlanError::AccessDenied { .. }
                | PlanError::ColumnCountOutOfBounds { .. }
                | PlanError::UnknownColumn { .. }
                | PlanError::InvalidViewIdentifier(_)
        )
    }
}
