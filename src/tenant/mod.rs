//! External collaborators: the tenant directory and foreign connections.
//!
//! Both are async trait objects injected into the planner. The directory
//! resolves tenant identity, ownership, and time zones (typically fronted
//! by a short-TTL cache on the implementor's side); the broker initializes
//! named cross-database connections before a plan referencing them runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::OwnerKind;
use crate::request::{TenantId, TenantScope};

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Infrastructure failure while talking to the tenant directory.
#[derive(Debug, Clone, thiserror::Error)]
#[error("tenant directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// Result type for connection initialization.
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Infrastructure failure while initializing a foreign connection.
#[derive(Debug, Clone, thiserror::Error)]
#[error("connection '{name}' failed: {message}")]
pub struct ConnectError {
    pub name: String,
    pub message: String,
}

/// One tenant as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub id: TenantId,
    pub name: String,
}

/// Directory of tenants and their owning identities.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Tenants visible under `scope`, optionally filtered by owning
    /// parent, for one owner role.
    async fn get_tenants(
        &self,
        scope: &TenantScope,
        parent: Option<TenantId>,
        owner_kind: OwnerKind,
    ) -> DirectoryResult<Vec<TenantInfo>>;

    /// The parent identity owning a tenant's rows for one owner role.
    /// `None` means the tenant has no such owner and must be denied.
    async fn get_owner(
        &self,
        tenant_id: TenantId,
        owner_kind: OwnerKind,
    ) -> DirectoryResult<Option<TenantInfo>>;

    /// The tenant's configured IANA time zone.
    async fn get_time_zone(&self, tenant_id: TenantId) -> DirectoryResult<String>;
}

/// Initializer for named foreign dimension connections.
///
/// `connect` is awaited once per distinct connection name before the plan
/// is handed to the execution layer; initializations for distinct names
/// are independent and are issued concurrently.
#[async_trait]
pub trait ConnectionBroker: Send + Sync {
    async fn connect(&self, name: &str) -> ConnectResult<()>;
}
