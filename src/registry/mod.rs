//! Durable cache registry.
//!
//! Maps `(log type, tenant, column-set fingerprint)` to a cache id that
//! owns one physical cache table, created lazily and idempotently on
//! first request. The registry never deletes anything; retention and
//! refresh belong to the external extraction scheduler, which reads the
//! compiled extraction SQL persisted alongside each metadata row.

mod fingerprint;
mod sqlite;

pub use fingerprint::{fingerprint, is_time_partition, TIME_PARTITION_COLUMNS};
pub use sqlite::SqliteRegistry;

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::LogTypeCatalog;
use crate::request::TenantId;
use crate::sql::{ColumnDef, DataType};

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised by the cache registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cache row for fingerprint '{0}' vanished during creation")]
    LostInsert(String),

    #[error("column '{0}' is not declared in the catalog")]
    UnknownColumn(String),

    #[error("column '{0}' has no storage type and cannot back a cache table")]
    MissingStorageType(String),
}

/// Identifier of one cache record and its physical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheId(pub i64);

impl CacheId {
    /// Deterministic physical table name for this record.
    pub fn table_name(&self) -> String {
        format!("log_cache_{}", self.0)
    }
}

impl std::fmt::Display for CacheId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable registry of per-tenant cache tables.
///
/// `lookup_or_create` must be atomic and conflict-tolerant: concurrent
/// calls for the same `(log type, tenant, column set)` converge on one
/// cache id and one physical table.
#[async_trait]
pub trait CacheRegistry: Send + Sync {
    /// Find an existing cache record, without creating anything.
    async fn lookup(
        &self,
        log_type: &str,
        tenant_id: TenantId,
        cache_columns: &BTreeSet<String>,
    ) -> RegistryResult<Option<CacheId>>;

    /// Find or idempotently create the cache record and its physical
    /// table, persisting `extraction_sql` with the metadata row.
    async fn lookup_or_create(
        &self,
        log_type: &LogTypeCatalog,
        tenant_id: TenantId,
        cache_columns: &BTreeSet<String>,
        extraction_sql: &str,
    ) -> RegistryResult<CacheId>;

    /// The extraction SQL persisted for a cache record, for the external
    /// scheduler.
    async fn extraction_sql(&self, id: CacheId) -> RegistryResult<Option<String>>;
}

/// Derive the physical column layout of a cache table.
///
/// The intrinsic columns (synthetic row id, `date`, `hour`) come first,
/// then one column per non-aggregate cache entry, then one per aggregate
/// entry, each typed by its catalog storage type.
pub fn physical_schema(
    log_type: &LogTypeCatalog,
    cache_columns: &BTreeSet<String>,
) -> RegistryResult<Vec<ColumnDef>> {
    let mut columns = vec![
        ColumnDef::new("id", DataType::Integer).primary_key_autoincrement(),
        ColumnDef::new("date", DataType::Date),
        ColumnDef::new("hour", DataType::BigInt),
    ];

    let mut aggregates = Vec::new();
    for name in cache_columns {
        if is_time_partition(name) {
            continue;
        }
        let spec = log_type
            .get(name)
            .ok_or_else(|| RegistryError::UnknownColumn(name.clone()))?;
        let storage = spec
            .storage_type
            .ok_or_else(|| RegistryError::MissingStorageType(name.clone()))?;
        let def = ColumnDef::new(name.as_str(), storage);
        if spec.is_aggregate {
            aggregates.push(def);
        } else {
            columns.push(def);
        }
    }
    columns.extend(aggregates);

    Ok(columns)
}
