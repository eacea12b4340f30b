//! SQLite-backed cache registry.
//!
//! One connection behind an async mutex; the lookup-or-create sequence
//! runs in a single transaction so concurrent planners requesting the
//! same column set converge on one cache id and one physical table. The
//! insert is conflict-tolerant (`ON CONFLICT DO NOTHING`), with a
//! read-repair re-query when another request wins the race.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    fingerprint, physical_schema, CacheId, CacheRegistry, RegistryError, RegistryResult,
};
use crate::catalog::LogTypeCatalog;
use crate::request::TenantId;
use crate::sql::{col, param, CreateTable, ExprExt, Insert, Query, TableRef};

/// Metadata table holding one row per cache record.
const META_TABLE: &str = "log_cache";

/// Bound on the optimistic insert / read-repair loop.
const MAX_CREATE_ATTEMPTS: usize = 3;

/// SQLite-backed [`CacheRegistry`].
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    /// Open or create the registry database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory registry (for testing).
    pub fn open_in_memory() -> RegistryResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the metadata table if it does not exist.
    fn init(conn: &Connection) -> RegistryResult<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS log_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                log_type TEXT NOT NULL,
                tenant_id INTEGER NOT NULL,
                fingerprint TEXT NOT NULL,
                extraction_sql TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE (log_type, tenant_id, fingerprint)
            );
            ",
        )?;
        Ok(())
    }

    fn lookup_sql() -> String {
        Query::new()
            .select(vec![col("id")])
            .from(TableRef::new(META_TABLE))
            .filter(col("log_type").eq(param(1)))
            .filter(col("tenant_id").eq(param(2)))
            .filter(col("fingerprint").eq(param(3)))
            .to_sql()
    }

    fn insert_sql() -> String {
        Insert::into(META_TABLE)
            .columns([
                "log_type",
                "tenant_id",
                "fingerprint",
                "extraction_sql",
                "created_at",
            ])
            .values([param(1), param(2), param(3), param(4), param(5)])
            .on_conflict_do_nothing()
            .returning(["id"])
            .to_sql()
    }
}

#[async_trait]
impl CacheRegistry for SqliteRegistry {
    async fn lookup(
        &self,
        log_type: &str,
        tenant_id: TenantId,
        cache_columns: &BTreeSet<String>,
    ) -> RegistryResult<Option<CacheId>> {
        let fp = fingerprint(cache_columns.iter().map(String::as_str));
        let conn = self.conn.lock().await;
        let id: Option<i64> = conn
            .query_row(
                &Self::lookup_sql(),
                params![log_type, tenant_id, fp],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(CacheId))
    }

    async fn lookup_or_create(
        &self,
        log_type: &LogTypeCatalog,
        tenant_id: TenantId,
        cache_columns: &BTreeSet<String>,
        extraction_sql: &str,
    ) -> RegistryResult<CacheId> {
        let fp = fingerprint(cache_columns.iter().map(String::as_str));
        let schema = physical_schema(log_type, cache_columns)?;
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        // Optimistic insert; on conflict, read-repair from the winner.
        let mut id: Option<i64> = None;
        for _ in 0..MAX_CREATE_ATTEMPTS {
            let inserted: Option<i64> = tx
                .query_row(
                    &Self::insert_sql(),
                    params![log_type.id, tenant_id, fp, extraction_sql, created_at],
                    |row| row.get(0),
                )
                .optional()?;

            id = match inserted {
                Some(new_id) => {
                    debug!(log_type = %log_type.id, tenant_id, cache_id = new_id, "created cache record");
                    Some(new_id)
                }
                None => tx
                    .query_row(
                        &Self::lookup_sql(),
                        params![log_type.id, tenant_id, fp],
                        |row| row.get(0),
                    )
                    .optional()?,
            };
            if id.is_some() {
                break;
            }
        }
        let cache_id = CacheId(id.ok_or_else(|| RegistryError::LostInsert(fp.clone()))?);

        let create = CreateTable::new(cache_id.table_name())
            .if_not_exists()
            .columns(schema)
            .to_sql();
        tx.execute(&create, [])?;
        tx.commit()?;

        info!(log_type = %log_type.id, tenant_id, cache_id = cache_id.0, "cache table ready");
        Ok(cache_id)
    }

    async fn extraction_sql(&self, id: CacheId) -> RegistryResult<Option<String>> {
        let conn = self.conn.lock().await;
        let sql: Option<String> = conn
            .query_row(
                "SELECT extraction_sql FROM log_cache WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(sql)
    }
}
