//! Shared fixtures: a small ad-analytics catalog, a canned tenant
//! directory, and a recording connection broker.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use vantage::catalog::{
    AccessTier, Catalog, ColumnCategory, ColumnSpec, FastView, JoinKind, JoinSpec,
    LogTypeCatalog, OwnerKind,
};
use vantage::config::PlannerSettings;
use vantage::planner::ViewPlanner;
use vantage::registry::SqliteRegistry;
use vantage::request::{TenantId, TenantScope};
use vantage::sql::DataType;
use vantage::tenant::{
    ConnectError, ConnectResult, ConnectionBroker, DirectoryResult, TenantDirectory, TenantInfo,
};

/// Tenant 7 ("Acme Media") is owned by advertiser 42; tenant 8 has no
/// owning identity and must be denied.
pub const TENANT: TenantId = 7;
pub const ORPHAN_TENANT: TenantId = 8;
pub const OWNER: i64 = 42;

pub fn catalog() -> Catalog {
    let impressions =
        LogTypeCatalog::new("impressions", "Impressions", "raw_impressions", OwnerKind::Advertiser)
            .column(
                ColumnSpec::new("camp_code", ColumnCategory::Text)
                    .tier(AccessTier::Public)
                    .storage(DataType::Text)
                    .fast_view("fv_campaign"),
            )
            .column(
                ColumnSpec::new("camp_name", ColumnCategory::Text)
                    .depends_on(["camp_code"])
                    .presentation("\"dim_campaign\".\"name\"")
                    .join(JoinSpec {
                        kind: JoinKind::Left,
                        target: "dim_campaign".into(),
                        left_column: "camp_code".into(),
                        right_column: "code".into(),
                        connection: Some("dimdb".into()),
                    }),
            )
            .column(ColumnSpec::new("campaign", ColumnCategory::Text).alias_for("camp_name"))
            .column(
                ColumnSpec::new("clicks", ColumnCategory::Numeric)
                    .storage(DataType::BigInt)
                    .aggregate(),
            )
            .column(
                ColumnSpec::new("spend", ColumnCategory::Numeric)
                    .tier(AccessTier::Partner)
                    .storage(DataType::Double)
                    .aggregate()
                    .source_expr("SUM(\"price\" / 1000.0)"),
            )
            .column(
                ColumnSpec::new("bid_floor", ColumnCategory::Numeric)
                    .tier(AccessTier::Internal)
                    .storage(DataType::Double),
            );

    let fast_campaign = FastView::new(
        "fv_campaign",
        5_000,
        "(SELECT * FROM \"fast_campaign\" WHERE \"advertiser_id\" = {owner})",
    )
    .on_connection("fastdb");

    Catalog::new([impressions], [fast_campaign]).expect("fixture catalog is valid")
}

/// Directory with a fixed tenant table.
pub struct StubDirectory {
    tenants: BTreeMap<TenantId, TenantInfo>,
    owners: BTreeMap<TenantId, TenantInfo>,
}

impl StubDirectory {
    pub fn new() -> Self {
        let mut tenants = BTreeMap::new();
        tenants.insert(
            TENANT,
            TenantInfo {
                id: TENANT,
                name: "Acme Media".into(),
            },
        );
        tenants.insert(
            ORPHAN_TENANT,
            TenantInfo {
                id: ORPHAN_TENANT,
                name: "Orphan Co".into(),
            },
        );

        let mut owners = BTreeMap::new();
        owners.insert(
            TENANT,
            TenantInfo {
                id: OWNER,
                name: "Acme Holdings".into(),
            },
        );

        Self { tenants, owners }
    }
}

#[async_trait]
impl TenantDirectory for StubDirectory {
    async fn get_tenants(
        &self,
        scope: &TenantScope,
        _parent: Option<TenantId>,
        _owner_kind: OwnerKind,
    ) -> DirectoryResult<Vec<TenantInfo>> {
        Ok(self
            .tenants
            .values()
            .filter(|t| scope.contains(t.id))
            .cloned()
            .collect())
    }

    async fn get_owner(
        &self,
        tenant_id: TenantId,
        _owner_kind: OwnerKind,
    ) -> DirectoryResult<Option<TenantInfo>> {
        Ok(self.owners.get(&tenant_id).cloned())
    }

    async fn get_time_zone(&self, _tenant_id: TenantId) -> DirectoryResult<String> {
        Ok("America/New_York".into())
    }
}

/// Broker that records connect calls and can be told to fail one name.
#[derive(Default)]
pub struct RecordingBroker {
    pub connected: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
}

impl RecordingBroker {
    pub fn failing_on(name: &str) -> Self {
        Self {
            connected: Mutex::new(Vec::new()),
            fail_on: Some(name.into()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.connected.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConnectionBroker for RecordingBroker {
    async fn connect(&self, name: &str) -> ConnectResult<()> {
        if self.fail_on.as_deref() == Some(name) {
            return Err(ConnectError {
                name: name.into(),
                message: "stub failure".into(),
            });
        }
        self.connected.lock().unwrap().push(name.into());
        Ok(())
    }
}

/// The fixture catalog with every fast-view candidate stripped, forcing
/// the durable cache path.
pub fn catalog_without_fast_views() -> Catalog {
    let full = catalog();
    let mut log_types = Vec::new();
    for log_type in full.log_types() {
        let mut stripped = LogTypeCatalog::new(
            &log_type.id,
            &log_type.display_name,
            &log_type.source_table,
            log_type.owner_kind,
        );
        for spec in log_type.columns.values() {
            let mut spec = spec.clone();
            spec.fast_views.clear();
            stripped = stripped.column(spec);
        }
        log_types.push(stripped);
    }
    Catalog::new(log_types, []).expect("stripped catalog is valid")
}

/// Planner wired to the fixture catalog, an in-memory registry, and the
/// stub collaborators. Returns the broker and registry for inspection.
pub fn planner() -> (ViewPlanner, Arc<RecordingBroker>, Arc<SqliteRegistry>) {
    planner_with(catalog(), RecordingBroker::default())
}

pub fn planner_with_broker(
    broker: RecordingBroker,
) -> (ViewPlanner, Arc<RecordingBroker>, Arc<SqliteRegistry>) {
    planner_with(catalog(), broker)
}

pub fn planner_with(
    catalog: Catalog,
    broker: RecordingBroker,
) -> (ViewPlanner, Arc<RecordingBroker>, Arc<SqliteRegistry>) {
    let registry = Arc::new(SqliteRegistry::open_in_memory().expect("in-memory registry"));
    let broker = Arc::new(broker);
    let planner = ViewPlanner::new(
        Arc::new(catalog),
        Arc::new(StubDirectory::new()),
        registry.clone(),
        broker.clone(),
        PlannerSettings::default(),
    );
    (planner, broker, registry)
}
