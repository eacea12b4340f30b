//! Federated view planning.
//!
//! `ViewPlanner` ties the core together: it validates access, resolves
//! the requested columns, chooses between a precomputed fast view and the
//! durable cache path, compiles the serving query with its dimension
//! joins, and reports which foreign connections must be initialized. The
//! catalog and all external collaborators are injected at construction;
//! the planner holds no other state.

mod listing;

pub use listing::{parse_view_identifier, view_identifier, ViewDescriptor};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{AccessTier, Catalog, ColumnCategory, GeoTag, JoinKind, LogTypeCatalog};
use crate::config::PlannerSettings;
use crate::error::{PlanError, PlanResult};
use crate::extract::compile_extraction;
use crate::registry::{CacheId, CacheRegistry};
use crate::request::{AccessContext, ViewRequest};
use crate::resolver::Resolver;
use crate::selector::select_fast_views;
use crate::sql::{
    raw, sum, table_col, ExprExt, JoinType, Query, SelectExpr, TableRef, TableSource,
};
use crate::tenant::{ConnectionBroker, TenantDirectory};

/// Alias the serving source is always visible under; presentation
/// expressions reference it by this name.
pub const SOURCE_ALIAS: &str = "t";

/// Column metadata exposed to callers and discovery UIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub category: ColumnCategory,
    #[serde(default)]
    pub geo: Option<GeoTag>,
}

/// A fully planned view, ready for the execution layer.
#[derive(Debug, Clone)]
pub struct ViewPlan {
    /// Opaque identifier encoding `(log type, tenant)`.
    pub view_id: String,
    /// Compiled serving query.
    pub query: Query,
    /// Columns visible to the caller, per the exposure rule.
    pub exposed_columns: Vec<ColumnDescriptor>,
    /// Cache records this plan reads from; empty on the fast-view path.
    pub cache_dependencies: Vec<CacheId>,
    /// True when the request touched the internal tier.
    pub internal_only: bool,
}

impl ViewPlan {
    /// The compiled SQL text.
    pub fn sql(&self) -> String {
        self.query.to_sql()
    }
}

/// The view-planning orchestrator.
pub struct ViewPlanner {
    catalog: Arc<Catalog>,
    directory: Arc<dyn TenantDirectory>,
    registry: Arc<dyn CacheRegistry>,
    connections: Arc<dyn ConnectionBroker>,
    limits: PlannerSettings,
}

impl ViewPlanner {
    pub fn new(
        catalog: Arc<Catalog>,
        directory: Arc<dyn TenantDirectory>,
        registry: Arc<dyn CacheRegistry>,
        connections: Arc<dyn ConnectionBroker>,
        limits: PlannerSettings,
    ) -> Self {
        Self {
            catalog,
            directory,
            registry,
            connections,
            limits,
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn directory(&self) -> &dyn TenantDirectory {
        self.directory.as_ref()
    }

    /// Plan a view request into a compiled serving query.
    ///
    /// Any collaborator failure aborts the whole call; no partial plan is
    /// ever returned.
    pub async fn plan_view(
        &self,
        ctx: &AccessContext,
        request: &ViewRequest,
    ) -> PlanResult<ViewPlan> {
        // Validate the log type and the caller's claim on the tenant.
        let log_type = self
            .catalog
            .log_type(&request.log_type)
            .ok_or_else(|| PlanError::InvalidLogType(request.log_type.clone()))?;

        if !ctx.scope.contains(request.tenant_id) {
            return Err(PlanError::AccessDenied {
                tenant_id: request.tenant_id,
                reason: "tenant outside caller scope".into(),
            });
        }

        let owner = self
            .directory
            .get_owner(request.tenant_id, log_type.owner_kind)
            .await?
            .ok_or_else(|| PlanError::AccessDenied {
                tenant_id: request.tenant_id,
                reason: "tenant has no owning identity".into(),
            })?;

        // Resolve the requested columns against the synthetic view id.
        let view_id = view_identifier(&log_type.id, request.tenant_id);
        let resolution = Resolver::new(log_type).resolve(&view_id, &request.columns, ctx.tier());

        let count = resolution.cache_columns.len();
        if count == 0 || count > self.limits.max_cache_columns {
            return Err(PlanError::ColumnCountOutOfBounds {
                count,
                max: self.limits.max_cache_columns,
            });
        }
        for name in &resolution.cache_columns {
            if log_type.get(name).is_none() {
                return Err(PlanError::UnknownColumn {
                    log_type: log_type.id.clone(),
                    column: name.clone(),
                });
            }
        }

        // Choose the source: cheapest covering fast view, else the
        // durable cache path.
        let fast_view = select_fast_views(log_type, &resolution.cache_columns)
            .first()
            .and_then(|id| self.catalog.fast_view(id));

        let mut connections: BTreeSet<String> = BTreeSet::new();
        let (source, cache_dependencies) = match fast_view {
            Some(view) => {
                debug!(%view_id, fast_view = %view.id, "serving from fast view");
                if let Some(name) = &view.connection {
                    connections.insert(name.clone());
                }
                let source = TableSource::Derived {
                    sql: view.render_source(owner.id),
                    alias: SOURCE_ALIAS.into(),
                };
                (source, Vec::new())
            }
            None => {
                let cache_id = match self
                    .registry
                    .lookup(&log_type.id, request.tenant_id, &resolution.cache_columns)
                    .await?
                {
                    Some(id) => id,
                    None => {
                        // First request for this column set: compile the
                        // extraction query and persist it with the record.
                        let extraction =
                            compile_extraction(owner.id, log_type, &resolution.cache_columns);
                        self.registry
                            .lookup_or_create(
                                log_type,
                                request.tenant_id,
                                &resolution.cache_columns,
                                &extraction,
                            )
                            .await?
                    }
                };
                debug!(%view_id, %cache_id, "serving from cache table");
                let time_zone = self.directory.get_time_zone(request.tenant_id).await?;
                (cache_table_source(cache_id, &time_zone), vec![cache_id])
            }
        };

        // Assemble the select list: grouping projections, then aggregates,
        // each aliased to the requested (possibly synonym) name.
        let mut query = Query::new().from(source);
        let mut joined: Vec<String> = Vec::new();
        let mut aggregates: Vec<SelectExpr> = Vec::new();

        for name in &resolution.query_columns {
            let Some(spec) = log_type.get(name) else {
                // Query columns come from the catalog by construction.
                continue;
            };
            let effective = log_type.target_spec(spec);

            let expr = match &effective.presentation_expr {
                Some(presentation) => raw(presentation),
                None if effective.is_aggregate => sum(table_col(SOURCE_ALIAS, &effective.name)),
                None => table_col(SOURCE_ALIAS, &effective.name),
            };
            let item = SelectExpr::new(expr).with_alias(name);
            if effective.is_aggregate {
                aggregates.push(item);
            } else {
                query = query.select_item(item);
            }

            for join in &effective.joins {
                if joined.contains(&join.target) {
                    continue;
                }
                joined.push(join.target.clone());
                if let Some(connection) = &join.connection {
                    connections.insert(connection.clone());
                }
                let join_type = match join.kind {
                    JoinKind::Left => JoinType::Left,
                    JoinKind::Inner => JoinType::Inner,
                };
                query = query.join(
                    join_type,
                    TableRef::new(&join.target),
                    table_col(SOURCE_ALIAS, &join.left_column)
                        .eq(table_col(&join.target, &join.right_column)),
                );
            }
        }
        for item in aggregates {
            query = query.select_item(item);
        }

        // Foreign connections are independent; initialize them
        // concurrently, failing the whole plan on any error.
        futures::future::try_join_all(
            connections.iter().map(|name| self.connections.connect(name)),
        )
        .await?;

        let internal_only = resolution.min_tier == AccessTier::Internal;
        info!(
            %view_id,
            cache_columns = count,
            connections = connections.len(),
            internal_only,
            "view planned"
        );

        Ok(ViewPlan {
            view_id,
            query,
            exposed_columns: exposed_columns(log_type, ctx),
            cache_dependencies,
            internal_only,
        })
    }
}

/// Serving source for a cache table, re-expressed in the tenant's
/// configured time zone.
fn cache_table_source(cache_id: CacheId, time_zone: &str) -> TableSource {
    let tz = time_zone.replace('\'', "''");
    let sql = format!(
        "(SELECT *, CONVERT_TZ(CONCAT(\"date\", ' ', LPAD(\"hour\", 2, '0'), ':00:00'), 'UTC', '{}') AS \"local_time\" FROM \"{}\")",
        tz,
        cache_id.table_name()
    );
    TableSource::Derived {
        sql,
        alias: SOURCE_ALIAS.into(),
    }
}

/// The column-exposure rule shared by planning and listing: a column is
/// exposed iff it is ungated or its tier exactly matches the caller's.
/// Synonym columns report their target's category and geo tag.
pub(crate) fn exposed_columns(
    log_type: &LogTypeCatalog,
    ctx: &AccessContext,
) -> Vec<ColumnDescriptor> {
    let tier = ctx.tier();
    log_type
        .columns
        .values()
        .filter(|spec| match spec.access_tier {
            None => true,
            Some(t) => t == tier,
        })
        .map(|spec| {
            let target = log_type.target_spec(spec);
            ColumnDescriptor {
                name: spec.name.clone(),
                category: target.category,
                geo: target.geo,
            }
        })
        .collect()
}
