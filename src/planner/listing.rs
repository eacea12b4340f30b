//! View catalog listing.
//!
//! Every `(log type, tenant)` pair a caller may address is an addressable
//! view with an opaque identifier. Listing enumerates them for discovery
//! UIs; `get_view` resolves one identifier back to its descriptor,
//! re-validating access the same way planning does.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{exposed_columns, ColumnDescriptor, ViewPlanner};
use crate::catalog::LogTypeCatalog;
use crate::error::{PlanError, PlanResult};
use crate::request::{AccessContext, TenantId, TenantScope};
use crate::tenant::TenantInfo;

static VIEW_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z][a-z0-9_]*)_([0-9]+)$").expect("view id pattern"));

/// The opaque identifier for a `(log type, tenant)` pair.
pub fn view_identifier(log_type: &str, tenant_id: TenantId) -> String {
    format!("{}_{}", log_type, tenant_id)
}

/// Parse a view identifier back into `(log type, tenant)`.
pub fn parse_view_identifier(view_id: &str) -> Option<(String, TenantId)> {
    let captures = VIEW_ID_PATTERN.captures(view_id)?;
    let log_type = captures.get(1)?.as_str().to_string();
    let tenant_id: TenantId = captures.get(2)?.as_str().parse().ok()?;
    Some((log_type, tenant_id))
}

/// One addressable view, with tier-filtered column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub view_id: String,
    /// Human-readable label for discovery UIs.
    pub label: String,
    pub log_type: String,
    pub tenant_id: TenantId,
    pub columns: Vec<ColumnDescriptor>,
}

fn describe(
    ctx: &AccessContext,
    log_type: &LogTypeCatalog,
    tenant: &TenantInfo,
) -> ViewDescriptor {
    ViewDescriptor {
        view_id: view_identifier(&log_type.id, tenant.id),
        label: format!("{} - {}", tenant.name, log_type.display_name),
        log_type: log_type.id.clone(),
        tenant_id: tenant.id,
        columns: exposed_columns(log_type, ctx),
    }
}

impl ViewPlanner {
    /// Enumerate every addressable view under the caller's scope.
    pub async fn list_views(&self, ctx: &AccessContext) -> PlanResult<Vec<ViewDescriptor>> {
        let mut views = Vec::new();
        for log_type in self.catalog().log_types() {
            let tenants = self
                .directory()
                .get_tenants(&ctx.scope, None, log_type.owner_kind)
                .await?;
            for tenant in &tenants {
                views.push(describe(ctx, log_type, tenant));
            }
        }
        Ok(views)
    }

    /// Resolve one view identifier to its descriptor.
    pub async fn get_view(&self, ctx: &AccessContext, view_id: &str) -> PlanResult<ViewDescriptor> {
        let (log_type_id, tenant_id) = parse_view_identifier(view_id)
            .ok_or_else(|| PlanError::InvalidViewIdentifier(view_id.into()))?;

        let log_type = self
            .catalog()
            .log_type(&log_type_id)
            .ok_or(PlanError::InvalidLogType(log_type_id))?;

        if !ctx.scope.contains(tenant_id) {
            return Err(PlanError::AccessDenied {
                tenant_id,
                reason: "tenant outside caller scope".into(),
            });
        }
        self.directory()
            .get_owner(tenant_id, log_type.owner_kind)
            .await?
            .ok_or_else(|| PlanError::AccessDenied {
                tenant_id,
                reason: "tenant has no owning identity".into(),
            })?;

        let tenants = self
            .directory()
            .get_tenants(&TenantScope::ids([tenant_id]), None, log_type.owner_kind)
            .await?;
        let tenant = tenants
            .into_iter()
            .find(|t| t.id == tenant_id)
            .unwrap_or(TenantInfo {
                id: tenant_id,
                name: format!("Tenant {}", tenant_id),
            });

        Ok(describe(ctx, log_type, &tenant))
    }
}
