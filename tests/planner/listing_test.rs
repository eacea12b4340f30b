//! View catalog listing tests.

#[path = "../common/mod.rs"]
mod common;

use common::{planner, ORPHAN_TENANT, TENANT};
use vantage::error::PlanError;
use vantage::request::{AccessContext, TenantScope};

#[tokio::test]
async fn test_list_views_crosses_tenants_and_log_types() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::Unrestricted, "public");

    let views = planner.list_views(&ctx).await.unwrap();
    let ids: Vec<_> = views.iter().map(|v| v.view_id.as_str()).collect();
    assert_eq!(ids, vec!["impressions_7", "impressions_8"]);

    let acme = &views[0];
    assert_eq!(acme.label, "Acme Media - Impressions");
    assert_eq!(acme.tenant_id, TENANT);
    assert!(!acme.columns.is_empty());
}

#[tokio::test]
async fn test_list_views_respects_scope() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::ids([TENANT]), "public");

    let views = planner.list_views(&ctx).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].view_id, "impressions_7");
}

#[tokio::test]
async fn test_get_view_round_trip() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::Unrestricted, "public");

    let view = planner.get_view(&ctx, "impressions_7").await.unwrap();
    assert_eq!(view.log_type, "impressions");
    assert_eq!(view.tenant_id, TENANT);
    assert_eq!(view.label, "Acme Media - Impressions");

    let names: Vec<_> = view.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["camp_code", "camp_name", "campaign", "clicks"]);
}

#[tokio::test]
async fn test_get_view_malformed_identifier() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::Unrestricted, "public");

    let err = planner.get_view(&ctx, "not a view id").await.unwrap_err();
    assert!(matches!(err, PlanError::InvalidViewIdentifier(_)));
}

#[tokio::test]
async fn test_get_view_unknown_log_type() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::Unrestricted, "public");

    let err = planner.get_view(&ctx, "conversions_7").await.unwrap_err();
    assert!(matches!(err, PlanError::InvalidLogType(_)));
}

#[tokio::test]
async fn test_get_view_revalidates_access() {
    let (planner, _broker, _registry) = planner();

    // Outside scope
    let narrow = AccessContext::new(TenantScope::ids([99]), "public");
    let err = planner.get_view(&narrow, "impressions_7").await.unwrap_err();
    assert!(matches!(err, PlanError::AccessDenied { .. }));

    // In scope but without an owning identity
    let open = AccessContext::new(TenantScope::Unrestricted, "public");
    let err = planner
        .get_view(&open, &format!("impressions_{}", ORPHAN_TENANT))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::AccessDenied { .. }));
}
