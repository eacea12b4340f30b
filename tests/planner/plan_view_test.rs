//! Planner integration tests: the fast-view path, access control, and
//! the column-count bound.

#[path = "../common/mod.rs"]
mod common;

use serde_json::json;

use common::{planner, planner_with, planner_with_broker, RecordingBroker, ORPHAN_TENANT, TENANT};
use vantage::catalog::{Catalog, ColumnCategory, ColumnSpec, LogTypeCatalog, OwnerKind};
use vantage::error::PlanError;
use vantage::request::{AccessContext, TenantScope, ViewRequest};
use vantage::sql::DataType;

fn public_ctx() -> AccessContext {
    AccessContext::new(TenantScope::Unrestricted, "public")
}

fn request(columns: serde_json::Value) -> ViewRequest {
    ViewRequest::new("impressions", TENANT, &columns)
}

#[tokio::test]
async fn test_fast_view_path_for_covered_columns() {
    let (planner, broker, _registry) = planner();

    let plan = planner
        .plan_view(&public_ctx(), &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap();

    assert_eq!(plan.view_id, "impressions_7");
    // Fast-view plans have no cache dependencies
    assert!(plan.cache_dependencies.is_empty());
    assert!(!plan.internal_only);

    assert_eq!(
        plan.sql(),
        "SELECT \"dim_campaign\".\"name\" AS \"camp_name\"\n\
         FROM (SELECT * FROM \"fast_campaign\" WHERE \"advertiser_id\" = 42) AS \"t\"\n\
         LEFT JOIN \"dim_campaign\" ON \"t\".\"camp_code\" = \"dim_campaign\".\"code\""
    );

    // Both the fast view's connection and the join's connection were
    // initialized, each exactly once.
    let mut names = broker.names();
    names.sort();
    assert_eq!(names, vec!["dimdb".to_string(), "fastdb".to_string()]);
}

#[tokio::test]
async fn test_exposed_columns_follow_caller_tier() {
    let (planner, _broker, _registry) = planner();

    let plan = planner
        .plan_view(&public_ctx(), &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap();

    let names: Vec<_> = plan.exposed_columns.iter().map(|c| c.name.as_str()).collect();
    // Ungated columns plus the exactly-public camp_code; partner and
    // internal columns stay hidden.
    assert_eq!(names, vec!["camp_code", "camp_name", "campaign", "clicks"]);
}

#[tokio::test]
async fn test_internal_flag_set_when_internal_tier_resolves() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::Unrestricted, "internal");

    let plan = planner
        .plan_view(&ctx, &request(json!([["bid_floor", "impressions_7"]])))
        .await
        .unwrap();
    assert!(plan.internal_only);
}

#[tokio::test]
async fn test_unknown_log_type_rejected() {
    let (planner, _broker, _registry) = planner();

    let err = planner
        .plan_view(
            &public_ctx(),
            &ViewRequest::new("conversions", TENANT, &json!([["x", "conversions_7"]])),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidLogType(ref t) if t == "conversions"));
}

#[tokio::test]
async fn test_tenant_outside_scope_rejected() {
    let (planner, _broker, _registry) = planner();
    let ctx = AccessContext::new(TenantScope::ids([99]), "public");

    let err = planner
        .plan_view(&ctx, &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::AccessDenied { tenant_id, .. } if tenant_id == TENANT));
}

#[tokio::test]
async fn test_tenant_without_owner_rejected() {
    let (planner, _broker, _registry) = planner();

    let err = planner
        .plan_view(
            &public_ctx(),
            &ViewRequest::new(
                "impressions",
                ORPHAN_TENANT,
                &json!([["camp_name", "impressions_8"]]),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::AccessDenied { tenant_id, .. } if tenant_id == ORPHAN_TENANT));
}

#[tokio::test]
async fn test_empty_resolution_rejected() {
    let (planner, _broker, _registry) = planner();

    // Only an over-tier column: it drops silently, leaving nothing
    let err = planner
        .plan_view(&public_ctx(), &request(json!([["bid_floor", "impressions_7"]])))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanError::ColumnCountOutOfBounds { count: 0, .. }
    ));
}

#[tokio::test]
async fn test_connection_failure_aborts_whole_plan() {
    let (planner, _broker, _registry) = planner_with_broker(RecordingBroker::failing_on("dimdb"));

    let err = planner
        .plan_view(&public_ctx(), &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Connect(_)));
}

/// A log type wide enough to probe the column bound.
fn wide_catalog() -> Catalog {
    let mut log_type =
        LogTypeCatalog::new("impressions", "Impressions", "raw_impressions", OwnerKind::Advertiser);
    for i in 1..=12 {
        log_type = log_type.column(
            ColumnSpec::new(&format!("w{:02}", i), ColumnCategory::Text).storage(DataType::Text),
        );
    }
    Catalog::new([log_type], []).unwrap()
}

fn wide_request(count: usize) -> ViewRequest {
    let leaves: Vec<_> = (1..=count)
        .map(|i| json!([format!("w{:02}", i), "impressions_7"]))
        .collect();
    ViewRequest::new("impressions", TENANT, &json!(leaves))
}

#[tokio::test]
async fn test_bound_accepts_one_and_ten() {
    let (planner, _broker, _registry) = planner_with(wide_catalog(), RecordingBroker::default());

    for count in [1, 10] {
        let plan = planner
            .plan_view(&public_ctx(), &wide_request(count))
            .await
            .unwrap();
        assert_eq!(plan.cache_dependencies.len(), 1, "count {}", count);
    }
}

#[tokio::test]
async fn test_bound_rejects_eleven() {
    let (planner, _broker, _registry) = planner_with(wide_catalog(), RecordingBroker::default());

    let err = planner
        .plan_view(&public_ctx(), &wide_request(11))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanError::ColumnCountOutOfBounds { count: 11, max: 10 }
    ));
}
