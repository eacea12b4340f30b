//! Planner integration tests: the durable cache path, including the
//! concurrent-request convergence scenario.

#[path = "../common/mod.rs"]
mod common;

use serde_json::json;

use common::{catalog_without_fast_views, planner_with, RecordingBroker, TENANT};
use vantage::registry::CacheRegistry;
use vantage::request::{AccessContext, TenantScope, ViewRequest};

fn public_ctx() -> AccessContext {
    AccessContext::new(TenantScope::Unrestricted, "public")
}

fn request(columns: serde_json::Value) -> ViewRequest {
    ViewRequest::new("impressions", TENANT, &columns)
}

#[tokio::test]
async fn test_cache_fallback_when_no_fast_view_covers() {
    let (planner, _broker, registry) =
        planner_with(catalog_without_fast_views(), RecordingBroker::default());

    let plan = planner
        .plan_view(&public_ctx(), &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap();

    // One cache dependency, registered under the dependency column set
    assert_eq!(plan.cache_dependencies.len(), 1);
    let cache_id = plan.cache_dependencies[0];

    let found = registry
        .lookup("impressions", TENANT, &["camp_code".to_string()].into())
        .await
        .unwrap();
    assert_eq!(found, Some(cache_id));

    // The serving query reads the cache table in the tenant's time zone
    let sql = plan.sql();
    assert!(sql.contains(&format!("FROM (SELECT *, CONVERT_TZ(CONCAT(\"date\", ' ', LPAD(\"hour\", 2, '0'), ':00:00'), 'UTC', 'America/New_York') AS \"local_time\" FROM \"{}\") AS \"t\"", cache_id.table_name())));
    assert!(sql.contains("\"dim_campaign\".\"name\" AS \"camp_name\""));
}

#[tokio::test]
async fn test_extraction_query_persisted_on_first_creation() {
    let (planner, _broker, registry) =
        planner_with(catalog_without_fast_views(), RecordingBroker::default());

    let plan = planner
        .plan_view(&public_ctx(), &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap();

    let extraction = registry
        .extraction_sql(plan.cache_dependencies[0])
        .await
        .unwrap()
        .expect("extraction SQL persisted with the record");

    // The extraction aggregates the raw log by the dependency column,
    // filtered to the owning advertiser and the scheduler's window
    assert!(extraction.contains("\"camp_code\""));
    assert!(extraction.contains("FROM \"raw_impressions\""));
    assert!(extraction.contains("\"advertiser_id\" = 42"));
    assert!(extraction.contains("'{start_date}'"));
    assert!(extraction.contains("{end_hour}"));
    assert!(extraction.ends_with("GROUP BY 1, 2, 3"));
}

#[tokio::test]
async fn test_concurrent_identical_requests_converge() {
    let (planner, _broker, _registry) =
        planner_with(catalog_without_fast_views(), RecordingBroker::default());

    let ctx = public_ctx();
    let req = request(json!([["camp_name", "impressions_7"]]));
    let (a, b) = tokio::join!(planner.plan_view(&ctx, &req), planner.plan_view(&ctx, &req));

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.cache_dependencies, b.cache_dependencies);
    assert_eq!(a.sql(), b.sql());
}

#[tokio::test]
async fn test_distinct_column_sets_get_distinct_caches() {
    let (planner, _broker, _registry) =
        planner_with(catalog_without_fast_views(), RecordingBroker::default());
    let ctx = public_ctx();

    let narrow = planner
        .plan_view(&ctx, &request(json!([["camp_code", "impressions_7"]])))
        .await
        .unwrap();
    let wide = planner
        .plan_view(
            &ctx,
            &request(json!([["camp_code", "impressions_7"], ["clicks", "impressions_7"]])),
        )
        .await
        .unwrap();

    assert_ne!(narrow.cache_dependencies, wide.cache_dependencies);
}

#[tokio::test]
async fn test_aggregates_follow_grouping_columns() {
    let (planner, _broker, _registry) =
        planner_with(catalog_without_fast_views(), RecordingBroker::default());

    let plan = planner
        .plan_view(
            &public_ctx(),
            &request(json!([["clicks", "impressions_7"], ["camp_code", "impressions_7"]])),
        )
        .await
        .unwrap();

    let sql = plan.sql();
    // Grouping projection first, then the aggregate with its default SUM
    assert!(sql.starts_with(
        "SELECT \"t\".\"camp_code\" AS \"camp_code\", SUM(\"t\".\"clicks\") AS \"clicks\"\n"
    ));
}

#[tokio::test]
async fn test_alias_request_converges_on_target_cache() {
    let (planner, _broker, _registry) =
        planner_with(catalog_without_fast_views(), RecordingBroker::default());
    let ctx = public_ctx();

    // "campaign" is a synonym of camp_name; both depend on camp_code, so
    // both requests address the same cache record.
    let direct = planner
        .plan_view(&ctx, &request(json!([["camp_name", "impressions_7"]])))
        .await
        .unwrap();
    let aliased = planner
        .plan_view(&ctx, &request(json!([["campaign", "impressions_7"]])))
        .await
        .unwrap();

    assert_eq!(direct.cache_dependencies, aliased.cache_dependencies);
    // The alias plan exposes the requested name
    assert!(aliased.sql().contains("AS \"campaign\""));
}
