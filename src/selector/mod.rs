//! Fast-view selection.
//!
//! Given the raw columns a request needs, find every precomputed fast
//! view that already contains all of them. The result keeps the
//! ascending-cardinality order of the first column's candidate list, so
//! the first entry is always the cheapest satisfying view. An empty
//! result means "fall back to the durable cache path".

use std::collections::BTreeSet;

use crate::catalog::{FastViewId, LogTypeCatalog};

/// Intersect the fast-view candidates of every required column.
///
/// Short-circuits to empty as soon as any column has no candidates, or
/// the running intersection empties out.
pub fn select_fast_views(
    catalog: &LogTypeCatalog,
    cache_columns: &BTreeSet<String>,
) -> Vec<FastViewId> {
    let mut result: Option<Vec<FastViewId>> = None;

    for name in cache_columns {
        let candidates = match catalog.get(name) {
            Some(spec) => &spec.fast_views,
            // Unknown columns are the planner's problem; no view covers them.
            None => return Vec::new(),
        };
        if candidates.is_empty() {
            return Vec::new();
        }

        match &mut result {
            None => result = Some(candidates.clone()),
            Some(acc) => {
                acc.retain(|id| candidates.contains(id));
                if acc.is_empty() {
                    return Vec::new();
                }
            }
        }
    }

    result.unwrap_or_default()
}
