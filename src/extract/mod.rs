//! Extraction-query compilation.
//!
//! Builds the templated aggregation query the external scheduler runs
//! against the remote partitioned log store to populate a cache table.
//! The time window is left as placeholder tokens; the scheduler binds
//! them per run. This crate only produces and persists the text.

use std::collections::BTreeSet;

use crate::catalog::LogTypeCatalog;
use crate::registry::is_time_partition;
use crate::sql::{col, lit_int, raw, sum, ExprExt, Query, SelectExpr, TableRef};

/// Placeholder tokens bound by the extraction scheduler.
pub const START_DATE: &str = "{start_date}";
pub const END_DATE: &str = "{end_date}";
pub const START_HOUR: &str = "{start_hour}";
pub const END_HOUR: &str = "{end_hour}";

/// Compile the extraction query for one cache-column set.
///
/// `date` and `hour` are always the first two grouping columns; the
/// remaining cache columns project in set order, grouping columns via
/// their source expression (default: the bare column) and aggregates via
/// theirs (default: `SUM("column")`). Multi-valued columns register their
/// cross-join clause once. Output is deterministic for a fixed set.
pub fn compile_extraction(
    owner_id: i64,
    log_type: &LogTypeCatalog,
    cache_columns: &BTreeSet<String>,
) -> String {
    let mut query = Query::new()
        .select_item(col("date"))
        .select_item(col("hour"))
        .from(TableRef::new(&log_type.source_table));

    let mut cross_joins: Vec<&str> = Vec::new();
    // Positional indices of grouping projections; date and hour lead.
    let mut group_positions = vec![1, 2];
    let mut position = 2;

    for name in cache_columns {
        if is_time_partition(name) {
            continue;
        }
        let Some(spec) = log_type.get(name) else {
            // Unknown columns are rejected by the planner before compiling.
            continue;
        };

        if let Some(clause) = &spec.cross_join {
            if !cross_joins.contains(&clause.as_str()) {
                cross_joins.push(clause);
            }
        }

        position += 1;
        let projection = if spec.is_aggregate {
            let expr = match &spec.source_expr {
                Some(source) => raw(source),
                None => sum(col(name)),
            };
            SelectExpr::new(expr).with_alias(name)
        } else {
            group_positions.push(position);
            match &spec.source_expr {
                Some(source) => SelectExpr::new(raw(source)).with_alias(name),
                None => SelectExpr::new(col(name)),
            }
        };
        query = query.select_item(projection);
    }

    for clause in cross_joins {
        query = query.raw_join(clause);
    }

    // Tenant ownership and partition-column sanity
    query = query
        .filter(col(log_type.owner_kind.id_column()).eq(lit_int(owner_id)))
        .filter(col("date").is_not_null())
        .filter(col("hour").is_not_null());

    // Half-open [start, end) window, bound later by the scheduler
    let after_start = col("date")
        .gt(raw(&format!("'{}'", START_DATE)))
        .paren()
        .or(col("date")
            .eq(raw(&format!("'{}'", START_DATE)))
            .and(col("hour").gte(raw(START_HOUR)))
            .paren())
        .paren();
    let before_end = col("date")
        .lt(raw(&format!("'{}'", END_DATE)))
        .paren()
        .or(col("date")
            .eq(raw(&format!("'{}'", END_DATE)))
            .and(col("hour").lt(raw(END_HOUR)))
            .paren())
        .paren();
    query = query.filter(after_start).filter(before_end);

    for position in group_positions {
        query = query.group_by(lit_int(position));
    }

    query.to_sql()
}
