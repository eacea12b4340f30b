//! Per-column catalog specifications.
//!
//! A `ColumnSpec` is pure data: how a column is classified, gated, stored,
//! extracted from raw logs, presented in serving queries, and which joins
//! and fast views it participates in. Behavior lives in the resolver,
//! compiler, and planner - never here.

use serde::{Deserialize, Serialize};

use crate::catalog::fastview::FastViewId;
use crate::sql::DataType;

/// Semantic category of a column, surfaced to discovery UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnCategory {
    Numeric,
    Text,
    Date,
}

/// Ordered sensitivity level gating column visibility.
///
/// Derived `Ord` gives `Public < Partner < Internal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    Public,
    Partner,
    Internal,
}

impl AccessTier {
    /// Map an access-tier name from the authorization layer to a tier.
    ///
    /// Unknown names fall back to the least-privileged tier.
    pub fn from_name(name: &str) -> AccessTier {
        match name {
            "internal" => AccessTier::Internal,
            "partner" => AccessTier::Partner,
            _ => AccessTier::Public,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::Public => "public",
            AccessTier::Partner => "partner",
            AccessTier::Internal => "internal",
        }
    }
}

/// Geographic tag attached to some dimension columns for discovery UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTag {
    Country,
    Region,
    City,
}

/// Kind of join a column requires against a dimension view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Left,
    Inner,
}

/// A declared join against a dimension view.
///
/// Pure data consumed by the planner's join emission: the serving source
/// is always aliased `t`, so `left_column` names a column on `t` and
/// `right_column` a column on `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub kind: JoinKind,
    /// Dimension view (table) to join.
    pub target: String,
    /// Column on the serving source.
    pub left_column: String,
    /// Column on the dimension view.
    pub right_column: String,
    /// Foreign connection that must be initialized before execution.
    #[serde(default)]
    pub connection: Option<String>,
}

/// Catalog specification for one column of a log type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub category: ColumnCategory,

    /// Visibility gate; `None` means the column is ungated.
    #[serde(default)]
    pub access_tier: Option<AccessTier>,

    /// Physical type in cache tables; `None` for derived columns.
    #[serde(default)]
    pub storage_type: Option<DataType>,

    /// Extraction-side expression over the raw log table.
    /// Defaults to the bare column, or `SUM("name")` when aggregate.
    #[serde(default)]
    pub source_expr: Option<String>,

    /// Serving-side expression; may reference joined dimension views.
    /// The serving source is always aliased `t`.
    #[serde(default)]
    pub presentation_expr: Option<String>,

    /// Raw columns this derived column is computed from.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// This name is a synonym sharing another column's spec.
    #[serde(default)]
    pub alias_for: Option<String>,

    #[serde(default)]
    pub is_aggregate: bool,

    /// Complete cross-join clause unnesting a multi-valued column.
    #[serde(default)]
    pub cross_join: Option<String>,

    /// Joins required when the presentation expression is used.
    #[serde(default)]
    pub joins: Vec<JoinSpec>,

    /// Fast views already containing this column in raw form,
    /// ascending by declared cardinality.
    #[serde(default)]
    pub fast_views: Vec<FastViewId>,

    /// Geographic tag for discovery UIs.
    #[serde(default)]
    pub geo: Option<GeoTag>,
}

impl ColumnSpec {
    pub fn new(name: &str, category: ColumnCategory) -> Self {
        Self {
            name: name.into(),
            category,
            access_tier: None,
            storage_type: None,
            source_expr: None,
            presentation_expr: None,
            depends_on: Vec::new(),
            alias_for: None,
            is_aggregate: false,
            cross_join: None,
            joins: Vec::new(),
            fast_views: Vec::new(),
            geo: None,
        }
    }

    pub fn tier(mut self, tier: AccessTier) -> Self {
        self.access_tier = Some(tier);
        self
    }

    pub fn storage(mut self, data_type: DataType) -> Self {
        self.storage_type = Some(data_type);
        self
    }

    pub fn source_expr(mut self, expr: &str) -> Self {
        self.source_expr = Some(expr.into());
        self
    }

    pub fn presentation(mut self, expr: &str) -> Self {
        self.presentation_expr = Some(expr.into());
        self
    }

    pub fn depends_on(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = deps.into_iter().map(|d| d.into()).collect();
        self
    }

    pub fn alias_for(mut self, target: &str) -> Self {
        self.alias_for = Some(target.into());
        self
    }

    pub fn aggregate(mut self) -> Self {
        self.is_aggregate = true;
        self
    }

    pub fn cross_join(mut self, clause: &str) -> Self {
        self.cross_join = Some(clause.into());
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn fast_view(mut self, id: impl Into<FastViewId>) -> Self {
        self.fast_views.push(id.into());
        self
    }

    pub fn geo(mut self, tag: GeoTag) -> Self {
        self.geo = Some(tag);
        self
    }
}
