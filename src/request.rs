//! View requests and the expression-tree AST.
//!
//! The API layer hands the planner an arbitrary nested structure in which
//! only column leaves are meaningful; everything else is opaque payload
//! that must be traversed but never interpreted. `ExprNode::from_value`
//! normalizes the three accepted leaf shapes - `{kind:"column", view,
//! column}` objects, `["name_or_*", view_id]` pairs, and dotted
//! `"view.column"` strings - into a typed tree the resolver can walk
//! without runtime type probing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::AccessTier;

/// Tenant identifier, as issued by the tenant directory.
pub type TenantId = i64;

/// The set of tenants a caller may address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantScope {
    Unrestricted,
    Ids(BTreeSet<TenantId>),
}

impl TenantScope {
    pub fn contains(&self, id: TenantId) -> bool {
        match self {
            TenantScope::Unrestricted => true,
            TenantScope::Ids(ids) => ids.contains(&id),
        }
    }

    pub fn ids(ids: impl IntoIterator<Item = TenantId>) -> Self {
        TenantScope::Ids(ids.into_iter().collect())
    }
}

/// Caller identity as decoded by the external authorization layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessContext {
    pub scope: TenantScope,
    /// Access-tier name from the authorization token.
    pub tier_name: String,
}

impl AccessContext {
    pub fn new(scope: TenantScope, tier_name: &str) -> Self {
        Self {
            scope,
            tier_name: tier_name.into(),
        }
    }

    /// The numeric tier the caller's tier name maps to.
    pub fn tier(&self) -> AccessTier {
        AccessTier::from_name(&self.tier_name)
    }
}

/// A logical view request: which log, which tenant, which columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub log_type: String,
    pub tenant_id: TenantId,
    pub columns: ExprNode,
}

impl ViewRequest {
    /// Build a request from the raw JSON expression tree.
    pub fn new(log_type: &str, tenant_id: TenantId, tree: &Value) -> Self {
        Self {
            log_type: log_type.into(),
            tenant_id,
            columns: ExprNode::from_value(tree),
        }
    }
}

/// Typed expression-tree node.
///
/// Column and wildcard leaves are the only nodes the resolver interprets;
/// `Seq` and `Map` are traversed, `Opaque` is carried untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Column { view: String, column: String },
    Wildcard { view: String },
    Seq(Vec<ExprNode>),
    Map(Vec<(String, ExprNode)>),
    Opaque(Value),
}

impl ExprNode {
    /// Normalize a raw JSON tree into a typed tree.
    pub fn from_value(value: &Value) -> ExprNode {
        match value {
            Value::Array(items) => {
                // Two-element [name_or_*, view_id] pair form
                if let [Value::String(name), Value::String(view)] = items.as_slice() {
                    return Self::leaf(name, view);
                }
                ExprNode::Seq(items.iter().map(Self::from_value).collect())
            }

            Value::Object(map) => {
                // {kind: "column", view, column} descriptor form
                if map.get("kind").and_then(Value::as_str) == Some("column") {
                    if let (Some(view), Some(column)) = (
                        map.get("view").and_then(Value::as_str),
                        map.get("column").and_then(Value::as_str),
                    ) {
                        return Self::leaf(column, view);
                    }
                }
                ExprNode::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Self::from_value(v)))
                        .collect(),
                )
            }

            // Dotted "view.column" strings are equivalent to the pair form
            Value::String(s) => match s.split_once('.') {
                Some((view, column)) if !view.is_empty() && !column.is_empty() => {
                    Self::leaf(column, view)
                }
                _ => ExprNode::Opaque(value.clone()),
            },

            _ => ExprNode::Opaque(value.clone()),
        }
    }

    fn leaf(name: &str, view: &str) -> ExprNode {
        if name == "*" {
            ExprNode::Wildcard { view: view.into() }
        } else {
            ExprNode::Column {
                view: view.into(),
                column: name.into(),
            }
        }
    }
}
