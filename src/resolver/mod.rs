//! Column dependency resolution.
//!
//! Walks a request's expression tree, collects the columns it references
//! against one synthetic view, and classifies them:
//!
//! - **query columns** - the logical names the caller asked for, used to
//!   build the serving select list;
//! - **cache columns** - the dependency-resolved, alias-resolved raw
//!   columns that must be stored or extracted to answer the request.
//!
//! Columns above the caller's access tier are silently dropped rather
//! than rejected: a request may legitimately mix tiers and only the
//! visible ones resolve.

use std::collections::{BTreeSet, VecDeque};

use crate::catalog::{AccessTier, LogTypeCatalog};
use crate::request::ExprNode;

/// Outcome of resolving one expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Raw columns that must be stored/extracted (alias and dependency
    /// resolved). `BTreeSet` keeps iteration order stable.
    pub cache_columns: BTreeSet<String>,
    /// Logical column names as requested.
    pub query_columns: BTreeSet<String>,
    /// Highest tier among the resolved columns; drives the plan's
    /// internal-only flag.
    pub min_tier: AccessTier,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            cache_columns: BTreeSet::new(),
            query_columns: BTreeSet::new(),
            min_tier: AccessTier::Public,
        }
    }
}

/// Resolver for one log type's catalog.
pub struct Resolver<'a> {
    catalog: &'a LogTypeCatalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a LogTypeCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve every column leaf referencing `view_id`.
    ///
    /// Traversal is a breadth-first worklist; order does not affect the
    /// result since the outputs are sets.
    pub fn resolve(
        &self,
        view_id: &str,
        tree: &ExprNode,
        caller_tier: AccessTier,
    ) -> Resolution {
        let mut resolution = Resolution::default();
        let mut queue: VecDeque<&ExprNode> = VecDeque::new();
        queue.push_back(tree);

        while let Some(node) = queue.pop_front() {
            match node {
                ExprNode::Column { view, column } if view == view_id => {
                    self.admit(column, caller_tier, &mut resolution);
                }
                ExprNode::Wildcard { view } if view == view_id => {
                    for name in self.catalog.columns.keys() {
                        self.admit(name, caller_tier, &mut resolution);
                    }
                }
                ExprNode::Seq(items) => queue.extend(items.iter()),
                ExprNode::Map(entries) => queue.extend(entries.iter().map(|(_, v)| v)),
                // Column leaves for other views and opaque payload
                _ => {}
            }
        }

        resolution
    }

    /// Apply the classification rules to one referenced column.
    fn admit(&self, name: &str, caller_tier: AccessTier, resolution: &mut Resolution) {
        let Some(spec) = self.catalog.get(name) else {
            // Not a catalog column; leave it to the opaque payload.
            return;
        };

        if let Some(tier) = spec.access_tier {
            if tier > caller_tier {
                // Over-tier columns are dropped, not rejected.
                return;
            }
            resolution.min_tier = resolution.min_tier.max(tier);
        }

        resolution.query_columns.insert(name.to_string());

        // An alias defers everything but its own tier to its target.
        let effective = self.catalog.target_spec(spec);

        if effective.depends_on.is_empty() {
            resolution.cache_columns.insert(effective.name.clone());
        } else {
            // Derived columns store their dependencies, never themselves.
            for dep in &effective.depends_on {
                resolution.cache_columns.insert(dep.clone());
            }
        }
    }
}
