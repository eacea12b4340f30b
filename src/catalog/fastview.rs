//! Precomputed fast views.
//!
//! A fast view is a specialized join or pre-aggregated source that already
//! contains a set of raw columns, letting the planner skip the durable
//! cache path entirely. Fast views are declared as data: an identifier, a
//! declared cardinality for preference ordering, and a source template
//! parameterized by the owning parent identity.

use serde::{Deserialize, Serialize};

/// Opaque fast-view identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FastViewId(pub String);

impl FastViewId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FastViewId {
    fn from(s: &str) -> Self {
        FastViewId(s.into())
    }
}

impl std::fmt::Display for FastViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Placeholder in a fast-view source template substituted with the owning
/// parent id when the view is planned.
pub const OWNER_PLACEHOLDER: &str = "{owner}";

/// A precomputed specialized source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastView {
    pub id: FastViewId,

    /// Declared cardinality; the catalog orders fast views ascending so
    /// the selector's first hit is the cheapest.
    pub cardinality: u64,

    /// Source SQL template containing [`OWNER_PLACEHOLDER`]. Rendered as a
    /// derived FROM source, aliased `t` by the planner.
    pub source_template: String,

    /// Foreign connection the source lives on, if not the default.
    #[serde(default)]
    pub connection: Option<String>,
}

impl FastView {
    pub fn new(id: impl Into<FastViewId>, cardinality: u64, source_template: &str) -> Self {
        Self {
            id: id.into(),
            cardinality,
            source_template: source_template.into(),
            connection: None,
        }
    }

    pub fn on_connection(mut self, name: &str) -> Self {
        self.connection = Some(name.into());
        self
    }

    /// Render the source for a specific owning parent.
    pub fn render_source(&self, owner_id: i64) -> String {
        self.source_template
            .replace(OWNER_PLACEHOLDER, &owner_id.to_string())
    }
}
