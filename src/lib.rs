//! # Vantage
//!
//! Query-planning core for a multi-tenant log analytics service.
//!
//! ## Architecture
//!
//! Vantage decides how a logical view request is sourced and compiles the
//! final serving query:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        ViewRequest (log type, tenant, column tree)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │      cache columns + query columns + access floor        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [selector]
//!         fast view hit ───┴─── no fast view
//!               │                     │
//!               │                     ▼ [registry + extract]
//!               │          durable cache table + extraction SQL
//!               │                     │
//!               └──────────┬──────────┘
//!                          ▼ [planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │   ViewPlan (compiled query, joins, connections, flags)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog of log types, columns, and fast views is supplied as data at
//! construction time. Execution of compiled queries, scheduling of
//! extraction runs, and the HTTP surface live outside this crate.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod planner;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod selector;
pub mod sql;
pub mod tenant;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{
        AccessTier, Catalog, ColumnCategory, ColumnSpec, FastView, FastViewId, JoinKind, JoinSpec,
        LogTypeCatalog, OwnerKind,
    };
    pub use crate::config::Settings;
    pub use crate::error::{PlanError, PlanResult};
    pub use crate::planner::{ViewDescriptor, ViewPlan, ViewPlanner};
    pub use crate::registry::{CacheId, CacheRegistry, SqliteRegistry};
    pub use crate::request::{AccessContext, ExprNode, TenantScope, ViewRequest};
    pub use crate::tenant::{ConnectionBroker, TenantDirectory, TenantInfo};
}

pub use catalog::Catalog;
pub use error::{PlanError, PlanResult};
pub use planner::ViewPlanner;
