//! The column catalog - configuration data describing log types, their
//! columns, and the precomputed fast views that can serve them.
//!
//! The catalog is constructed once at application startup from
//! configuration data, validated, and injected into the planner. There is
//! no process-global registry; everything the planner knows about columns
//! flows through the `Catalog` value it was built with.

mod column;
mod fastview;

pub use column::{AccessTier, ColumnCategory, ColumnSpec, GeoTag, JoinKind, JoinSpec};
pub use fastview::{FastView, FastViewId, OWNER_PLACEHOLDER};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result type for catalog construction.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while validating catalog data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate log type '{0}'")]
    DuplicateLogType(String),

    #[error("duplicate column '{column}' in log type '{log_type}'")]
    DuplicateColumn { log_type: String, column: String },

    #[error("column '{column}' in log type '{log_type}' depends on unknown column '{target}'")]
    UnknownDependency {
        log_type: String,
        column: String,
        target: String,
    },

    #[error("column '{column}' in log type '{log_type}' aliases unknown column '{target}'")]
    UnknownAliasTarget {
        log_type: String,
        column: String,
        target: String,
    },

    #[error("column '{column}' in log type '{log_type}' aliases another alias '{target}'")]
    AliasChain {
        log_type: String,
        column: String,
        target: String,
    },

    #[error("column '{column}' in log type '{log_type}' names unknown fast view '{id}'")]
    UnknownFastView {
        log_type: String,
        column: String,
        id: FastViewId,
    },
}

/// Which tenant role owns a log type's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Advertiser,
    Publisher,
}

impl OwnerKind {
    /// Column on the raw log table holding the owning tenant's id.
    pub fn id_column(&self) -> &'static str {
        match self {
            OwnerKind::Advertiser => "advertiser_id",
            OwnerKind::Publisher => "publisher_id",
        }
    }
}

/// Catalog for one log type: identity, raw source table, and columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTypeCatalog {
    pub id: String,
    pub display_name: String,
    /// Raw partitioned table in the remote log store.
    pub source_table: String,
    pub owner_kind: OwnerKind,
    pub columns: BTreeMap<String, ColumnSpec>,
}

impl LogTypeCatalog {
    pub fn new(id: &str, display_name: &str, source_table: &str, owner_kind: OwnerKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            source_table: source_table.into(),
            owner_kind,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column spec, keyed by its name.
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.get(name)
    }

    /// The spec a column's metadata defers to: its alias target when the
    /// column is a synonym, otherwise the column itself.
    pub fn target_spec<'a>(&'a self, spec: &'a ColumnSpec) -> &'a ColumnSpec {
        match &spec.alias_for {
            Some(target) => self.columns.get(target).unwrap_or(spec),
            None => spec,
        }
    }
}

/// The full, validated catalog: every log type plus the global fast-view
/// registry ordered ascending by cardinality.
#[derive(Debug, Clone)]
pub struct Catalog {
    log_types: BTreeMap<String, LogTypeCatalog>,
    fast_views: Vec<FastView>,
}

impl Catalog {
    /// Build and validate a catalog.
    ///
    /// Validation enforces the catalog invariants: log type and column
    /// names are unique, `depends_on` and `alias_for` targets exist in the
    /// same log type, aliases do not chain, and every fast-view candidate
    /// names a registered fast view.
    pub fn new(
        log_types: impl IntoIterator<Item = LogTypeCatalog>,
        fast_views: impl IntoIterator<Item = FastView>,
    ) -> CatalogResult<Self> {
        let mut views: Vec<FastView> = fast_views.into_iter().collect();
        views.sort_by_key(|v| v.cardinality);

        let mut types = BTreeMap::new();
        for log_type in log_types {
            if types.contains_key(&log_type.id) {
                return Err(CatalogError::DuplicateLogType(log_type.id));
            }
            validate_log_type(&log_type, &views)?;
            types.insert(log_type.id.clone(), log_type);
        }

        Ok(Self {
            log_types: types,
            fast_views: views,
        })
    }

    pub fn log_type(&self, id: &str) -> Option<&LogTypeCatalog> {
        self.log_types.get(id)
    }

    pub fn log_types(&self) -> impl Iterator<Item = &LogTypeCatalog> {
        self.log_types.values()
    }

    pub fn fast_view(&self, id: &FastViewId) -> Option<&FastView> {
        self.fast_views.iter().find(|v| &v.id == id)
    }

    /// Fast views in ascending-cardinality order.
    pub fn fast_views(&self) -> &[FastView] {
        &self.fast_views
    }
}

fn validate_log_type(log_type: &LogTypeCatalog, fast_views: &[FastView]) -> CatalogResult<()> {
    for (name, spec) in &log_type.columns {
        // Map keys are unique by construction; reject specs filed under a
        // different name than they carry.
        if name != &spec.name {
            return Err(CatalogError::DuplicateColumn {
                log_type: log_type.id.clone(),
                column: spec.name.clone(),
            });
        }

        for dep in &spec.depends_on {
            if !log_type.columns.contains_key(dep) {
                return Err(CatalogError::UnknownDependency {
                    log_type: log_type.id.clone(),
                    column: name.clone(),
                    target: dep.clone(),
                });
            }
        }

        if let Some(target) = &spec.alias_for {
            let Some(target_spec) = log_type.columns.get(target) else {
                return Err(CatalogError::UnknownAliasTarget {
                    log_type: log_type.id.clone(),
                    column: name.clone(),
                    target: target.clone(),
                });
            };
            if target_spec.alias_for.is_some() {
                return Err(CatalogError::AliasChain {
                    log_type: log_type.id.clone(),
                    column: name.clone(),
                    target: target.clone(),
                });
            }
        }

        for id in &spec.fast_views {
            if !fast_views.iter().any(|v| &v.id == id) {
                return Err(CatalogError::UnknownFastView {
                    log_type: log_type.id.clone(),
                    column: name.clone(),
                    id: id.clone(),
                });
            }
        }
    }
    Ok(())
}
