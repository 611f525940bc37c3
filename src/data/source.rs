use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use super::loader;
use super::model::Dataset;
use super::query::{self, QueryEngine, RowSet};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, QueryError};

// ---------------------------------------------------------------------------
// Catalog: named data sources
// ---------------------------------------------------------------------------

/// Registry of named sources. Each source is read from disk at most once;
/// opened datasets are shared read-only and mirrored into an in-memory SQL
/// table for [`QueryEngine`].
#[derive(Debug, Default)]
pub struct Catalog {
    target: String,
    paths: BTreeMap<String, PathBuf>,
    opened: BTreeMap<String, Arc<Dataset>>,
    /// Per opened source: its SQL table, or why it could not be built.
    tables: BTreeMap<String, Result<Connection, String>>,
}

impl Catalog {
    /// Register every source named in the configuration without reading it.
    pub fn connect(config: &DashboardConfig) -> Self {
        let paths: BTreeMap<String, PathBuf> = config
            .sources
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();
        log::debug!("catalog sources: {:?}", paths.keys().collect::<Vec<_>>());
        Catalog {
            target: config.target.clone(),
            paths,
            ..Default::default()
        }
    }

    /// Register an already loaded dataset under `name`.
    ///
    /// A dataset the SQL engine cannot hold (for example two columns whose
    /// names differ only in case) stays usable; only its queries fail.
    pub fn insert(&mut self, name: &str, dataset: Arc<Dataset>) {
        let table = query::materialize(name, &dataset).map_err(|e| {
            log::warn!("source '{name}' has no SQL table: {e}");
            e.to_string()
        });
        self.tables.insert(name.to_string(), table);
        self.opened.insert(name.to_string(), dataset);
    }

    /// Open `name`, loading it on first use.
    pub fn get_dataset(&mut self, name: &str) -> Result<Arc<Dataset>, DashboardError> {
        if let Some(ds) = self.opened.get(name) {
            return Ok(Arc::clone(ds));
        }
        let path = self
            .paths
            .get(name)
            .ok_or_else(|| DashboardError::DataSourceUnavailable {
                name: name.to_string(),
                reason: "no such source is configured".to_string(),
            })?;

        let dataset = loader::load_file(path, &self.target).map_err(|e| {
            DashboardError::DataSourceUnavailable {
                name: name.to_string(),
                reason: format!("{e:#}"),
            }
        })?;
        log::info!(
            "Opened source '{name}' from {}: {} records, {} fields",
            path.display(),
            dataset.len(),
            dataset.schema().len()
        );

        let dataset = Arc::new(dataset);
        self.insert(name, Arc::clone(&dataset));
        Ok(dataset)
    }
}

impl QueryEngine for Catalog {
    fn query(&self, sql: &str, source: &str) -> Result<RowSet, QueryError> {
        match self.tables.get(source) {
            Some(Ok(db)) => query::run(db, sql),
            Some(Err(reason)) => Err(QueryError::Unavailable {
                name: source.to_string(),
                reason: reason.clone(),
            }),
            None if self.paths.contains_key(source) => Err(QueryError::Unavailable {
                name: source.to_string(),
                reason: "source has not been opened".to_string(),
            }),
            None => Err(QueryError::UnknownSource(source.to_string())),
        }
    }
}
