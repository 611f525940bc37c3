use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::filter::FilteredView;
use crate::data::model::Dataset;
use crate::data::source::Catalog;
use crate::data::stats::{
    compute_correlation_matrix, compute_feature_importance, compute_histogram,
    compute_outcome_distribution, compute_summary, CorrelationMatrix, FeatureCorrelation,
    Histogram, OutcomeDistribution, SummaryTable,
};
use crate::error::DashboardError;
use crate::pipeline::{recompute, QueryTarget, Recomputed};
use crate::state::{WidgetDomain, WidgetEvent, WidgetState};

// ---------------------------------------------------------------------------
// Views computed once per session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StaticViews {
    pub sample: FilteredView,
    pub summary: SummaryTable,
    pub histograms: Vec<Histogram>,
    pub correlation_matrix: CorrelationMatrix,
    pub outcome_distribution: OutcomeDistribution,
    pub feature_importance: Vec<FeatureCorrelation>,
}

impl StaticViews {
    pub fn compute(dataset: &Dataset, config: &DashboardConfig) -> Self {
        let histograms = config
            .histogram_fields
            .iter()
            .filter_map(|field| match compute_histogram(dataset, field, config.histogram_bins) {
                Ok(h) => Some(h),
                Err(e) => {
                    log::warn!("skipping histogram for '{field}': {e}");
                    None
                }
            })
            .collect();

        StaticViews {
            sample: FilteredView::all(dataset).head(config.sample_rows),
            summary: compute_summary(dataset),
            histograms,
            correlation_matrix: compute_correlation_matrix(dataset),
            outcome_distribution: compute_outcome_distribution(dataset),
            feature_importance: compute_feature_importance(dataset),
        }
    }
}

// ---------------------------------------------------------------------------
// Session: the explicit dashboard context
// ---------------------------------------------------------------------------

/// Everything one dashboard session owns. Created at start-up, changed only
/// through [`Session::handle`], dropped at exit.
pub struct Session {
    config: DashboardConfig,
    catalog: Catalog,
    dataset: Arc<Dataset>,
    domain: WidgetDomain,
    widgets: WidgetState,
    static_views: StaticViews,
    current: Recomputed,
}

impl Session {
    /// Open the configured source and compute the initial views. Any failure
    /// here aborts start-up.
    pub fn start(config: DashboardConfig) -> Result<Self, DashboardError> {
        let catalog = Catalog::connect(&config);
        Self::with_catalog(config, catalog)
    }

    pub fn with_catalog(
        config: DashboardConfig,
        mut catalog: Catalog,
    ) -> Result<Self, DashboardError> {
        let dataset = catalog.get_dataset(&config.source)?;
        let domain = WidgetDomain::from_dataset(&dataset)?;
        let widgets = WidgetState::initial(&domain);
        let static_views = StaticViews::compute(&dataset, &config);
        let current = recompute(
            &dataset,
            &widgets,
            QueryTarget {
                source: &config.source,
                limit: config.query_limit,
            },
            &catalog,
        )?;

        log::info!(
            "Session started on '{}': {} records, features {:?}, defaults {:?}",
            config.source,
            dataset.len(),
            domain.features(),
            widgets
        );

        Ok(Session {
            config,
            catalog,
            dataset,
            domain,
            widgets,
            static_views,
            current,
        })
    }

    /// Validate and apply one widget event, then recompute the dependent
    /// views. A rejected event leaves the session exactly as it was.
    pub fn handle(&mut self, event: WidgetEvent) -> Result<&Recomputed, DashboardError> {
        let mut next = self.widgets.clone();
        if let Err(e) = next.update(event.clone(), &self.domain) {
            log::warn!("rejected {event}: {e}");
            return Err(e);
        }
        if next == self.widgets {
            return Ok(&self.current);
        }

        let recomputed = recompute(
            &self.dataset,
            &next,
            QueryTarget {
                source: &self.config.source,
                limit: self.config.query_limit,
            },
            &self.catalog,
        )?;
        log::debug!("applied {event}");
        self.widgets = next;
        self.current = recomputed;
        Ok(&self.current)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn domain(&self) -> &WidgetDomain {
        &self.domain
    }

    pub fn widgets(&self) -> &WidgetState {
        &self.widgets
    }

    pub fn static_views(&self) -> &StaticViews {
        &self.static_views
    }

    pub fn current(&self) -> &Recomputed {
        &self.current
    }
}
