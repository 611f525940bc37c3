//! Filter-and-recompute: turn the current widget state into the views that
//! depend on it.
//!
//! [`recompute`] is pure with respect to its inputs: the same dataset, state
//! and query engine always produce the same [`Recomputed`].

use crate::data::filter::{filtered_indices, FilteredView, Predicate};
use crate::data::model::{Dataset, Outcome};
use crate::data::query::{threshold_sql, QueryEngine, RowSet};
use crate::data::stats::{fit_ols, pearson, Correlation, TrendLine};
use crate::error::{QueryError, SchemaError};
use crate::state::WidgetState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub outcome: Outcome,
}

/// Everything needed to draw the filtered scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSpec {
    pub x_feature: String,
    pub y_feature: String,
    pub title: String,
    pub points: Vec<ScatterPoint>,
    /// OLS fit over `points`; present only when requested and defined.
    pub trend: Option<TrendLine>,
}

/// Correlations over the unfiltered dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSummary {
    pub x_feature: String,
    pub y_feature: String,
    pub x_y: Correlation,
    pub x_target: Correlation,
    pub y_target: Correlation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    pub filtered: FilteredView,
    pub scatter: ScatterSpec,
    pub correlations: CorrelationSummary,
    pub query_sql: String,
    /// A failed query only affects this view.
    pub query: Result<RowSet, QueryError>,
}

/// Where and how the query view is fetched.
#[derive(Debug, Clone, Copy)]
pub struct QueryTarget<'a> {
    pub source: &'a str,
    pub limit: usize,
}

pub fn recompute<Q: QueryEngine + ?Sized>(
    dataset: &Dataset,
    state: &WidgetState,
    target: QueryTarget<'_>,
    engine: &Q,
) -> Result<Recomputed, SchemaError> {
    let xs = dataset.numeric(&state.x_feature)?;
    let ys = dataset.numeric(&state.y_feature)?;
    let outcome = dataset.numeric(dataset.target())?;

    let filtered = filtered_indices(
        dataset,
        &Predicate::greater_than(&state.x_feature, state.threshold),
    )?;

    let points: Vec<ScatterPoint> = filtered
        .indices
        .iter()
        .map(|&row| ScatterPoint {
            row,
            x: xs[row],
            y: ys[row],
            outcome: dataset.outcomes()[row],
        })
        .collect();
    let trend = if state.show_trend {
        let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        fit_ols(&pairs)
    } else {
        None
    };
    let scatter = ScatterSpec {
        x_feature: state.x_feature.clone(),
        y_feature: state.y_feature.clone(),
        title: format!(
            "{} vs {} by Diabetes Outcome (Filtered)",
            state.y_feature, state.x_feature
        ),
        points,
        trend,
    };

    let correlations = CorrelationSummary {
        x_feature: state.x_feature.clone(),
        y_feature: state.y_feature.clone(),
        x_y: pearson(xs, ys),
        x_target: pearson(xs, outcome),
        y_target: pearson(ys, outcome),
    };

    let query_sql = threshold_sql(target.source, &state.x_feature, state.threshold, target.limit);
    let query = engine.query(&query_sql, target.source);
    if let Err(e) = &query {
        log::warn!("query failed: {e}");
    }

    log::debug!(
        "recomputed {} > {}: {} of {} rows, trend {}",
        state.x_feature,
        state.threshold,
        filtered.len(),
        dataset.len(),
        if scatter.trend.is_some() { "fitted" } else { "omitted" }
    );

    Ok(Recomputed {
        filtered,
        scatter,
        correlations,
        query_sql,
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::Catalog;
    use std::sync::Arc;

    const SOURCE: &str = "diabetes_csv";

    fn setup() -> (Arc<Dataset>, Catalog) {
        let ds = Arc::new(
            Dataset::from_numeric_columns(
                vec![
                    ("Glucose".into(), vec![148.0, 85.0, 183.0, 89.0, 137.0, 0.0]),
                    ("BMI".into(), vec![33.6, 26.6, 23.3, 28.1, 43.1, 25.6]),
                    ("Flat".into(), vec![1.0; 6]),
                    ("Outcome".into(), vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]),
                ],
                "Outcome",
            )
            .unwrap(),
        );
        let mut catalog = Catalog::default();
        catalog.insert(SOURCE, Arc::clone(&ds));
        (ds, catalog)
    }

    fn state(threshold: i64, show_trend: bool) -> WidgetState {
        WidgetState {
            x_feature: "Glucose".into(),
            y_feature: "BMI".into(),
            show_trend,
            threshold,
        }
    }

    fn target() -> QueryTarget<'static> {
        QueryTarget {
            source: SOURCE,
            limit: 10,
        }
    }

    #[test]
    fn filters_and_fits_trend() {
        let (ds, catalog) = setup();
        let out = recompute(&ds, &state(0, true), target(), &catalog).unwrap();
        assert_eq!(out.filtered.indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(out.scatter.points.len(), 5);
        assert_eq!(out.scatter.points[2].outcome, Outcome::Positive);
        assert!(out.scatter.trend.is_some());
        assert_eq!(out.scatter.title, "BMI vs Glucose by Diabetes Outcome (Filtered)");
        assert_eq!(
            out.query_sql,
            r#"SELECT * FROM "diabetes_csv" WHERE "Glucose" > 0 LIMIT 10"#
        );
        assert_eq!(out.query.unwrap(), RowSet::from_view(&ds, &out.filtered));
    }

    #[test]
    fn trend_toggle_off_omits_line() {
        let (ds, catalog) = setup();
        let out = recompute(&ds, &state(0, false), target(), &catalog).unwrap();
        assert!(out.scatter.trend.is_none());
    }

    #[test]
    fn threshold_at_max_is_empty_not_error() {
        let (ds, catalog) = setup();
        let out = recompute(&ds, &state(183, true), target(), &catalog).unwrap();
        assert!(out.filtered.is_empty());
        assert!(out.scatter.points.is_empty());
        assert!(out.scatter.trend.is_none());
        assert!(out.query.unwrap().is_empty());
    }

    #[test]
    fn single_point_omits_trend() {
        let (ds, catalog) = setup();
        let out = recompute(&ds, &state(150, true), target(), &catalog).unwrap();
        assert_eq!(out.filtered.indices, vec![2]);
        assert!(out.scatter.trend.is_none());
    }

    #[test]
    fn correlations_use_unfiltered_data() {
        let (ds, catalog) = setup();
        let all = recompute(&ds, &state(0, true), target(), &catalog).unwrap();
        let few = recompute(&ds, &state(140, true), target(), &catalog).unwrap();
        assert_eq!(all.correlations, few.correlations);

        let mut flat = state(0, true);
        flat.y_feature = "Flat".into();
        let out = recompute(&ds, &flat, target(), &catalog).unwrap();
        assert_eq!(out.correlations.x_y, Correlation::Undefined);
        assert_eq!(out.correlations.y_target.to_string(), "not defined");
    }

    #[test]
    fn query_failure_is_isolated() {
        let (ds, _) = setup();
        let empty = Catalog::default();
        let out = recompute(&ds, &state(0, true), target(), &empty).unwrap();
        assert_eq!(out.query, Err(QueryError::UnknownSource(SOURCE.into())));
        assert_eq!(out.filtered.len(), 5);
    }

    #[test]
    fn recompute_is_idempotent() {
        let (ds, catalog) = setup();
        let s = state(88, true);
        let a = recompute(&ds, &s, target(), &catalog).unwrap();
        let b = recompute(&ds, &s, target(), &catalog).unwrap();
        assert_eq!(a, b);
    }
}
