//! Static derived views: summary statistics, correlations, distributions.
//!
//! Everything here is a pure function of the [`Dataset`]. Undefined results
//! (constant columns, too few rows) are reported as `None` /
//! [`Correlation::Undefined`] and never as NaN.

use std::cmp::Ordering;
use std::fmt;

use super::model::{Dataset, Outcome};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// A Pearson coefficient, or `Undefined` when either input is constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    Defined(f64),
    Undefined,
}

impl Correlation {
    pub fn value(self) -> Option<f64> {
        match self {
            Correlation::Defined(r) => Some(r),
            Correlation::Undefined => None,
        }
    }

    /// Descending by value; undefined sorts last.
    fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Correlation::Defined(a), Correlation::Defined(b)) => {
                b.partial_cmp(a).unwrap_or(Ordering::Equal)
            }
            (Correlation::Defined(_), Correlation::Undefined) => Ordering::Less,
            (Correlation::Undefined, Correlation::Defined(_)) => Ordering::Greater,
            (Correlation::Undefined, Correlation::Undefined) => Ordering::Equal,
        }
    }
}

/// Two decimals for display, or "not defined".
impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correlation::Defined(r) => write!(f, "{r:.2}"),
            Correlation::Undefined => write!(f, "not defined"),
        }
    }
}

pub fn pearson(xs: &[f64], ys: &[f64]) -> Correlation {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Correlation::Undefined;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Correlation::Undefined;
    }
    let r = sxy / (sxx * syy).sqrt();
    if !r.is_finite() {
        return Correlation::Undefined;
    }
    Correlation::Defined(r.clamp(-1.0, 1.0))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

// ---------------------------------------------------------------------------
// Summary statistics (describe())
// ---------------------------------------------------------------------------

/// Row labels of the summary table, in display order.
pub const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub field: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl FieldSummary {
    fn from_values(field: &str, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let mean = (count > 0).then(|| mean(&sorted));
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        FieldSummary {
            field: field.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    /// Values in [`STATISTICS`] order.
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    pub fields: Vec<FieldSummary>,
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// count / mean / std / min / quartiles / max for every numeric field.
pub fn compute_summary(dataset: &Dataset) -> SummaryTable {
    let fields = dataset
        .schema()
        .numeric_fields()
        .filter_map(|f| {
            let values = dataset.numeric(&f.name).ok()?;
            Some(FieldSummary::from_values(&f.name, values))
        })
        .collect();
    SummaryTable { fields }
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pearson correlation over all numeric field pairs. `cells[i][j]` pairs
/// `fields[i]` with `fields[j]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationMatrix {
    pub fields: Vec<String>,
    pub cells: Vec<Vec<Correlation>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Correlation {
        self.cells[i][j]
    }
}

pub fn compute_correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns: Vec<(&str, &[f64])> = dataset
        .schema()
        .numeric_fields()
        .filter_map(|f| Some((f.name.as_str(), dataset.numeric(&f.name).ok()?)))
        .collect();
    let n = columns.len();
    let mut cells = vec![vec![Correlation::Undefined; n]; n];

    for i in 0..n {
        let (_, xi) = columns[i];
        if xi.len() >= 2 && !is_constant(xi) {
            cells[i][i] = Correlation::Defined(1.0);
        }
        for j in (i + 1)..n {
            let r = pearson(xi, columns[j].1);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    CorrelationMatrix {
        fields: columns.iter().map(|(name, _)| name.to_string()).collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// Feature importance: correlation with the target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCorrelation {
    pub field: String,
    pub correlation: Correlation,
}

/// Every feature ranked by its correlation with the target, highest first.
/// Ties keep schema order; undefined correlations go last.
pub fn compute_feature_importance(dataset: &Dataset) -> Vec<FeatureCorrelation> {
    let Ok(target) = dataset.numeric(dataset.target()) else {
        return Vec::new();
    };
    let mut ranked: Vec<FeatureCorrelation> = dataset
        .features()
        .into_iter()
        .filter_map(|name| {
            let values = dataset.numeric(name).ok()?;
            Some(FeatureCorrelation {
                field: name.to_string(),
                correlation: pearson(values, target),
            })
        })
        .collect();
    // sort_by is stable, so equal correlations keep field order.
    ranked.sort_by(|a, b| a.correlation.cmp_desc(&b.correlation));
    ranked
}

// ---------------------------------------------------------------------------
// Outcome distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutcomeDistribution {
    pub negative: usize,
    pub positive: usize,
}

impl OutcomeDistribution {
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Negative => self.negative,
            Outcome::Positive => self.positive,
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.positive
    }

    /// Slices ordered by count, largest first.
    pub fn slices(&self) -> Vec<(Outcome, usize)> {
        let mut slices: Vec<_> = Outcome::ALL.iter().map(|&o| (o, self.count(o))).collect();
        slices.sort_by(|a, b| b.1.cmp(&a.1));
        slices
    }
}

pub fn compute_outcome_distribution(dataset: &Dataset) -> OutcomeDistribution {
    dataset
        .outcomes()
        .iter()
        .fold(OutcomeDistribution::default(), |mut acc, o| {
            match o {
                Outcome::Negative => acc.negative += 1,
                Outcome::Positive => acc.positive += 1,
            }
            acc
        })
}

// ---------------------------------------------------------------------------
// Histograms split by outcome
// ---------------------------------------------------------------------------

/// Equal-width bins over one field with a count per outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub field: String,
    /// `bins + 1` bin edges.
    pub edges: Vec<f64>,
    /// `counts[outcome.code()][bin]`.
    pub counts: [Vec<usize>; 2],
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [a, b, ..] => b - a,
            _ => 0.0,
        }
    }

    pub fn counts_for(&self, outcome: Outcome) -> &[usize] {
        &self.counts[outcome.code() as usize]
    }
}

pub fn compute_histogram(
    dataset: &Dataset,
    field: &str,
    bins: usize,
) -> Result<Histogram, SchemaError> {
    let values = dataset.numeric(field)?;
    let Some((lo, hi)) = dataset.range(field)? else {
        return Ok(Histogram {
            field: field.to_string(),
            edges: Vec::new(),
            counts: [Vec::new(), Vec::new()],
        });
    };

    let (lo, bins, width) = if hi > lo {
        let bins = bins.max(1);
        (lo, bins, (hi - lo) / bins as f64)
    } else {
        (lo - 0.5, 1, 1.0)
    };
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = [vec![0usize; bins], vec![0usize; bins]];

    for (&v, outcome) in values.iter().zip(dataset.outcomes()) {
        let bin = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[outcome.code() as usize][bin] += 1;
    }

    Ok(Histogram {
        field: field.to_string(),
        edges,
        counts,
    })
}

// ---------------------------------------------------------------------------
// Ordinary least squares trend line
// ---------------------------------------------------------------------------

/// `y = slope * x + intercept`, drawn between `x_min` and `x_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl TrendLine {
    pub fn y_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y` on `x`. `None` with fewer than two points or no spread in `x`.
pub fn fit_ols(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxx, mut sxy) = (0.0, 0.0);
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        sxx += (x - mean_x).powi(2);
        sxy += (x - mean_x) * (y - mean_y);
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
        x_min,
        x_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn dataset() -> Dataset {
        Dataset::from_numeric_columns(
            vec![
                ("A".into(), vec![1.0, 2.0, 3.0, 4.0]),
                ("B".into(), vec![2.0, 4.0, 6.0, 8.0]),
                ("C".into(), vec![5.0, 5.0, 5.0, 5.0]),
                ("Outcome".into(), vec![0.0, 0.0, 1.0, 1.0]),
            ],
            "Outcome",
        )
        .unwrap()
    }

    #[test]
    fn pearson_perfect_and_constant() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), Correlation::Defined(-1.0));
        assert_eq!(pearson(&[1.0, 1.0], &[1.0, 2.0]), Correlation::Undefined);
        assert_eq!(pearson(&[1.0], &[1.0]), Correlation::Undefined);
    }

    #[test]
    fn pearson_never_defines_a_non_finite_value() {
        assert_eq!(pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]), Correlation::Undefined);
        assert_eq!(
            pearson(&[0.0, f64::MAX, -f64::MAX], &[1.0, 2.0, 4.0]),
            Correlation::Undefined
        );
    }

    #[test]
    fn signed_zero_correlations_tie() {
        let neg = Correlation::Defined(-0.0);
        let pos = Correlation::Defined(0.0);
        assert_eq!(neg.cmp_desc(&pos), Ordering::Equal);
        assert_eq!(pos.cmp_desc(&neg), Ordering::Equal);
        assert_eq!(pos.cmp_desc(&Correlation::Undefined), Ordering::Less);
    }

    #[test]
    fn correlation_display() {
        assert_eq!(Correlation::Defined(0.4667).to_string(), "0.47");
        assert_eq!(Correlation::Undefined.to_string(), "not defined");
    }

    #[test]
    fn summary_matches_describe() {
        let table = compute_summary(&dataset());
        let a = &table.fields[0];
        assert_eq!(a.field, "A");
        assert_eq!(a.count, 4);
        assert_eq!(a.mean, Some(2.5));
        assert!(approx(a.std.unwrap(), (5.0f64 / 3.0).sqrt()));
        assert_eq!(a.min, Some(1.0));
        assert_eq!(a.q25, Some(1.75));
        assert_eq!(a.median, Some(2.5));
        assert_eq!(a.q75, Some(3.25));
        assert_eq!(a.max, Some(4.0));
        assert_eq!(table.fields.len(), 4);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let m = compute_correlation_matrix(&dataset());
        assert_eq!(m.fields, vec!["A", "B", "C", "Outcome"]);
        for i in 0..m.fields.len() {
            for j in 0..m.fields.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.get(0, 0), Correlation::Defined(1.0));
        assert_eq!(m.get(0, 1), Correlation::Defined(1.0));
        assert_eq!(m.get(2, 2), Correlation::Undefined);
        assert_eq!(m.get(0, 2), Correlation::Undefined);
    }

    #[test]
    fn feature_importance_orders_by_correlation() {
        let ds = Dataset::from_numeric_columns(
            vec![
                ("Weak".into(), vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0]),
                ("Flat".into(), vec![3.0; 6]),
                ("Strong".into(), vec![0.1, 0.2, 0.0, 0.9, 1.0, 0.8]),
                ("Outcome".into(), vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            ],
            "Outcome",
        )
        .unwrap();
        let ranked = compute_feature_importance(&ds);
        let names: Vec<_> = ranked.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["Strong", "Weak", "Flat"]);
        assert_eq!(ranked[2].correlation, Correlation::Undefined);
    }

    #[test]
    fn feature_importance_ties_keep_field_order() {
        let ds = Dataset::from_numeric_columns(
            vec![
                ("First".into(), vec![0.0, 1.0]),
                ("Second".into(), vec![0.0, 1.0]),
                ("Outcome".into(), vec![0.0, 1.0]),
            ],
            "Outcome",
        )
        .unwrap();
        let names: Vec<_> = compute_feature_importance(&ds)
            .into_iter()
            .map(|f| f.field)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn outcome_distribution_counts() {
        let dist = compute_outcome_distribution(&dataset());
        assert_eq!(dist, OutcomeDistribution { negative: 2, positive: 2 });
        assert_eq!(dist.total(), 4);
    }

    #[test]
    fn histogram_splits_by_outcome() {
        let h = compute_histogram(&dataset(), "A", 3).unwrap();
        assert_eq!(h.bin_count(), 3);
        assert!(approx(h.bin_width(), 1.0));
        assert_eq!(h.counts_for(Outcome::Negative), &[1, 1, 0]);
        assert_eq!(h.counts_for(Outcome::Positive), &[0, 0, 2]);
    }

    #[test]
    fn histogram_of_constant_field_has_one_bin() {
        let h = compute_histogram(&dataset(), "C", 10).unwrap();
        assert_eq!(h.bin_count(), 1);
        assert_eq!(h.counts_for(Outcome::Negative), &[2]);
    }

    #[test]
    fn ols_fit() {
        let line = fit_ols(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!(approx(line.slope, 2.0));
        assert!(approx(line.intercept, 1.0));
        assert_eq!((line.x_min, line.x_max), (0.0, 2.0));
        assert!(fit_ols(&[(1.0, 1.0)]).is_none());
        assert!(fit_ols(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
    }
}
