use super::model::Dataset;
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Threshold predicate: `field > threshold`
// ---------------------------------------------------------------------------

/// The dashboard's threshold filter. The comparison is strict, so rows equal
/// to the threshold are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub threshold: f64,
}

impl Predicate {
    pub fn greater_than(field: &str, threshold: i64) -> Self {
        Predicate {
            field: field.to_string(),
            threshold: threshold as f64,
        }
    }

    pub fn accepts(&self, value: f64) -> bool {
        value > self.threshold
    }
}

// ---------------------------------------------------------------------------
// Filtered view: row indices passing a predicate
// ---------------------------------------------------------------------------

/// Non-owning projection of a [`Dataset`]: indices of the rows that pass,
/// in the dataset's natural order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredView {
    pub indices: Vec<usize>,
}

impl FilteredView {
    pub fn all(dataset: &Dataset) -> Self {
        FilteredView {
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The first `n` rows of the view.
    pub fn head(&self, n: usize) -> FilteredView {
        FilteredView {
            indices: self.indices.iter().take(n).copied().collect(),
        }
    }
}

/// Return indices of records that satisfy `predicate`. Filtering to zero rows
/// is not an error.
pub fn filtered_indices(
    dataset: &Dataset,
    predicate: &Predicate,
) -> Result<FilteredView, SchemaError> {
    let values = dataset.numeric(&predicate.field)?;
    let indices = values
        .iter()
        .enumerate()
        .filter(|(_, v)| predicate.accepts(**v))
        .map(|(i, _)| i)
        .collect();
    Ok(FilteredView { indices })
}
