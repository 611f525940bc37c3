use thiserror::Error;

// ---------------------------------------------------------------------------
// Dashboard-level errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the session: rejected widget input and fatal load
/// failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    /// A widget update outside its declared domain. The previous widget
    /// state is kept.
    #[error("invalid selection for {control}: {reason}")]
    InvalidSelection { control: String, reason: String },

    /// The named data source could not be opened at session start.
    #[error("data source '{name}' unavailable: {reason}")]
    DataSourceUnavailable { name: String, reason: String },

    /// The dataset loaded but has no numeric feature to explore.
    #[error("dataset has no numeric features besides the target '{target}'")]
    NoFeatures { target: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DashboardError {
    pub fn invalid_selection(control: impl Into<String>, reason: impl Into<String>) -> Self {
        DashboardError::InvalidSelection {
            control: control.into(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema errors (raised once, at the load boundary)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("row {row} has {found} cells but the header has {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' is numeric but row {row} is empty")]
    MissingNumeric { column: String, row: usize },

    #[error("target column '{0}' not found")]
    MissingTarget(String),

    #[error("target column '{0}' is not numeric")]
    NonNumericTarget(String),

    #[error("target column '{column}' has non-binary value {value} at row {row}")]
    NonBinaryTarget {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is not numeric")]
    NotNumeric(String),
}

// ---------------------------------------------------------------------------
// Query collaborator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("unknown source '{0}'")]
    UnknownSource(String),

    #[error("source '{name}' could not be opened: {reason}")]
    Unavailable { name: String, reason: String },

    /// Rejected or failed inside the SQL engine: syntax, unknown table or
    /// column.
    #[error("query failed: {0}")]
    Engine(String),
}

impl From<rusqlite::Error> for QueryError {
    fn from(e: rusqlite::Error) -> Self {
        QueryError::Engine(e.to_string())
    }
}
