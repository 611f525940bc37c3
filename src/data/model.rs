use std::collections::BTreeSet;
use std::fmt;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Value – a single cell as read from the source
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Guess the type of a raw text cell the way a CSV reader would.
    pub fn guess(s: &str) -> Value {
        let s = s.trim();
        if s.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        Value::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Float,
    Categorical,
}

impl FieldType {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
}

/// Ordered field list, fixed at load time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Numeric fields in schema order.
    pub fn numeric_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.kind.is_numeric())
    }
}

// ---------------------------------------------------------------------------
// Outcome – the binary target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Negative,
    Positive,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Negative, Outcome::Positive];

    fn from_code(v: f64) -> Option<Self> {
        if v == 0.0 {
            Some(Outcome::Negative)
        } else if v == 1.0 {
            Some(Outcome::Positive)
        } else {
            None
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Outcome::Negative => 0,
            Outcome::Positive => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Negative => "No Diabetes",
            Outcome::Positive => "Diabetes",
        }
    }
}

// ---------------------------------------------------------------------------
// Raw table – loader output before schema inference
// ---------------------------------------------------------------------------

/// Header plus rows of loosely typed cells, as produced by the file loaders.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<Option<String>>),
}

/// Column-oriented, immutable table with an explicit schema and a validated
/// binary target column. Row identity is the row index in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    columns: Vec<ColumnData>,
    target: String,
    outcomes: Vec<Outcome>,
    n_rows: usize,
}

impl Dataset {
    /// Infer the schema from raw cells and validate the target column.
    ///
    /// A column is `Integer` when every cell is an integer, `Float` when every
    /// cell is numeric, and `Categorical` otherwise. Numeric columns may not
    /// contain empty cells.
    pub fn from_raw(raw: RawTable, target: &str) -> Result<Self, SchemaError> {
        let width = raw.headers.len();
        let mut seen = BTreeSet::new();
        for h in &raw.headers {
            if !seen.insert(h.as_str()) {
                return Err(SchemaError::DuplicateColumn(h.clone()));
            }
        }
        for (row, cells) in raw.rows.iter().enumerate() {
            if cells.len() != width {
                return Err(SchemaError::RowArity {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }

        let mut fields = Vec::with_capacity(width);
        let mut columns = Vec::with_capacity(width);

        for (col, name) in raw.headers.iter().enumerate() {
            let cells = raw.rows.iter().map(|r| &r[col]);
            let kind = infer_kind(cells.clone());
            let data = match kind {
                FieldType::Integer | FieldType::Float => {
                    let mut values = Vec::with_capacity(raw.rows.len());
                    for (row, cell) in cells.enumerate() {
                        let v = cell.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                            SchemaError::MissingNumeric {
                                column: name.clone(),
                                row,
                            }
                        })?;
                        values.push(v);
                    }
                    ColumnData::Numeric(values)
                }
                FieldType::Categorical => ColumnData::Text(
                    cells
                        .map(|c| match c {
                            Value::Null => None,
                            other => Some(other.to_string()),
                        })
                        .collect(),
                ),
            };
            fields.push(Field {
                name: name.clone(),
                kind,
            });
            columns.push(data);
        }

        Self::assemble(Schema { fields }, columns, target, raw.rows.len())
    }

    /// Build a dataset directly from numeric columns. Columns whose values are
    /// all integral are typed `Integer`.
    pub fn from_numeric_columns(
        columns: Vec<(String, Vec<f64>)>,
        target: &str,
    ) -> Result<Self, SchemaError> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut fields = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut seen = BTreeSet::new();

        for (name, values) in columns {
            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateColumn(name));
            }
            if values.len() != n_rows {
                return Err(SchemaError::RowArity {
                    row: values.len().min(n_rows),
                    expected: n_rows,
                    found: values.len(),
                });
            }
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(SchemaError::MissingNumeric { column: name, row });
            }
            let kind = if values.iter().all(|v| v.fract() == 0.0) {
                FieldType::Integer
            } else {
                FieldType::Float
            };
            fields.push(Field { name, kind });
            data.push(ColumnData::Numeric(values));
        }

        Self::assemble(Schema { fields }, data, target, n_rows)
    }

    fn assemble(
        schema: Schema,
        columns: Vec<ColumnData>,
        target: &str,
        n_rows: usize,
    ) -> Result<Self, SchemaError> {
        let idx = schema
            .index_of(target)
            .ok_or_else(|| SchemaError::MissingTarget(target.to_string()))?;
        let ColumnData::Numeric(codes) = &columns[idx] else {
            return Err(SchemaError::NonNumericTarget(target.to_string()));
        };
        let outcomes = codes
            .iter()
            .enumerate()
            .map(|(row, &v)| {
                Outcome::from_code(v).ok_or_else(|| SchemaError::NonBinaryTarget {
                    column: target.to_string(),
                    row,
                    value: v.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dataset {
            schema,
            columns,
            target: target.to_string(),
            outcomes,
            n_rows,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Name of the binary target field.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Numeric fields excluding the target, in schema order.
    pub fn features(&self) -> Vec<&str> {
        self.schema
            .numeric_fields()
            .filter(|f| f.name != self.target)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Borrow a numeric column by name.
    pub fn numeric(&self, name: &str) -> Result<&[f64], SchemaError> {
        let idx = self
            .schema
            .index_of(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        match &self.columns[idx] {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(_) => Err(SchemaError::NotNumeric(name.to_string())),
        }
    }

    /// Outcome label of each record.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// The cell at (`row`, column index), typed per the schema.
    pub fn value(&self, row: usize, col: usize) -> Value {
        let kind = self.schema.fields[col].kind;
        match &self.columns[col] {
            ColumnData::Numeric(values) => match kind {
                FieldType::Integer => Value::Integer(values[row] as i64),
                _ => Value::Float(values[row]),
            },
            ColumnData::Text(values) => values[row]
                .as_ref()
                .map(|s| Value::Text(s.clone()))
                .unwrap_or(Value::Null),
        }
    }

    /// All cells of one record in schema order.
    pub fn row(&self, row: usize) -> Vec<Value> {
        (0..self.schema.len()).map(|c| self.value(row, c)).collect()
    }

    /// Minimum and maximum of a numeric column (`None` when empty).
    pub fn range(&self, name: &str) -> Result<Option<(f64, f64)>, SchemaError> {
        let values = self.numeric(name)?;
        Ok(values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        }))
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a Value>) -> FieldType {
    let mut kind = None;
    for cell in cells {
        kind = match (kind, cell) {
            (_, Value::Null) => kind,
            (_, Value::Text(_)) => return FieldType::Categorical,
            (None | Some(FieldType::Integer), Value::Integer(_)) => Some(FieldType::Integer),
            (_, Value::Integer(_) | Value::Float(_)) => Some(FieldType::Float),
        };
    }
    kind.unwrap_or(FieldType::Categorical)
}
