//! SQL over an opened source, backed by an in-memory SQLite table.
//!
//! Each source is copied once into its own connection as a table named after
//! the source, rows inserted in dataset order.

use rusqlite::config::DbConfig;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};

use super::filter::FilteredView;
use super::model::{Dataset, FieldType, Value};
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Query collaborator seam
// ---------------------------------------------------------------------------

/// Anything that can answer a SQL query against a named source.
pub trait QueryEngine {
    fn query(&self, sql: &str, source: &str) -> Result<RowSet, QueryError>;
}

/// A materialised query result.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn from_view(dataset: &Dataset, view: &FilteredView) -> Self {
        RowSet {
            columns: dataset
                .schema()
                .fields()
                .iter()
                .map(|f| f.name.clone())
                .collect(),
            rows: view.indices.iter().map(|&i| dataset.row(i)).collect(),
        }
    }
}

/// `"name"` with embedded quotes doubled, so any field or source name is a
/// valid SQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `SELECT * FROM <source> WHERE <field> > <threshold> LIMIT <limit>`
pub fn threshold_sql(source: &str, field: &str, threshold: i64, limit: usize) -> String {
    format!(
        "SELECT * FROM {} WHERE {} > {threshold} LIMIT {limit}",
        quote_identifier(source),
        quote_identifier(field)
    )
}

// ---------------------------------------------------------------------------
// SQLite table
// ---------------------------------------------------------------------------

fn column_type(kind: FieldType) -> &'static str {
    match kind {
        FieldType::Integer => "INTEGER",
        FieldType::Float => "REAL",
        FieldType::Categorical => "TEXT",
    }
}

fn to_sql(value: Value) -> SqlValue {
    match value {
        Value::Integer(i) => SqlValue::Integer(i),
        Value::Float(v) => SqlValue::Real(v),
        Value::Text(s) => SqlValue::Text(s),
        Value::Null => SqlValue::Null,
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Text(format!("<{} bytes>", b.len())),
    }
}

/// Copy `dataset` into a fresh in-memory database as table `name`.
///
/// Double-quoted strings are identifiers only, so a misspelt column is an
/// error rather than a string literal.
pub fn materialize(name: &str, dataset: &Dataset) -> rusqlite::Result<Connection> {
    let mut db = Connection::open_in_memory()?;
    db.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)?;
    db.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)?;

    let fields = dataset.schema().fields();
    let table = quote_identifier(name);
    let columns = fields
        .iter()
        .map(|f| format!("{} {}", quote_identifier(&f.name), column_type(f.kind)))
        .collect::<Vec<_>>()
        .join(", ");
    db.execute(&format!("CREATE TABLE {table} ({columns})"), [])?;

    let placeholders = vec!["?"; fields.len()].join(", ");
    let tx = db.transaction()?;
    {
        let mut insert = tx.prepare(&format!("INSERT INTO {table} VALUES ({placeholders})"))?;
        for row in 0..dataset.len() {
            insert.execute(params_from_iter(dataset.row(row).into_iter().map(to_sql)))?;
        }
    }
    tx.commit()?;
    Ok(db)
}

/// Run `sql` and collect every row it returns.
pub fn run(db: &Connection, sql: &str) -> Result<RowSet, QueryError> {
    let mut stmt = db.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(from_sql))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(RowSet { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, Predicate};
    use crate::data::model::RawTable;

    fn dataset() -> Dataset {
        Dataset::from_numeric_columns(
            vec![
                ("Glucose".into(), vec![148.0, 85.0, 183.0, 89.0, 137.0]),
                ("BMI".into(), vec![33.6, 26.6, 23.3, 28.1, 43.1]),
                ("Outcome".into(), vec![1.0, 0.0, 1.0, 0.0, 1.0]),
            ],
            "Outcome",
        )
        .unwrap()
    }

    #[test]
    fn threshold_sql_quotes_identifiers() {
        assert_eq!(
            threshold_sql("pima-2024", "Blood \"BP\" Pressure", 64, 10),
            r#"SELECT * FROM "pima-2024" WHERE "Blood ""BP"" Pressure" > 64 LIMIT 10"#
        );
    }

    #[test]
    fn threshold_query_respects_limit_order_and_types() {
        let ds = dataset();
        let db = materialize("diabetes_csv", &ds).unwrap();
        let rows = run(&db, &threshold_sql("diabetes_csv", "Glucose", 100, 2)).unwrap();
        assert_eq!(rows.columns, vec!["Glucose", "BMI", "Outcome"]);
        assert_eq!(
            rows.rows,
            vec![
                vec![Value::Integer(148), Value::Float(33.6), Value::Integer(1)],
                vec![Value::Integer(183), Value::Float(23.3), Value::Integer(1)],
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let db = materialize("t", &dataset()).unwrap();
        let rows = run(&db, "select * from t where BMI <= 28.1 limit 5;").unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn awkward_names_agree_with_direct_filter() {
        let raw = RawTable {
            headers: vec!["Pregnancies".into(), "Blood Pressure".into(), "Outcome".into()],
            rows: vec![
                vec![Value::Integer(6), Value::Integer(72), Value::Integer(1)],
                vec![Value::Integer(1), Value::Integer(66), Value::Integer(0)],
                vec![Value::Integer(8), Value::Integer(64), Value::Integer(1)],
            ],
        };
        let ds = Dataset::from_raw(raw, "Outcome").unwrap();
        let db = materialize("pima-2024", &ds).unwrap();

        let rows = run(&db, &threshold_sql("pima-2024", "Blood Pressure", 64, 10)).unwrap();
        let view = filtered_indices(&ds, &Predicate::greater_than("Blood Pressure", 64)).unwrap();
        assert_eq!(view.indices, vec![0, 1]);
        assert_eq!(rows, RowSet::from_view(&ds, &view));
    }

    #[test]
    fn text_and_null_cells_survive() {
        let raw = RawTable {
            headers: vec!["Glucose".into(), "Clinic".into(), "Outcome".into()],
            rows: vec![
                vec![Value::Integer(148), Value::Text("north".into()), Value::Integer(1)],
                vec![Value::Integer(85), Value::Null, Value::Integer(0)],
            ],
        };
        let ds = Dataset::from_raw(raw, "Outcome").unwrap();
        let db = materialize("clinics", &ds).unwrap();
        let rows = run(&db, "SELECT * FROM clinics").unwrap();
        assert_eq!(rows, RowSet::from_view(&ds, &FilteredView::all(&ds)));
    }

    #[test]
    fn zero_limit_or_no_match_is_empty() {
        let db = materialize("t", &dataset()).unwrap();
        assert!(run(&db, "SELECT * FROM t LIMIT 0").unwrap().is_empty());
        assert!(run(&db, &threshold_sql("t", "Glucose", 183, 10)).unwrap().is_empty());
    }

    #[test]
    fn bad_sql_and_unknown_columns_fail() {
        let db = materialize("t", &dataset()).unwrap();
        for sql in [
            "SELECT * t",
            "SELECT * FROM t WHERE Glucose >",
            r#"SELECT * FROM t WHERE "Insulin" > 0"#,
            "SELECT * FROM other",
        ] {
            assert!(
                matches!(run(&db, sql), Err(QueryError::Engine(_))),
                "accepted: {sql}"
            );
        }
    }
}
