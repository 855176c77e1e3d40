use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::types::BigDecimal;
use sqlx::{Column, Row, TypeInfo};

use crate::database::manager::DatabaseError;

/// How a statement's result is read back from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Plain SELECT; every row comes back as a JSON object, in the statement's own order
    Select,
    /// INSERT/UPDATE/DELETE with a RETURNING clause
    Returning,
    /// Statement without a result set; only the affected-row count matters
    Execute,
}

/// One parameterized SQL statement. Values are always bound, never spliced into `sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    pub kind: StatementKind,
}

impl Statement {
    pub fn select(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: vec![], kind: StatementKind::Select }
    }

    pub fn returning(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: vec![], kind: StatementKind::Returning }
    }

    pub fn execute(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: vec![], kind: StatementKind::Execute }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// What the store reported back for one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub rows: Vec<Value>,
    pub rows_affected: u64,
}

impl QueryOutcome {
    pub fn from_rows(rows: Vec<Value>) -> Self {
        let rows_affected = rows.len() as u64;
        Self { rows, rows_affected }
    }

    pub fn affected(rows_affected: u64) -> Self {
        Self { rows: vec![], rows_affected }
    }
}

/// The store seam: runs exactly one statement per call
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn run(&self, statement: &Statement) -> Result<QueryOutcome, DatabaseError>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub(crate) fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

/// One result row as a JSON object keyed by column name
pub(crate) fn row_to_json(row: &PgRow) -> Result<Value, DatabaseError> {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_value(row, i)?);
    }
    Ok(Value::Object(object))
}

fn column_value(row: &PgRow, index: usize) -> Result<Value, DatabaseError> {
    let type_name = row.columns()[index].type_info().name().to_string();

    let value = match type_name.as_str() {
        "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        "FLOAT4" => row.try_get::<Option<f32>, _>(index)?.map(|f| float_value(f64::from(f))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index)?.map(float_value),
        "NUMERIC" => row.try_get::<Option<BigDecimal>, _>(index)?.map(|d| numeric_value(&d)),
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row.try_get::<Option<String>, _>(index)?.map(Value::String),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|ts| Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|ts| Value::String(ts.to_rfc3339())),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(index)?.map(|d| Value::String(d.to_string())),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
        other => return Err(DatabaseError::RowFormat(format!("unsupported column type {}", other))),
    };

    Ok(value.unwrap_or(Value::Null))
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

// NUMERIC renders as a JSON number; text only if it cannot be represented as one
fn numeric_value(d: &BigDecimal) -> Value {
    let text = d.to_string();
    serde_json::from_str::<Number>(&text).map(Value::Number).unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use serde_json::json;

    #[test]
    fn statements_keep_their_sql_and_bind_order() {
        let st = Statement::select("SELECT * FROM records WHERE status = $1 ORDER BY id DESC").bind("open");
        assert_eq!(st.sql, "SELECT * FROM records WHERE status = $1 ORDER BY id DESC");
        assert_eq!(st.kind, StatementKind::Select);
        assert_eq!(st.params, vec![json!("open")]);

        let st = Statement::execute("DELETE FROM records WHERE id = $1").bind(7);
        assert_eq!(st.kind, StatementKind::Execute);
        assert_eq!(st.params, vec![json!(7)]);
    }

    #[test]
    fn numeric_renders_as_json_number() {
        let d = BigDecimal::from_str("50.00").unwrap();
        assert_eq!(numeric_value(&d).as_f64(), Some(50.0));

        let d = BigDecimal::from_str("19.99").unwrap();
        assert_eq!(numeric_value(&d), json!(19.99));
    }

    #[test]
    fn non_finite_float_is_null() {
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(1.5), json!(1.5));
    }

    #[test]
    fn outcome_counts_returned_rows() {
        let outcome = QueryOutcome::from_rows(vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(outcome.rows_affected, 2);
        assert_eq!(QueryOutcome::affected(0).rows_affected, 0);
    }
}
