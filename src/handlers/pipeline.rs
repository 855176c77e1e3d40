//! The one request shape every endpoint shares:
//! extract query parameters → validate → build one statement → run it → map the outcome.
//!
//! An endpoint is plain data ([`Endpoint`]); [`dispatch`] is the only place that
//! decides status codes.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};
use sqlx::types::BigDecimal;

use crate::database::{QueryExecutor, QueryOutcome, Statement};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// How a raw query-string value is turned into a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Bound as BIGINT
    Integer,
    /// Kept as its decimal text and cast to NUMERIC in the statement, so no precision is lost
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// May be absent; the statement builder decides what absence means
    Optional,
    /// Absent values are replaced by this text; `None` binds SQL NULL
    Default(Option<&'static str>),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, presence: Presence::Required }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, presence: Presence::Optional }
    }

    pub const fn with_default(name: &'static str, kind: FieldKind, default: Option<&'static str>) -> Self {
        Self { name, kind, presence: Presence::Default(default) }
    }
}

/// Maps what the store returned onto a response
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// 201 `{ "message": .., <key>: <inserted row> }`
    Created { key: &'static str, message: &'static str },
    /// 200 with the rows as a JSON array
    Rows,
    /// 200 `{ "message": .., <key>: <updated row> }`, or 404 when nothing matched
    Updated { key: &'static str, message: &'static str, entity: &'static str },
    /// 200 `{ "message": .. }`, or 404 when nothing matched
    Deleted { message: &'static str, entity: &'static str },
}

/// Declarative description of one route
#[derive(Clone, Copy)]
pub struct Endpoint {
    pub name: &'static str,
    pub fields: &'static [Field],
    pub build: fn(&Params) -> Statement,
    pub outcome: Outcome,
}

/// Validated, typed parameters of one request
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    values: HashMap<&'static str, Value>,
}

impl Params {
    /// The bound value for `name`; `Null` when absent
    pub fn get(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl Endpoint {
    /// Pull declared fields out of the query string. Every missing required field
    /// is reported at once; an empty string counts as missing.
    pub fn extract(&self, query: &HashMap<String, String>) -> Result<Params, ApiError> {
        let raw_of = |name: &str| query.get(name).map(String::as_str).filter(|s| !s.is_empty());

        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.presence == Presence::Required && raw_of(f.name).is_none())
            .map(|f| f.name)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::missing_fields(&missing));
        }

        let mut params = Params::default();
        for field in self.fields {
            let value = match (raw_of(field.name), field.presence) {
                (Some(raw), _) => parse_value(field, raw)?,
                (None, Presence::Default(Some(default))) => parse_value(field, default)?,
                (None, Presence::Default(None)) => Value::Null,
                (None, _) => continue,
            };
            params.values.insert(field.name, value);
        }
        Ok(params)
    }
}

fn parse_value(field: &Field, raw: &str) -> Result<Value, ApiError> {
    match field.kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ApiError::bad_request(format!("Invalid value for {}: expected an integer", field.name))),
        FieldKind::Decimal => parse_decimal(raw)
            .map(|_| Value::String(raw.to_string()))
            .ok_or_else(|| ApiError::bad_request(format!("Invalid value for {}: expected a number", field.name))),
    }
}

/// Largest exponent Postgres NUMERIC input accepts. Checked before BigDecimal
/// sees the text, since its exponent arithmetic is unchecked.
const MAX_DECIMAL_EXPONENT: u64 = 1000;

fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    if let Some((_, exponent)) = raw.split_once(['e', 'E']) {
        let exponent: i64 = exponent.parse().ok()?;
        if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT {
            return None;
        }
    }
    BigDecimal::from_str(raw).ok()
}

impl Outcome {
    pub fn respond(self, outcome: QueryOutcome) -> ApiResult<Value> {
        match self {
            Outcome::Created { key, message } => {
                let row = first_row(outcome)?;
                Ok(ApiResponse::created(envelope(message, Some((key, row)))))
            }
            Outcome::Rows => Ok(ApiResponse::success(Value::Array(outcome.rows))),
            Outcome::Updated { key, message, entity } => {
                if outcome.rows_affected == 0 {
                    return Err(ApiError::not_found(format!("{} not found", entity)));
                }
                let row = first_row(outcome)?;
                Ok(ApiResponse::success(envelope(message, Some((key, row)))))
            }
            Outcome::Deleted { message, entity } => {
                if outcome.rows_affected == 0 {
                    return Err(ApiError::not_found(format!("{} not found", entity)));
                }
                Ok(ApiResponse::success(envelope(message, None)))
            }
        }
    }
}

fn first_row(outcome: QueryOutcome) -> Result<Value, ApiError> {
    outcome.rows.into_iter().next().ok_or_else(|| {
        tracing::error!("Statement reported success but returned no row");
        ApiError::internal_server_error()
    })
}

fn envelope(message: &str, row: Option<(&str, Value)>) -> Value {
    let mut body = Map::new();
    body.insert("message".into(), Value::String(message.to_string()));
    if let Some((key, row)) = row {
        body.insert(key.into(), row);
    }
    Value::Object(body)
}

/// Run one request through `endpoint`. Validation failures return before the store is touched.
pub async fn dispatch(
    endpoint: &Endpoint,
    store: &dyn QueryExecutor,
    query: &HashMap<String, String>,
) -> ApiResult<Value> {
    let params = endpoint.extract(query).map_err(|e| {
        tracing::debug!(endpoint = endpoint.name, "rejected: {}", e);
        e
    })?;

    let statement = (endpoint.build)(&params);
    let outcome = store.run(&statement).await.map_err(|e| {
        tracing::error!(endpoint = endpoint.name, "store call failed");
        ApiError::from(e)
    })?;

    endpoint.outcome.respond(outcome)
}
