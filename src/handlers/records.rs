// Records: the only entity with a full create/read/update/delete lifecycle.

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde_json::Value;

use crate::database::models::{ErrorBody, MessageBody, Record, RecordCreated, RecordUpdated};
use crate::database::Statement;
use crate::middleware::ApiResult;
use crate::state::AppState;

use super::pipeline::{dispatch, Endpoint, Field, FieldKind, Outcome, Params};

pub const ADD_RECORD: Endpoint = Endpoint {
    name: "addRecord",
    fields: &[
        Field::required("name", FieldKind::Text),
        Field::required("status", FieldKind::Text),
    ],
    build: insert_record,
    outcome: Outcome::Created { key: "Record", message: "Add Record Successfully!" },
};

pub const GET_RECORDS: Endpoint = Endpoint {
    name: "getRecords",
    fields: &[Field::optional("status", FieldKind::Text)],
    build: select_records,
    outcome: Outcome::Rows,
};

pub const UPDATE_RECORD: Endpoint = Endpoint {
    name: "updateRecord",
    fields: &[
        Field::required("id", FieldKind::Integer),
        Field::required("name", FieldKind::Text),
        Field::required("status", FieldKind::Text),
    ],
    build: update_record_by_id,
    outcome: Outcome::Updated { key: "record", message: "Record updated successfully!", entity: "Record" },
};

pub const DELETE_RECORD: Endpoint = Endpoint {
    name: "deleteRecord",
    fields: &[Field::required("id", FieldKind::Integer)],
    build: delete_record_by_id,
    outcome: Outcome::Deleted { message: "Record deleted successfully", entity: "Record" },
};

fn insert_record(p: &Params) -> Statement {
    Statement::returning("INSERT INTO records (name, status) VALUES ($1, $2) RETURNING *")
        .bind(p.get("name"))
        .bind(p.get("status"))
}

// No status means no filter
fn select_records(p: &Params) -> Statement {
    if p.contains("status") {
        Statement::select("SELECT * FROM records WHERE status = $1").bind(p.get("status"))
    } else {
        Statement::select("SELECT * FROM records")
    }
}

fn update_record_by_id(p: &Params) -> Statement {
    Statement::returning("UPDATE records SET name = $1, status = $2 WHERE id = $3 RETURNING *")
        .bind(p.get("name"))
        .bind(p.get("status"))
        .bind(p.get("id"))
}

fn delete_record_by_id(p: &Params) -> Statement {
    Statement::execute("DELETE FROM records WHERE id = $1").bind(p.get("id"))
}

/// POST /api/records/addRecord - Add a new record
#[utoipa::path(
    post,
    path = "/api/records/addRecord",
    tag = "Records",
    params(
        ("name" = String, Query, description = "Name of the record"),
        ("status" = String, Query, description = "Status of the record"),
    ),
    responses(
        (status = 201, description = "Record added successfully", body = RecordCreated),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn add_record(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&ADD_RECORD, state.store.as_ref(), &query).await
}

/// GET /api/records/getRecords - All records, or only those with the given status
#[utoipa::path(
    get,
    path = "/api/records/getRecords",
    tag = "Records",
    params(
        ("status" = Option<String>, Query, description = "Filter records by status"),
    ),
    responses(
        (status = 200, description = "List of records", body = [Record]),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&GET_RECORDS, state.store.as_ref(), &query).await
}

/// PUT /api/records/updateRecord - Update a record by id
#[utoipa::path(
    put,
    path = "/api/records/updateRecord",
    tag = "Records",
    params(
        ("id" = i32, Query, description = "ID of the record"),
        ("name" = String, Query, description = "Updated name"),
        ("status" = String, Query, description = "Updated status"),
    ),
    responses(
        (status = 200, description = "Record updated successfully", body = RecordUpdated),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Record not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn update_record(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&UPDATE_RECORD, state.store.as_ref(), &query).await
}

/// DELETE /api/records/deleteRecord - Delete a record by id
#[utoipa::path(
    delete,
    path = "/api/records/deleteRecord",
    tag = "Records",
    params(
        ("id" = i32, Query, description = "ID of the record"),
    ),
    responses(
        (status = 200, description = "Record deleted successfully", body = MessageBody),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Record not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&DELETE_RECORD, state.store.as_ref(), &query).await
}
