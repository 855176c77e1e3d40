#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use tower::ServiceExt;

use orders_api::config::AppConfig;
use orders_api::database::{DatabaseError, DatabaseManager, QueryExecutor, QueryOutcome, Statement};
use orders_api::{app, AppState};

pub const API_KEY: &str = "test-secret";

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "API_KEY" => Some(API_KEY.to_string()),
        "DATABASE_URL" => Some("postgres://unused@localhost/unused".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// What the fake store answers with
#[derive(Clone)]
pub enum Reply {
    Outcome(QueryOutcome),
    Fail,
}

/// In-memory store that records every statement it is asked to run
pub struct RecordingStore {
    calls: Mutex<Vec<Statement>>,
    reply: Mutex<Reply>,
}

impl RecordingStore {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(vec![]), reply: Mutex::new(reply) })
    }

    pub fn calls(&self) -> Vec<Statement> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for RecordingStore {
    async fn run(&self, statement: &Statement) -> Result<QueryOutcome, DatabaseError> {
        self.calls.lock().unwrap().push(statement.clone());
        match self.reply.lock().unwrap().clone() {
            Reply::Outcome(outcome) => Ok(outcome),
            Reply::Fail => Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        match *self.reply.lock().unwrap() {
            Reply::Outcome(_) => Ok(()),
            Reply::Fail => Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)),
        }
    }
}

pub fn fake_app(store: Arc<RecordingStore>) -> Router {
    app(AppState::new(test_config(), store))
}

/// Send one request through the router in-process and decode the JSON body
pub async fn send(app: &Router, method: Method, uri: &str, api_key: Option<&str>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let response = app.clone().oneshot(builder.body(Body::empty())?).await?;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

/// Router wired to a real Postgres, isolated in its own schema
pub struct PgHarness {
    pub app: Router,
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl PgHarness {
    /// `None` when DATABASE_URL is not set; those tests then pass without running
    pub async fn start() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping Postgres-backed test");
            return Ok(None);
        };

        let schema = unique_schema_name();
        let admin = PgPoolOptions::new().max_connections(1).connect(&url).await?;
        admin.execute(format!("CREATE SCHEMA {}", schema).as_str()).await?;

        let search_path = schema.clone();
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .after_connect(move |conn, _meta| {
                let sql = format!("SET search_path TO {}", search_path);
                Box::pin(async move {
                    conn.execute(sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await?;
        pool.execute(SCHEMA_SQL).await?;

        let store = DatabaseManager::from_pool(pool.clone(), Duration::from_secs(5));
        let app = app(AppState::new(test_config(), Arc::new(store)));

        Ok(Some(Self { app, pool, admin, schema }))
    }

    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;
        self.admin
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await?;
        Ok(())
    }
}

fn unique_schema_name() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    format!(
        "orders_api_test_{}_{}_{}",
        std::process::id(),
        nanos % 1_000_000_000,
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
