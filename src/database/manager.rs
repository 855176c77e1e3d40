use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::executor::{bind_param, row_to_json, QueryExecutor, QueryOutcome, Statement, StatementKind};

/// Errors from the store. None of these are shown to API callers verbatim.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Statement timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected row format: {0}")]
    RowFormat(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the shared connection pool and runs statements against it
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
    statement_timeout: Duration,
}

impl DatabaseManager {
    /// Build the pool. Connections are opened on first use so the service can
    /// start (and report itself degraded) while the store is still down.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(&config.url)?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self::from_pool(pool, config.statement_timeout()))
    }

    pub fn from_pool(pool: PgPool, statement_timeout: Duration) -> Self {
        Self { pool, statement_timeout }
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    async fn run_unbounded(&self, statement: &Statement) -> Result<QueryOutcome, DatabaseError> {
        let mut q = sqlx::query(&statement.sql);
        for p in statement.params.iter() {
            q = bind_param(q, p);
        }

        match statement.kind {
            StatementKind::Execute => {
                let result = q.execute(&self.pool).await?;
                Ok(QueryOutcome::affected(result.rows_affected()))
            }
            StatementKind::Select | StatementKind::Returning => {
                let rows = q.fetch_all(&self.pool).await?;
                let rows = rows.iter().map(row_to_json).collect::<Result<Vec<_>, _>>()?;
                Ok(QueryOutcome::from_rows(rows))
            }
        }
    }
}

#[async_trait]
impl QueryExecutor for DatabaseManager {
    async fn run(&self, statement: &Statement) -> Result<QueryOutcome, DatabaseError> {
        tokio::time::timeout(self.statement_timeout, self.run_unbounded(statement))
            .await
            .map_err(|_| DatabaseError::Timeout(self.statement_timeout))?
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        let ping = sqlx::query("SELECT 1").execute(&self.pool);
        tokio::time::timeout(self.statement_timeout, ping)
            .await
            .map_err(|_| DatabaseError::Timeout(self.statement_timeout))??;
        Ok(())
    }
}
