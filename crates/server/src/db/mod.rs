mod repository;

pub use repository::PgPatientStore;

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use healthsync_core::PatientRecord;
use thiserror::Error;
use tokio_postgres::NoTls;

/// Patient store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached at all
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Query(String),

    #[error("Malformed patient document: {0}")]
    Corrupt(String),
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Lookup-by-id access to patient records, shared across requests
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<PatientRecord>, StoreError>;

    /// Persist a new record and return it with its assigned id
    async fn create(&self, record: PatientRecord) -> Result<PatientRecord, StoreError>;

    /// Most recently created records first
    async fn list_recent(&self, limit: i64) -> Result<Vec<PatientRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Create the patients table if it does not exist yet
pub async fn ensure_schema(pool: &Pool) -> Result<(), StoreError> {
    let client = pool.get().await?;
    client
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE INDEX IF NOT EXISTS patients_created_at_idx ON patients (created_at DESC);",
        )
        .await?;
    Ok(())
}
