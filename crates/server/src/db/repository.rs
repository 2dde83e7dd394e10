use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::Pool;
use healthsync_core::PatientRecord;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::{PatientStore, StoreError};

/// Postgres-backed patient store. Records live as JSONB documents.
#[derive(Clone)]
pub struct PgPatientStore {
    pool: Pool,
}

impl PgPatientStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn decode(id: String, data: JsonValue) -> Result<PatientRecord, StoreError> {
    let mut record: PatientRecord =
        serde_json::from_value(data).map_err(|e| StoreError::Corrupt(format!("{id}: {e}")))?;
    record.id = id;
    Ok(record)
}

#[async_trait]
impl PatientStore for PgPatientStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<PatientRecord>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT data FROM patients WHERE id = $1", &[&id])
            .await?;

        match row {
            Some(row) => decode(id.to_string(), row.get(0)).map(Some),
            None => Ok(None),
        }
    }

    async fn create(&self, mut record: PatientRecord) -> Result<PatientRecord, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = *record.created_at.get_or_insert_with(Utc::now);

        record.id = String::new();
        let data =
            serde_json::to_value(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO patients (id, data, created_at) VALUES ($1, $2, $3)",
                &[&id, &data, &created_at],
            )
            .await?;

        record.id = id;
        Ok(record)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PatientRecord>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, data FROM patients ORDER BY created_at DESC LIMIT $1",
                &[&limit],
            )
            .await?;

        rows.into_iter()
            .map(|row| decode(row.get(0), row.get(1)))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}
