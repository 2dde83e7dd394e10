//! Patient intake handlers

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use healthsync_core::{Identity, NewPatient, PatientRecord, Unavailable, patient::parse_age};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::db::StoreError;
use crate::error::AppError;
use crate::state::AppState;

/// Number of records returned by the listing
const LIST_LIMIT: i64 = 50;

/// Request body for patient intake
#[derive(Deserialize)]
pub struct CreatePatientRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    age: Option<JsonValue>,
    #[serde(default)]
    icd11: Option<String>,
}

/// Listing entry; diagnoses are not included
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    id: String,
    name: Option<String>,
    age: Option<u32>,
    icd11: Option<String>,
    created_at: Option<DateTime<Utc>>,
    created_by: Option<String>,
}

impl From<PatientRecord> for PatientSummary {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            age: record.age,
            icd11: record.icd11,
            created_at: record.created_at,
            created_by: record.created_by,
        }
    }
}

#[derive(Serialize)]
pub struct PatientListResponse {
    patients: Vec<PatientSummary>,
}

/// POST /api/patients - Register a patient created by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let new_patient = NewPatient::new(
        body.name.as_deref(),
        body.age.as_ref().and_then(parse_age),
        body.icd11.as_deref(),
    )?;

    let record = match state
        .store
        .create(new_patient.into_record(&identity, Utc::now()))
        .await
    {
        Ok(record) => record,
        Err(StoreError::Unavailable(e)) => {
            tracing::error!(error = %e, "Patient store unreachable");
            return Err(AppError::ServiceUnavailable(
                Unavailable::Database.to_string(),
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "Patient insert failed");
            return Err(AppError::Internal("failed to create patient".to_string()));
        }
    };

    tracing::info!(patient_id = %record.id, "Patient created");

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/patients - Most recently registered patients
///
/// An unreachable store still answers with an (empty) listing, with 503.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    match state.store.list_recent(LIST_LIMIT).await {
        Ok(records) => Ok((
            StatusCode::OK,
            Json(PatientListResponse {
                patients: records.into_iter().map(PatientSummary::from).collect(),
            }),
        )),
        Err(StoreError::Unavailable(e)) => {
            tracing::error!(error = %e, "Patient store unreachable");
            Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(PatientListResponse {
                    patients: Vec::new(),
                }),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "Patient listing failed");
            Err(AppError::Internal("failed to fetch patients".to_string()))
        }
    }
}
