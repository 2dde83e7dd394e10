//! AI-assisted endpoints (patient chat, disease information, literature search)

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use healthsync_core::{Identity, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::ai::disease_info::{self, DiseaseInfoError};
use crate::ai::{ChatReply, Paper};
use crate::error::AppError;
use crate::middleware::request_token;
use crate::state::AppState;

/// Request body for patient chat. Fields stay loosely typed so that a wrong
/// type reports as "required" rather than as a malformed body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientChatRequest {
    #[serde(default)]
    patient_id: Option<JsonValue>,
    #[serde(default)]
    question: Option<JsonValue>,
}

/// Success envelope for patient chat
#[derive(Serialize)]
pub struct PatientChatResponse {
    success: bool,
    #[serde(flatten)]
    reply: ChatReply,
}

/// Request body for disease information
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseInfoRequest {
    #[serde(default)]
    icd_code: Option<String>,
    #[serde(default)]
    disease_name: Option<String>,
}

/// Request body for literature search
#[derive(Deserialize)]
pub struct ResearchPapersRequest {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Serialize)]
pub struct ResearchPapersResponse {
    success: bool,
    papers: Vec<Paper>,
}

/// POST /api/ai/patient-chat - Ask the assistant about one patient
///
/// Authentication is checked before the body is looked at, so a caller
/// without a valid token always gets 401. The verified identity rides on the
/// response for the audit layer.
pub async fn patient_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PatientChatRequest>, JsonRejection>,
) -> Response {
    let identity = match state.chat.authenticate(request_token(&headers)) {
        Ok(identity) => identity,
        Err(err) => {
            record_chat_outcome(err.kind());
            return AppError::from(err).into_response();
        }
    };

    let mut response = match body {
        Ok(Json(body)) => answer(&state, &identity, body).await,
        Err(rejection) => {
            record_chat_outcome("invalid_input");
            AppError::from(rejection).into_response()
        }
    };

    response.extensions_mut().insert(identity);
    response
}

async fn answer(state: &AppState, identity: &Identity, body: PatientChatRequest) -> Response {
    let patient_id = body.patient_id.as_ref().and_then(JsonValue::as_str);
    let question = body.question.as_ref().and_then(JsonValue::as_str);

    let outcome = state.chat.handle_as(identity, patient_id, question).await;

    let label = match &outcome {
        Ok(_) => "success",
        Err(err) => err.kind(),
    };
    record_chat_outcome(label);
    tracing::info!(patient_id = patient_id.unwrap_or(""), outcome = label, "Patient chat");

    match outcome {
        Ok(reply) => Json(PatientChatResponse {
            success: true,
            reply,
        })
        .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

fn record_chat_outcome(outcome: &'static str) {
    metrics::counter!("patient_chat_requests_total", "outcome" => outcome).increment(1);
}

/// POST /api/ai/disease-info - Structured information about a disease
pub async fn disease_info(
    State(state): State<AppState>,
    body: Result<Json<DiseaseInfoRequest>, JsonRejection>,
) -> Result<Json<JsonValue>, AppError> {
    let Json(body) = body?;
    let disease_name = body.disease_name.as_deref().filter(|s| !s.trim().is_empty());
    let icd_code = body.icd_code.as_deref().filter(|s| !s.trim().is_empty());

    if disease_name.is_none() && icd_code.is_none() {
        return Err(ValidationError::DiseaseRequired.into());
    }

    let provider = state
        .completions
        .as_deref()
        .ok_or_else(|| AppError::Internal("AI service not configured".to_string()))?;

    tracing::info!(icd_code = icd_code.unwrap_or(""), "Disease information request");

    match disease_info::generate(provider, disease_name, icd_code).await {
        Ok(data) => Ok(Json(json!({ "success": true, "data": data }))),
        Err(DiseaseInfoError::Provider(e)) => {
            tracing::error!(error = %e, "Disease information generation failed");
            Err(AppError::ServiceUnavailable(
                "Failed to generate disease information".to_string(),
            ))
        }
        Err(DiseaseInfoError::Parse(e)) => {
            tracing::error!(error = %e, "Disease information response was not valid JSON");
            Err(AppError::Internal("Failed to parse AI response".to_string()))
        }
    }
}

/// POST /api/ai/research-papers - Google Scholar search
pub async fn research_papers(
    State(state): State<AppState>,
    body: Result<Json<ResearchPapersRequest>, JsonRejection>,
) -> Result<Json<ResearchPapersResponse>, AppError> {
    let Json(body) = body?;
    let query = body
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ValidationError::QueryRequired)?;

    let search = state
        .literature
        .as_deref()
        .ok_or_else(|| AppError::Internal("Literature search not configured".to_string()))?;

    let papers = search.search(query).await.map_err(|e| {
        tracing::error!(error = %e, "Literature search failed");
        AppError::ServiceUnavailable("Failed to fetch research papers".to_string())
    })?;

    tracing::info!(results = papers.len(), "Literature search");

    Ok(Json(ResearchPapersResponse {
        success: true,
        papers,
    }))
}
