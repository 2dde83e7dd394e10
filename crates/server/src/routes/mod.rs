pub mod ai;
pub mod health;
pub mod metrics;
pub mod patients;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Routes that need a verified identity (auth middleware applied by the caller)
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/patients", get(patients::list).post(patients::create))
        .route("/ai/disease-info", post(ai::disease_info))
        .route("/ai/research-papers", post(ai::research_papers))
}

/// Patient chat verifies its own token as the first step of the pipeline
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/ai/patient-chat", post(ai::patient_chat))
}
