use thiserror::Error;

/// Token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    Missing,

    #[error("Invalid authentication token")]
    Invalid,
}

/// Request body validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Patient ID is required")]
    PatientIdRequired,

    #[error("Question is required")]
    QuestionRequired,

    #[error("Question is too long (max 1000 characters)")]
    QuestionTooLong,

    #[error("Disease name or ICD code is required")]
    DiseaseRequired,

    #[error("Search query is required")]
    QueryRequired,

    #[error("name, age and icd11 required")]
    IntakeFieldsRequired,
}

/// Which dependency is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("AI service not configured")]
    NotConfigured,

    #[error("Database unavailable")]
    Database,
}

/// Outcome taxonomy of the patient chat pipeline.
///
/// `Display` yields the message shown to the caller, so no variant carries
/// provider or database detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),

    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("Access denied to this patient")]
    Forbidden,

    #[error("Patient not found")]
    NotFound,

    #[error(transparent)]
    ServiceUnavailable(#[from] Unavailable),

    #[error("AI service temporarily unavailable")]
    UpstreamError,

    #[error("Failed to process chat request")]
    InternalError,
}

impl ChatError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Unauthenticated(_) => "unauthenticated",
            ChatError::InvalidInput(_) => "invalid_input",
            ChatError::Forbidden => "forbidden",
            ChatError::NotFound => "not_found",
            ChatError::ServiceUnavailable(_) => "service_unavailable",
            ChatError::UpstreamError => "upstream_error",
            ChatError::InternalError => "internal_error",
        }
    }
}
