//! Chat request validation

use crate::error::ValidationError;

/// Maximum question length, in characters, after trimming
pub const MAX_QUESTION_CHARS: usize = 1000;

/// A validated, ephemeral chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub patient_id: String,
    pub question: String,
}

impl ChatRequest {
    /// Validate raw inputs. The patient id is checked before the question.
    pub fn new(patient_id: Option<&str>, question: Option<&str>) -> Result<Self, ValidationError> {
        let patient_id = patient_id
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::PatientIdRequired)?;

        let question = question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(ValidationError::QuestionRequired)?;

        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(ValidationError::QuestionTooLong);
        }

        Ok(Self {
            patient_id: patient_id.to_string(),
            question: question.to_string(),
        })
    }
}
