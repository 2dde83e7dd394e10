//! Structured disease information generated by the completion provider

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::client::{ChatMessage, CompletionProvider, CompletionRequest, ProviderError, Sampling};

#[derive(Debug, Error)]
pub enum DiseaseInfoError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Could not parse disease information: {0}")]
    Parse(String),
}

/// Build the prompt for a disease name and/or ICD-11 code
pub fn build_prompt(disease_name: Option<&str>, icd_code: Option<&str>) -> String {
    format!(
        r#"You are a medical information system. Provide comprehensive, accurate medical information about the following disease in a structured format.

Disease: {disease}
ICD-11 Code: {code}

Please provide the following information in JSON format:
{{
  "title": "Full medical name of the disease",
  "definition": "A concise 2-3 sentence definition of the disease",
  "longDefinition": "A detailed explanation of the disease (4-6 sentences)",
  "synonyms": ["alternative name 1", "alternative name 2", ...],
  "symptoms": ["symptom 1", "symptom 2", "symptom 3", ...],
  "causes": ["cause 1", "cause 2", ...],
  "riskFactors": ["risk factor 1", "risk factor 2", ...],
  "diagnosis": ["diagnostic method 1", "diagnostic method 2", ...],
  "treatment": ["treatment option 1", "treatment option 2", ...],
  "prevention": ["prevention method 1", "prevention method 2", ...],
  "prognosis": "Expected outcome and long-term outlook",
  "complications": ["complication 1", "complication 2", ...],
  "prevalence": "Information about how common the disease is",
  "clinicalNotes": ["important clinical note 1", "important clinical note 2", ...]
}}

Provide accurate, evidence-based medical information. Be comprehensive but concise. Return ONLY the JSON object, no additional text."#,
        disease = disease_name.unwrap_or("Unknown"),
        code = icd_code.unwrap_or("Not provided"),
    )
}

/// Ask the provider for disease information and parse the JSON object it returns
pub async fn generate(
    provider: &dyn CompletionProvider,
    disease_name: Option<&str>,
    icd_code: Option<&str>,
) -> Result<JsonValue, DiseaseInfoError> {
    let request = CompletionRequest {
        messages: vec![ChatMessage::user(build_prompt(disease_name, icd_code))],
        sampling: Sampling::DISEASE_INFO,
    };

    let text = provider.complete(request).await?.unwrap_or_default();
    let json_str = extract_json(&text)?;

    match serde_json::from_str::<JsonValue>(json_str) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(_) => Err(DiseaseInfoError::Parse("expected a JSON object".to_string())),
        Err(e) => Err(DiseaseInfoError::Parse(e.to_string())),
    }
}

/// Extract a JSON object from text that might contain markdown code blocks
fn extract_json(text: &str) -> Result<&str, DiseaseInfoError> {
    let trimmed = text.trim();

    // Direct JSON object
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    // Wrapped in ```json ... ``` or ``` ... ```
    for fence in ["```json", "```"] {
        if let Some(start) = trimmed.find(fence) {
            let after = &trimmed[start + fence.len()..];
            if let Some(end) = after.find("```") {
                return Ok(after[..end].trim());
            }
        }
    }

    Err(DiseaseInfoError::Parse(
        "no JSON object in response".to_string(),
    ))
}
