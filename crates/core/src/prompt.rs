//! Patient context assembly and the safety-constrained system prompt
//!
//! The context handed to the completion provider is deliberately minimal:
//! the patient's age and a one-line summary per diagnosis. Names, ids and the
//! raw record never leave this module.

use crate::patient::{Diagnosis, PatientRecord};

/// Bumped whenever the wording of [`SAFETY_PROMPT_TEMPLATE`] changes
pub const PROMPT_VERSION: &str = "2024-06-patient-chat-v1";

/// Used when the patient's age is unknown
pub const AGE_NOT_SPECIFIED: &str = "age not specified";

/// Used when the record has no diagnoses
pub const NO_DIAGNOSES: &str = "No diagnoses recorded";

/// Attached verbatim to every successful answer
pub const DISCLAIMER: &str = "⚠️ MEDICAL DISCLAIMER: This information is for educational purposes only and does not constitute medical advice, diagnosis, or treatment. Always consult with qualified healthcare professionals for medical decisions.";

/// Returned when the provider produced no text
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I was unable to generate a response. Please try again.";

/// System prompt. `{age}` and `{diagnoses}` are filled by [`render_system_prompt`].
pub const SAFETY_PROMPT_TEMPLATE: &str = "You are HealthSync AI, a medical education assistant for healthcare professionals.

CRITICAL SAFETY CONSTRAINTS - YOU MUST NEVER:
- Diagnose any medical condition
- Prescribe medication, dosages, or treatment plans
- Provide emergency medical advice
- Suggest specific medical procedures
- Replace professional medical judgment

YOUR ROLE IS ONLY TO:
- Explain medical concepts in simple terms
- Summarize patient history information
- Provide general health education
- Answer questions about existing diagnoses
- Guide users to appropriate resources

PATIENT CONTEXT:
Age: {age}
Existing Diagnoses: {diagnoses}

RESPONSE GUIDELINES:
1. If asked to diagnose: Refuse politely and advise consulting a doctor
2. If asked about prescriptions: Refuse and say only licensed providers can prescribe
3. If emergency situation described: Immediately advise calling emergency services
4. If uncertain: Say \"I don't know\" and advise consulting a healthcare professional
5. Keep responses clear, concise, and under 300 words
6. Always be empathetic and professional
7. Focus on education and explanation, not diagnosis or treatment

Remember: You are an educational tool, not a replacement for medical professionals.";

/// The fixed situations the assistant must handle deterministically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePolicy {
    DiagnosisRequested,
    PrescriptionRequested,
    EmergencyDescribed,
    Uncertain,
    General,
}

impl ResponsePolicy {
    pub fn all() -> &'static [ResponsePolicy] {
        &[
            Self::DiagnosisRequested,
            Self::PrescriptionRequested,
            Self::EmergencyDescribed,
            Self::Uncertain,
            Self::General,
        ]
    }

    /// Guideline line of the template covering this situation
    pub fn clause(&self) -> &'static str {
        match self {
            Self::DiagnosisRequested => {
                "If asked to diagnose: Refuse politely and advise consulting a doctor"
            }
            Self::PrescriptionRequested => {
                "If asked about prescriptions: Refuse and say only licensed providers can prescribe"
            }
            Self::EmergencyDescribed => {
                "If emergency situation described: Immediately advise calling emergency services"
            }
            Self::Uncertain => {
                "If uncertain: Say \"I don't know\" and advise consulting a healthcare professional"
            }
            Self::General => "Keep responses clear, concise, and under 300 words",
        }
    }
}

/// Minimal clinical summary sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientContext {
    pub age: String,
    pub diagnoses: String,
}

impl PatientContext {
    pub fn from_record(record: &PatientRecord) -> Self {
        let age = match record.age {
            Some(age) if age > 0 => format!("{age} years old"),
            _ => AGE_NOT_SPECIFIED.to_string(),
        };

        let diagnoses = if record.diagnosis.is_empty() {
            NO_DIAGNOSES.to_string()
        } else {
            record
                .diagnosis
                .iter()
                .map(summarize_diagnosis)
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self { age, diagnoses }
    }
}

/// `"{disease} (ICD-11: {code}) - {notes}"`, leaving out missing parts
pub fn summarize_diagnosis(diagnosis: &Diagnosis) -> String {
    fn present(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|s| !s.is_empty())
    }

    let mut parts = Vec::with_capacity(3);
    if let Some(disease) = present(&diagnosis.disease) {
        parts.push(disease.to_string());
    }
    if let Some(code) = present(&diagnosis.icd11) {
        parts.push(format!("(ICD-11: {code})"));
    }
    if let Some(notes) = present(&diagnosis.notes) {
        parts.push(format!("- {notes}"));
    }
    parts.join(" ")
}

/// Embed the patient context into the safety template
pub fn render_system_prompt(context: &PatientContext) -> String {
    SAFETY_PROMPT_TEMPLATE
        .replacen("{age}", &context.age, 1)
        .replacen("{diagnoses}", &context.diagnoses, 1)
}

/// Shape the provider's text into the final answer: fallback when absent
/// or blank, trimmed otherwise.
pub fn shape_answer(completion: Option<String>) -> String {
    completion
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
}
