//! Patient and diagnosis records as stored by the intake flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ValidationError;
use crate::identity::Identity;

/// A diagnosis attached to a patient record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,

    /// ICD-11 code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icd11: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Identity that added this diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// A patient record. The chat pipeline only ever reads these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Opaque store id, filled in by the store on read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_age"
    )]
    pub age: Option<u32>,

    /// Presenting ICD-11 code captured at intake
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icd11: Option<String>,

    /// Identity that created the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub diagnosis: Vec<Diagnosis>,
}

/// Validated intake payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub icd11: String,
}

impl NewPatient {
    /// All three fields are required; a zero age counts as missing.
    pub fn new(
        name: Option<&str>,
        age: Option<u32>,
        icd11: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let name = name.map(str::trim).filter(|s| !s.is_empty());
        let icd11 = icd11.map(str::trim).filter(|s| !s.is_empty());
        match (name, age.filter(|a| *a > 0), icd11) {
            (Some(name), Some(age), Some(icd11)) => Ok(Self {
                name: name.to_string(),
                age,
                icd11: icd11.to_string(),
            }),
            _ => Err(ValidationError::IntakeFieldsRequired),
        }
    }

    /// Build the stored record, stamped with its creator
    pub fn into_record(self, created_by: &Identity, created_at: DateTime<Utc>) -> PatientRecord {
        PatientRecord {
            id: String::new(),
            name: Some(self.name),
            age: Some(self.age),
            icd11: Some(self.icd11),
            created_by: Some(created_by.as_str().to_string()),
            created_at: Some(created_at),
            diagnosis: Vec::new(),
        }
    }
}

/// Interpret a JSON age value: non-negative integers, whole floats, or
/// numeric strings.
pub fn parse_age(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<JsonValue>::deserialize(deserializer)?
        .as_ref()
        .and_then(parse_age))
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Diagnosis>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_reads_stored_document() {
        let record: PatientRecord = serde_json::from_value(json!({
            "name": "Jane Doe",
            "age": 54,
            "createdBy": "u1",
            "diagnosis": [
                {"disease": "Type 2 diabetes", "icd11": "5A11", "notes": "diet controlled", "createdBy": "u2"}
            ]
        }))
        .unwrap();

        assert_eq!(record.age, Some(54));
        assert_eq!(record.created_by.as_deref(), Some("u1"));
        assert_eq!(record.diagnosis[0].icd11.as_deref(), Some("5A11"));
        assert_eq!(record.diagnosis[0].created_by.as_deref(), Some("u2"));
    }

    #[test]
    fn malformed_diagnosis_field_reads_as_empty() {
        let record: PatientRecord =
            serde_json::from_value(json!({"createdBy": "u1", "diagnosis": "none"})).unwrap();
        assert!(record.diagnosis.is_empty());

        let record: PatientRecord =
            serde_json::from_value(json!({"createdBy": "u1", "diagnosis": null})).unwrap();
        assert!(record.diagnosis.is_empty());
    }

    #[test]
    fn age_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_age(&json!(40)), Some(40));
        assert_eq!(parse_age(&json!(40.0)), Some(40));
        assert_eq!(parse_age(&json!("40")), Some(40));
        assert_eq!(parse_age(&json!(40.5)), None);
        assert_eq!(parse_age(&json!(-3)), None);
        assert_eq!(parse_age(&json!("forty")), None);
    }

    #[test]
    fn intake_requires_every_field() {
        assert!(NewPatient::new(Some("Jane"), Some(30), Some("5A11")).is_ok());
        assert_eq!(
            NewPatient::new(Some("Jane"), Some(0), Some("5A11")),
            Err(ValidationError::IntakeFieldsRequired)
        );
        assert_eq!(
            NewPatient::new(Some("  "), Some(30), Some("5A11")),
            Err(ValidationError::IntakeFieldsRequired)
        );
        assert_eq!(
            NewPatient::new(Some("Jane"), Some(30), None),
            Err(ValidationError::IntakeFieldsRequired)
        );
    }

    #[test]
    fn intake_record_is_stamped_with_creator() {
        let now = Utc::now();
        let record = NewPatient::new(Some("Jane"), Some(30), Some("5A11"))
            .unwrap()
            .into_record(&Identity::new("u1"), now);
        assert_eq!(record.created_by.as_deref(), Some("u1"));
        assert_eq!(record.created_at, Some(now));
        assert!(record.diagnosis.is_empty());
    }
}
