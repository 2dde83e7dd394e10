//! Access decisions for patient records

use crate::identity::Identity;
use crate::patient::PatientRecord;

/// Decides whether an identity may use a patient record
pub trait AuthorizationPolicy: Send + Sync {
    fn can_access(&self, identity: &Identity, record: &PatientRecord) -> bool;
}

/// Direct creator lineage: the record's creator, or the author of any
/// diagnosis on it. No roles, no organisation grants, no overrides.
///
/// A diagnosis author gets the whole record, including diagnoses added by
/// others (care-team reading of the rule).
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatorLineagePolicy;

impl AuthorizationPolicy for CreatorLineagePolicy {
    fn can_access(&self, identity: &Identity, record: &PatientRecord) -> bool {
        is_creator(identity, record) || has_authored_diagnosis(identity, record)
    }
}

pub fn is_creator(identity: &Identity, record: &PatientRecord) -> bool {
    record.created_by.as_deref() == Some(identity.as_str())
}

pub fn has_authored_diagnosis(identity: &Identity, record: &PatientRecord) -> bool {
    record
        .diagnosis
        .iter()
        .any(|d| d.created_by.as_deref() == Some(identity.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::Diagnosis;

    fn record(created_by: Option<&str>, diagnosed_by: &[Option<&str>]) -> PatientRecord {
        PatientRecord {
            created_by: created_by.map(str::to_string),
            diagnosis: diagnosed_by
                .iter()
                .map(|by| Diagnosis {
                    disease: Some("Asthma".to_string()),
                    created_by: by.map(str::to_string),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn creator_is_allowed() {
        let policy = CreatorLineagePolicy;
        assert!(policy.can_access(&Identity::new("u1"), &record(Some("u1"), &[])));
    }

    #[test]
    fn diagnosis_author_is_allowed() {
        let policy = CreatorLineagePolicy;
        let record = record(Some("u1"), &[Some("u3"), Some("u2")]);
        assert!(policy.can_access(&Identity::new("u2"), &record));
        assert!(!is_creator(&Identity::new("u2"), &record));
    }

    #[test]
    fn unrelated_identity_is_denied() {
        let policy = CreatorLineagePolicy;
        let record = record(Some("u1"), &[Some("u2")]);
        assert!(!policy.can_access(&Identity::new("u9"), &record));
    }

    #[test]
    fn absent_creator_never_matches() {
        let policy = CreatorLineagePolicy;
        let record = record(None, &[None]);
        assert!(!policy.can_access(&Identity::new(""), &record));
        assert!(!policy.can_access(&Identity::new("u1"), &record));
    }

    #[test]
    fn comparison_is_exact() {
        let policy = CreatorLineagePolicy;
        let record = record(Some("Doc@Clinic.org"), &[]);
        assert!(!policy.can_access(&Identity::new("doc@clinic.org"), &record));
    }
}
