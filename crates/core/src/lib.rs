//! healthsync-core: domain logic behind the HealthSync patient assistant
//!
//! Token verification, the patient record model, the access policy, request
//! validation and the safety-constrained prompt. Nothing here touches HTTP,
//! the database, or the completion provider.

pub mod access;
pub mod error;
pub mod identity;
pub mod patient;
pub mod prompt;
pub mod request;

pub use access::{AuthorizationPolicy, CreatorLineagePolicy};
pub use error::{AuthError, ChatError, Unavailable, ValidationError};
pub use identity::{Claims, Identity, TokenVerifier, bearer_token, encode_hs256};
pub use patient::{Diagnosis, NewPatient, PatientRecord};
pub use prompt::{DISCLAIMER, FALLBACK_ANSWER, PatientContext};
pub use request::ChatRequest;
