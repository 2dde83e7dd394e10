//! Patient chat orchestration
//!
//! One request runs strictly in order: verify the token, validate input,
//! check the provider is configured, load the record, authorize, build the
//! minimal context, call the provider once, shape the answer. Every failure
//! is terminal and nothing is retried.

use std::sync::Arc;

use healthsync_core::prompt::{self, PatientContext};
use healthsync_core::{
    AuthorizationPolicy, ChatError, ChatRequest, CreatorLineagePolicy, DISCLAIMER, Identity,
    TokenVerifier, Unavailable,
};
use serde::Serialize;

use super::client::{ChatMessage, CompletionProvider, CompletionRequest, Sampling};
use crate::db::{PatientStore, StoreError};

/// Successful chat outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub disclaimer: &'static str,
}

/// Runs authenticated, authorized chat requests against a patient record
#[derive(Clone)]
pub struct PatientChat {
    verifier: TokenVerifier,
    store: Arc<dyn PatientStore>,
    provider: Option<Arc<dyn CompletionProvider>>,
    policy: Arc<dyn AuthorizationPolicy>,
}

impl PatientChat {
    /// Create an orchestrator using the creator-lineage access policy.
    /// A `None` provider means the AI service is not configured.
    pub fn new(
        verifier: TokenVerifier,
        store: Arc<dyn PatientStore>,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            verifier,
            store,
            provider,
            policy: Arc::new(CreatorLineagePolicy),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, ChatError> {
        Ok(self.verifier.verify(token)?)
    }

    /// Run the full pipeline starting from the raw bearer token
    pub async fn handle(
        &self,
        token: Option<&str>,
        patient_id: Option<&str>,
        question: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        let identity = self.authenticate(token)?;
        self.handle_as(&identity, patient_id, question).await
    }

    /// Run the pipeline for a caller whose token was already verified
    pub async fn handle_as(
        &self,
        identity: &Identity,
        patient_id: Option<&str>,
        question: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        let request = ChatRequest::new(patient_id, question)?;

        let provider = self.provider.as_ref().ok_or(Unavailable::NotConfigured)?;

        let record = match self.store.find_by_id(&request.patient_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(ChatError::NotFound),
            Err(StoreError::Unavailable(e)) => {
                tracing::error!(error = %e, "Patient store unreachable");
                return Err(Unavailable::Database.into());
            }
            Err(e) => {
                tracing::error!(error = %e, "Patient lookup failed");
                return Err(ChatError::InternalError);
            }
        };

        if !self.policy.can_access(identity, &record) {
            tracing::warn!(
                patient_id = %request.patient_id,
                identity = %identity,
                "Patient chat access denied"
            );
            return Err(ChatError::Forbidden);
        }

        let context = PatientContext::from_record(&record);
        let completion = CompletionRequest {
            messages: vec![
                ChatMessage::system(prompt::render_system_prompt(&context)),
                ChatMessage::user(request.question),
            ],
            sampling: Sampling::PATIENT_CHAT,
        };

        tracing::debug!(
            patient_id = %request.patient_id,
            prompt_version = prompt::PROMPT_VERSION,
            "Calling completion provider"
        );
        let text = provider.complete(completion).await.map_err(|e| {
            tracing::error!(
                error = %e,
                patient_id = %request.patient_id,
                prompt_version = prompt::PROMPT_VERSION,
                "Completion provider call failed"
            );
            ChatError::UpstreamError
        })?;

        Ok(ChatReply {
            answer: prompt::shape_answer(text),
            disclaimer: DISCLAIMER,
        })
    }
}
