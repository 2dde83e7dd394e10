//! Process-wide resources shared by every request

use std::sync::Arc;

use deadpool_postgres::Pool;
use healthsync_core::TokenVerifier;

use crate::ai::{CompletionProvider, GroqClient, LiteratureSearch, PatientChat, SerpApiClient};
use crate::config::Config;
use crate::db::{PatientStore, PgPatientStore};

/// Shared application state, cloned into each handler
#[derive(Clone)]
pub struct AppState {
    pub verifier: TokenVerifier,
    pub store: Arc<dyn PatientStore>,
    /// `None` when no completion provider is configured
    pub completions: Option<Arc<dyn CompletionProvider>>,
    /// `None` when no literature search key is configured
    pub literature: Option<Arc<dyn LiteratureSearch>>,
    pub chat: PatientChat,
}

impl AppState {
    pub fn new(
        verifier: TokenVerifier,
        store: Arc<dyn PatientStore>,
        completions: Option<Arc<dyn CompletionProvider>>,
        literature: Option<Arc<dyn LiteratureSearch>>,
    ) -> Self {
        let chat = PatientChat::new(verifier.clone(), store.clone(), completions.clone());
        Self {
            verifier,
            store,
            completions,
            literature,
            chat,
        }
    }

    /// Wire the production collaborators from configuration
    pub fn from_config(pool: Pool, config: &Config) -> Result<Self, reqwest::Error> {
        let completions = match &config.groq_api_key {
            Some(key) => Some(Arc::new(GroqClient::new(
                key.clone(),
                config.groq_model.clone(),
                config.ai_timeout,
            )?) as Arc<dyn CompletionProvider>),
            None => None,
        };

        let literature = match &config.serpapi_key {
            Some(key) => Some(Arc::new(SerpApiClient::new(key.clone(), config.ai_timeout)?)
                as Arc<dyn LiteratureSearch>),
            None => None,
        };

        Ok(Self::new(
            TokenVerifier::new(&config.jwt_secret),
            Arc::new(PgPatientStore::new(pool)),
            completions,
            literature,
        ))
    }
}
