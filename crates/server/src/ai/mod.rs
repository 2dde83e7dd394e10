//! External AI and literature providers, and the patient chat pipeline built on them

pub mod client;
pub mod disease_info;
pub mod patient_chat;
pub mod scholar;

pub use client::{CompletionProvider, CompletionRequest, GroqClient, ProviderError};
pub use patient_chat::{ChatReply, PatientChat};
pub use scholar::{LiteratureSearch, Paper, SerpApiClient};
