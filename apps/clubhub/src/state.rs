use std::sync::Arc;

use crate::config::GroundingFailurePolicy;
use crate::corpus::ClubCorpus;
use crate::llm_client::LanguageModel;
use crate::reviews::ReviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing in it is mutated afterwards except through
/// the review store.
#[derive(Clone)]
pub struct AppState {
    /// Club data and listing, read-only for the process lifetime.
    pub corpus: Arc<ClubCorpus>,
    /// Pluggable model backend. Default: Gemini `LlmClient`.
    pub llm: Arc<dyn LanguageModel>,
    /// Postgres when DATABASE_URL is set, in-memory otherwise.
    pub reviews: Arc<dyn ReviewStore>,
    pub grounding_failure_policy: GroundingFailurePolicy,
}
