//! Chat pipeline — orchestrates one chat turn.
//!
//! Flow: resolve_club_ids → (ungrounded: return draft) | (grounded: project
//!       corpus → inject_context → return refined text with referenced ids).
//!
//! The two model calls are strictly sequential: the injector prompt embeds the
//! resolver's answer. Each stage is attempted once.

use serde::Serialize;
use tracing::{info, warn};

use crate::chat::injector::inject_context;
use crate::chat::resolver::{resolve_club_ids, ResolverOutcome};
use crate::config::GroundingFailurePolicy;
use crate::corpus::ClubCorpus;
use crate::errors::AppError;
use crate::llm_client::LanguageModel;

/// Final answer for one chat turn.
///
/// `referenced_ids` is the resolver's id list as claimed, including ids the
/// corpus could not resolve. It is omitted when grounding was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_ids: Option<Vec<i64>>,
}

/// Runs both stages for a validated, non-empty message.
pub async fn run_chat(
    llm: &dyn LanguageModel,
    corpus: &ClubCorpus,
    message: &str,
    on_grounding_failure: GroundingFailurePolicy,
) -> Result<ChatResult, AppError> {
    let outcome = resolve_club_ids(llm, corpus.listing(), message)
        .await
        .map_err(|e| AppError::Llm(format!("club id resolution failed: {e}")))?;

    let (draft, ids) = match outcome {
        ResolverOutcome::Malformed { raw } => return Err(AppError::UpstreamMalformed(raw)),
        ResolverOutcome::Ungrounded { text } => {
            info!("No specific clubs matched; skipping grounding");
            return Ok(ChatResult {
                text,
                referenced_ids: None,
            });
        }
        ResolverOutcome::Grounded { draft, ids } => (draft, ids),
    };

    let matched = corpus.project(&ids);
    if matched.len() < ids.len() {
        warn!(
            "Resolver returned {} ids, {} found in corpus",
            ids.len(),
            matched.len()
        );
    }

    match inject_context(llm, message, &draft, &matched).await {
        Ok(text) => Ok(ChatResult {
            text,
            referenced_ids: Some(ids),
        }),
        Err(e) if on_grounding_failure == GroundingFailurePolicy::Draft && !draft.is_empty() => {
            warn!("Grounding failed, answering with resolver draft: {e}");
            Ok(ChatResult {
                text: draft,
                referenced_ids: Some(ids),
            })
        }
        Err(e) => Err(AppError::Llm(format!("grounding failed: {e}"))),
    }
}
