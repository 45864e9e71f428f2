//! Context Injector — second model call. Refines the resolver's draft using
//! the full records of the matched clubs.

use std::collections::BTreeMap;

use crate::chat::log_usage;
use crate::chat::prompts::INJECTOR_SYSTEM_TEMPLATE;
use crate::llm_client::prompts::{fill_template, ASSISTANT_PERSONA, DOMAIN_RULES};
use crate::llm_client::{CompletionRequest, LanguageModel, LlmError};
use crate::models::club::ClubRecord;

/// Builds the injector system instruction. The club data is embedded as JSON
/// keyed by id so the model can tell clubs apart without repeating the ids.
pub fn build_injector_system(
    draft_reply: &str,
    matched: &BTreeMap<i64, &ClubRecord>,
) -> Result<String, LlmError> {
    let club_data = serde_json::to_string(matched)?;
    Ok(fill_template(
        INJECTOR_SYSTEM_TEMPLATE,
        &[
            ("persona", ASSISTANT_PERSONA),
            ("domain_rules", DOMAIN_RULES),
            ("draft_reply", draft_reply),
            ("club_data", &club_data),
        ],
    ))
}

/// Runs the free-text grounding call and returns the final reply.
pub async fn inject_context(
    llm: &dyn LanguageModel,
    message: &str,
    draft_reply: &str,
    matched: &BTreeMap<i64, &ClubRecord>,
) -> Result<String, LlmError> {
    let system = build_injector_system(draft_reply, matched)?;

    let completion = llm
        .complete(CompletionRequest {
            system,
            message: message.to_string(),
            response_schema: None,
        })
        .await?;

    log_usage("injector", completion.usage);

    Ok(completion.text)
}
