//! Grounding Resolver — first model call. Produces a draft reply and the ids
//! of the clubs the user is asking about, chosen from the compact listing.

use serde::Deserialize;
use tracing::debug;

use crate::chat::log_usage;
use crate::chat::prompts::{club_ids_schema, RESOLVER_SYSTEM_TEMPLATE};
use crate::llm_client::prompts::{fill_template, ASSISTANT_PERSONA, DOMAIN_RULES};
use crate::llm_client::{CompletionRequest, LanguageModel, LlmError};

/// Resolver output as the model returned it. Both fields are required by the
/// response schema, but the model is not trusted to honour that.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubIdsResponse {
    #[serde(rename = "replyText", default)]
    pub reply_text: Option<String>,
    #[serde(rename = "matchingIds", default)]
    pub matching_ids: Option<Vec<i64>>,
}

/// What the pipeline does next, decided once from a `ClubIdsResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverOutcome {
    /// Specific clubs were identified; ground the draft in their data.
    Grounded { draft: String, ids: Vec<i64> },
    /// General conversation; the reply is final as is.
    Ungrounded { text: String },
    /// Neither a reply nor any ids. Carries the raw payload for diagnosis.
    Malformed { raw: String },
}

impl ResolverOutcome {
    pub fn classify(response: ClubIdsResponse, raw: &str) -> Self {
        let reply = response.reply_text.filter(|t| !t.trim().is_empty());
        let ids = response.matching_ids.filter(|ids| !ids.is_empty());

        match (reply, ids) {
            (draft, Some(ids)) => ResolverOutcome::Grounded {
                draft: draft.unwrap_or_default(),
                ids,
            },
            (Some(text), None) => ResolverOutcome::Ungrounded { text },
            (None, None) => ResolverOutcome::Malformed {
                raw: raw.to_string(),
            },
        }
    }
}

/// Runs the resolver call. Output that is not JSON of the expected shape is
/// returned as `LlmError::Parse`.
pub async fn resolve_club_ids(
    llm: &dyn LanguageModel,
    club_listing: &str,
    message: &str,
) -> Result<ResolverOutcome, LlmError> {
    let system = fill_template(
        RESOLVER_SYSTEM_TEMPLATE,
        &[
            ("persona", ASSISTANT_PERSONA),
            ("domain_rules", DOMAIN_RULES),
            ("club_list", club_listing),
        ],
    );

    let completion = llm
        .complete(CompletionRequest {
            system,
            message: message.to_string(),
            response_schema: Some(club_ids_schema()),
        })
        .await?;

    log_usage("resolver", completion.usage);

    let response: ClubIdsResponse = completion.parse_json()?;
    debug!("Resolver response: {response:?}");

    Ok(ResolverOutcome::classify(response, &completion.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::ScriptedModel;

    fn response(reply: Option<&str>, ids: Option<Vec<i64>>) -> ClubIdsResponse {
        ClubIdsResponse {
            reply_text: reply.map(str::to_string),
            matching_ids: ids,
        }
    }

    #[test]
    fn test_classify_ids_present_is_grounded() {
        let outcome = ResolverOutcome::classify(
            response(Some("Here are some chess-related clubs!"), Some(vec![17, 42])),
            "",
        );
        assert_eq!(
            outcome,
            ResolverOutcome::Grounded {
                draft: "Here are some chess-related clubs!".to_string(),
                ids: vec![17, 42],
            }
        );
    }

    #[test]
    fn test_classify_empty_ids_with_reply_is_ungrounded() {
        let outcome =
            ResolverOutcome::classify(response(Some("I'm doing great!"), Some(vec![])), "");
        assert_eq!(
            outcome,
            ResolverOutcome::Ungrounded {
                text: "I'm doing great!".to_string()
            }
        );
    }

    #[test]
    fn test_classify_missing_ids_with_reply_is_ungrounded() {
        let outcome = ResolverOutcome::classify(response(Some("Hello!"), None), "");
        assert!(matches!(outcome, ResolverOutcome::Ungrounded { .. }));
    }

    #[test]
    fn test_classify_ids_without_reply_grounds_with_empty_draft() {
        let outcome = ResolverOutcome::classify(response(None, Some(vec![3])), "");
        assert_eq!(
            outcome,
            ResolverOutcome::Grounded {
                draft: String::new(),
                ids: vec![3],
            }
        );
    }

    #[test]
    fn test_classify_nothing_usable_is_malformed() {
        let raw = r#"{"unexpected": true}"#;
        let outcome = ResolverOutcome::classify(response(Some("   "), Some(vec![])), raw);
        assert_eq!(
            outcome,
            ResolverOutcome::Malformed {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn test_response_tolerates_null_and_missing_fields() {
        let parsed: ClubIdsResponse =
            serde_json::from_str(r#"{"replyText": null}"#).unwrap();
        assert!(parsed.reply_text.is_none());
        assert!(parsed.matching_ids.is_none());
    }

    #[tokio::test]
    async fn test_resolve_sends_listing_and_schema() {
        let model = ScriptedModel::new().reply(r#"{"replyText": "Hi!", "matchingIds": []}"#);

        let outcome = resolve_club_ids(&model, "name,id\nChess Club,17\n", "hello")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ResolverOutcome::Ungrounded {
                text: "Hi!".to_string()
            }
        );
        let request = model.request(0);
        assert_eq!(request.message, "hello");
        assert!(request.system.contains("Chess Club,17"));
        assert!(request.system.starts_with(ASSISTANT_PERSONA));
        let schema = request.response_schema.unwrap();
        assert_eq!(schema["required"][1], "matchingIds");
    }

    #[tokio::test]
    async fn test_resolve_without_usage_metadata_succeeds() {
        let model = ScriptedModel::new()
            .reply_without_usage(r#"{"replyText": "Sure", "matchingIds": [5]}"#);
        let outcome = resolve_club_ids(&model, "", "chess?").await.unwrap();
        assert!(matches!(outcome, ResolverOutcome::Grounded { .. }));
    }

    #[tokio::test]
    async fn test_resolve_non_json_output_is_parse_error() {
        let model = ScriptedModel::new().reply("Sorry, I can only talk about clubs.");
        let result = resolve_club_ids(&model, "", "weather?").await;
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn test_resolve_wrong_id_type_is_parse_error() {
        let model =
            ScriptedModel::new().reply(r#"{"replyText": "x", "matchingIds": ["seventeen"]}"#);
        let result = resolve_club_ids(&model, "", "chess?").await;
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }
}
