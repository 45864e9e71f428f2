// Chat pipeline prompt templates.
// Placeholders in braces are substituted by the resolver and injector.

use serde_json::{json, Value};

pub const RESOLVER_SYSTEM_TEMPLATE: &str = r#"{persona}
Use the following club data to answer user questions.

CLUB LIST (name, id):
{club_list}

TASK:
1. Write a conversational reply to the student in 'replyText'. Never mention club ids in it.
2. Return the id of every club the user seems interested in as 'matchingIds'.
3. Only ever discuss clubs that appear in the list above.
4. If the query is general or does not concern specific clubs from the list, 'matchingIds' must be an empty list [].

RULES:
{domain_rules}"#;

pub const INJECTOR_SYSTEM_TEMPLATE: &str = r#"{persona}
Use the following club data to answer user questions.

GUIDELINES:
{domain_rules}
- If a club is not in the data, politely say you don't have information on it.
- Never mention club ids in your response.
- When describing a specific club, format its information in markdown.

Your original response without additional data (refine it):
{draft_reply}

NEW ADDITIONAL DATA (cannot be seen by the user):
{club_data}"#;

/// Structured-output schema the resolver call must satisfy.
pub fn club_ids_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "replyText": {
                "type": "STRING",
                "description": "The conversational response to the student. Do not reference club ids."
            },
            "matchingIds": {
                "type": "ARRAY",
                "items": { "type": "INTEGER" },
                "description": "Ids of the clubs the user is interested in. Empty if none."
            }
        },
        "required": ["replyText", "matchingIds"]
    })
}
