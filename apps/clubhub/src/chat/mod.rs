// Club chat assistant: a two-stage resolve-then-ground pipeline.
// All model calls go through llm_client; handlers only talk to the pipeline.

pub mod handlers;
pub mod injector;
pub mod pipeline;
pub mod prompts;
pub mod resolver;

use tracing::info;

use crate::llm_client::TokenUsage;

/// Logs token counters for one pipeline stage. Missing counters print as "n/a".
pub(crate) fn log_usage(stage: &str, usage: Option<TokenUsage>) {
    let usage = usage.unwrap_or_default();
    info!(
        stage,
        prompt_tokens = %display_count(usage.prompt_tokens),
        response_tokens = %display_count(usage.response_tokens),
        total_tokens = %display_count(usage.total_tokens),
        "LLM token usage"
    );
}

fn display_count(count: Option<u32>) -> String {
    count.map_or_else(|| "n/a".to_string(), |c| c.to_string())
}
