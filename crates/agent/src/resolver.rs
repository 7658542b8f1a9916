use std::sync::Arc;

use crmpilot_core::capability::CapabilityDescription;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm::{LlmClient, LlmError};
use crate::prompt::build_system_prompt;

/// The model's structured guess at which capability and arguments match a
/// free-text request. Transient: produced per request, discarded after the
/// dispatcher validates it.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct IntentSuggestion {
    pub capability: String,
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("model reply is not a usable suggestion: {detail}")]
    MalformedSuggestion { detail: String },
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Asks the language-model collaborator to map user text onto the
/// capability catalog. Stateless across calls; performs no retries and no
/// business logic - parsing is strict and anything malformed is an error,
/// never a silent coercion.
pub struct IntentResolver {
    llm: Arc<dyn LlmClient>,
}

impl IntentResolver {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn resolve(
        &self,
        user_text: &str,
        descriptions: &[CapabilityDescription],
    ) -> Result<IntentSuggestion, ResolveError> {
        let system_prompt = build_system_prompt(descriptions);
        let reply = self.llm.complete(&system_prompt, user_text).await?;
        parse_suggestion(&reply)
    }
}

/// Strict parse of the model reply. Surrounding whitespace and a markdown
/// code fence are tolerated (models add them despite instructions); any
/// other deviation from `{"capability": ..., "arguments": {...}}` fails.
pub fn parse_suggestion(reply: &str) -> Result<IntentSuggestion, ResolveError> {
    let body = strip_code_fence(reply.trim());

    let value: Value = serde_json::from_str(body).map_err(|error| {
        ResolveError::MalformedSuggestion { detail: format!("reply is not JSON: {error}") }
    })?;

    let suggestion: IntentSuggestion =
        serde_json::from_value(value).map_err(|error| ResolveError::MalformedSuggestion {
            detail: format!("reply does not match the expected shape: {error}"),
        })?;

    if suggestion.capability.trim().is_empty() {
        return Err(ResolveError::MalformedSuggestion {
            detail: "capability name is empty".to_string(),
        });
    }

    Ok(suggestion)
}

fn strip_code_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n']).trim_end().trim_end_matches("```").trim()
}
