use crmpilot_core::capability::CapabilityDescription;

/// Builds the system prompt: assistant framing, the serialized capability
/// catalog, and strict output instructions. The model is told to answer
/// with a single JSON object and nothing else; anything that deviates is
/// rejected downstream by the resolver.
pub fn build_system_prompt(descriptions: &[CapabilityDescription]) -> String {
    let catalog = serde_json::to_string_pretty(descriptions)
        .unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a CRM assistant for HubSpot and Gmail operations. Your only job is to \
translate the user's request into exactly one capability call.\n\
\n\
AVAILABLE CAPABILITIES (name, description, parameters):\n{catalog}\n\
\n\
RULES:\n\
- Pick exactly one capability from the list above. Never invent names.\n\
- Fill arguments only from information the user actually provided.\n\
- Omit optional parameters the user did not mention; never invent values.\n\
- Respond with a single JSON object of the form\n\
  {{\"capability\": \"<name>\", \"arguments\": {{\"<parameter>\": <value>}}}}\n\
- Output nothing besides that JSON object: no prose, no code fences."
    )
}
