// Shared prompt fragments.
// Each stage that needs LLM calls defines its own prompts alongside it;
// this file holds the cross-cutting pieces.

/// Appended to every system instruction.
pub const JSON_ONLY_SYSTEM: &str = "Return ONLY valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Closing line of every user prompt.
pub const JSON_ONLY_FOOTER: &str = "Return ONLY the JSON, no additional text.";

/// Joins a role-specific system instruction with the JSON-only rule.
pub fn system_instruction(role: &str) -> String {
    format!("{} {}", role.trim_end(), JSON_ONLY_SYSTEM)
}
