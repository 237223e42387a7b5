pub mod anthropic;
pub mod ollama;
pub mod openai;

use genie_core::codegen::ChatPrompt;

/// Temperature used by every provider unless overridden.
pub const DEFAULT_TEMPERATURE: f64 = 0.4;

/// Sampling settings shared by all providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u64>,
}

/// Map a chat prompt onto an agent preamble and a user message.
///
/// A system-only prompt is sent as the user message, since every provider
/// needs at least one.
pub(crate) fn split_prompt(prompt: &ChatPrompt) -> (Option<&str>, &str) {
    match (prompt.system.as_deref(), prompt.human.as_deref()) {
        (system, Some(human)) => (system, human),
        (Some(system), None) => (None, system),
        (None, None) => (None, ""),
    }
}
