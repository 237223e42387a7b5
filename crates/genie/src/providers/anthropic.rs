use super::{split_prompt, ModelSettings, DEFAULT_TEMPERATURE};
use crate::codegen::{ChatModel, Generation};
use crate::prelude::{eprintln, *};
use async_trait::async_trait;
use genie_core::codegen::ChatPrompt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::anthropic;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Anthropic rejects requests without an explicit token limit.
pub const DEFAULT_MAX_TOKENS: u64 = 4000;

#[derive(Debug, clap::Parser)]
#[command(name = "anthropic")]
#[command(about = "Run codegen provided by Anthropic")]
#[command(after_help = "Examples:\n  genie anthropic -p \"Create a python hello world\"\n  genie anthropic -p prompt.txt")]
pub struct App {
    /// Anthropic API key
    #[clap(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use
    #[clap(short, long, env = "GENIE_ANTHROPIC_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[clap(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Maximum number of tokens per generation
    #[clap(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u64,
}

pub struct AnthropicModel {
    client: anthropic::Client,
    settings: ModelSettings,
}

impl AnthropicModel {
    pub fn new(api_key: &str, settings: ModelSettings) -> Result<Self> {
        let client = anthropic::Client::builder()
            .api_key(api_key)
            .build()
            .map_err(|e| eyre!("Failed to create Anthropic client: {}", e))?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ChatModel for AnthropicModel {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<Generation> {
        let (preamble, message) = split_prompt(prompt);

        let mut builder = self
            .client
            .agent(&self.settings.model)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        let agent = builder.build();

        let text = agent
            .prompt(message)
            .await
            .map_err(|e| eyre!("Anthropic generation failed: {}", e))?;

        Ok(Generation::new(prompt, text))
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let api_key = app
        .api_key
        .ok_or_eyre("Anthropic API key is required: pass --api-key or set ANTHROPIC_API_KEY")?;

    let settings = ModelSettings {
        model: app.model,
        temperature: app.temperature,
        max_tokens: Some(app.max_tokens),
    };

    if global.verbose {
        eprintln!("Provider: anthropic");
        eprintln!("Model: {}", settings.model);
    }

    let model = AnthropicModel::new(&api_key, settings)?;

    crate::pipeline::run(Arc::new(model), global).await
}
