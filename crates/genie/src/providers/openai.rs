use super::{split_prompt, ModelSettings, DEFAULT_TEMPERATURE};
use crate::codegen::{ChatModel, Generation};
use crate::prelude::{eprintln, *};
use async_trait::async_trait;
use genie_core::codegen::ChatPrompt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, clap::Parser)]
#[command(name = "openai")]
#[command(about = "Run codegen provided by OpenAI")]
#[command(after_help = "Examples:\n  genie openai -p \"Create a python hello world\"\n  genie openai -p prompt.txt")]
pub struct App {
    /// OpenAI API key
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use
    #[clap(short, long, env = "GENIE_OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[clap(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Maximum number of tokens per generation (provider default when unset)
    #[clap(long)]
    pub max_tokens: Option<u64>,
}

pub struct OpenAiModel {
    client: openai::Client,
    settings: ModelSettings,
}

impl OpenAiModel {
    pub fn new(api_key: &str, settings: ModelSettings) -> Result<Self> {
        let client = openai::Client::builder()
            .api_key(api_key)
            .build()
            .map_err(|e| eyre!("Failed to create OpenAI client: {}", e))?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ChatModel for OpenAiModel {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<Generation> {
        let (preamble, message) = split_prompt(prompt);

        let mut builder = self
            .client
            .agent(&self.settings.model)
            .temperature(self.settings.temperature);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(max_tokens) = self.settings.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        let agent = builder.build();

        let text = agent
            .prompt(message)
            .await
            .map_err(|e| eyre!("OpenAI generation failed: {}", e))?;

        Ok(Generation::new(prompt, text))
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let api_key = app
        .api_key
        .ok_or_eyre("OpenAI API key is required: pass --api-key or set OPENAI_API_KEY")?;

    let settings = ModelSettings {
        model: app.model,
        temperature: app.temperature,
        max_tokens: app.max_tokens,
    };

    if global.verbose {
        eprintln!("Provider: openai");
        eprintln!("Model: {}", settings.model);
    }

    let model = OpenAiModel::new(&api_key, settings)?;

    crate::pipeline::run(Arc::new(model), global).await
}
