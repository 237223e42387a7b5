use super::{split_prompt, ModelSettings, DEFAULT_TEMPERATURE};
use crate::codegen::{ChatModel, Generation};
use crate::prelude::{eprintln, *};
use async_trait::async_trait;
use genie_core::codegen::ChatPrompt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;
use std::sync::Arc;

pub const DEFAULT_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5-coder";

#[derive(Debug, clap::Parser)]
#[command(name = "ollama")]
#[command(about = "Run codegen against a local Ollama server")]
pub struct App {
    /// Ollama base URL
    #[clap(long, env = "OLLAMA_URL", default_value = DEFAULT_URL)]
    pub ollama_url: String,

    /// Model to use
    #[clap(short, long, env = "GENIE_OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[clap(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Maximum number of tokens per generation (model default when unset)
    #[clap(long)]
    pub max_tokens: Option<u64>,
}

pub struct OllamaModel {
    client: ollama::Client,
    settings: ModelSettings,
}

impl OllamaModel {
    pub fn new(ollama_url: &str, settings: ModelSettings) -> Result<Self> {
        use rig::client::Nothing;

        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(ollama_url)
            .build()
            .map_err(|e| eyre!("Failed to create Ollama client: {}", e))?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ChatModel for OllamaModel {
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
            .map_err(|e| eyre!("Ollama generation failed: {}", e))?;

        Ok(Generation::new(prompt, text))
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let settings = ModelSettings {
        model: app.model,
        temperature: app.temperature,
        max_tokens: app.max_tokens,
    };

    if global.verbose {
        eprintln!("Provider: ollama");
        eprintln!("Ollama URL: {}", app.ollama_url);
        eprintln!("Model: {}", settings.model);
    }

    let model = OllamaModel::new(&app.ollama_url, settings)?;

    crate::pipeline::run(Arc::new(model), global).await
}
