use crate::prelude::{println, *};
use clap::Parser;
use std::path::PathBuf;

mod codegen;
mod error;
mod pipeline;
mod prelude;
mod providers;

const LOGO: &str = r#" ██████  ███████ ███    ██ ██ ███████
██       ██      ████   ██ ██ ██
██   ███ █████   ██ ██  ██ ██ █████
██    ██ ██      ██  ██ ██ ██ ██
 ██████  ███████ ██   ████ ██ ███████"#;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate a small multi-file project from a natural-language prompt using a large language model"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Prompt to use: literal text or the path of a file containing it (required)
    #[clap(short, long, global = true)]
    prompt: Option<String>,

    /// Directory the generated files are written to
    #[clap(short, long, env = "GENIE_OUTDIR", global = true, default_value = "dist")]
    outdir: PathBuf,

    /// Maximum number of files generated at the same time
    #[clap(long, env = "GENIE_CONCURRENCY", global = true, default_value_t = pipeline::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Whether to display additional information.
    #[clap(long, env = "GENIE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Run codegen provided by OpenAI
    #[clap(name = "openai")]
    OpenAI(crate::providers::openai::App),

    /// Run codegen provided by Anthropic
    #[clap(name = "anthropic")]
    Anthropic(crate::providers::anthropic::App),

    /// Run codegen against a local Ollama server
    #[clap(name = "ollama")]
    Ollama(crate::providers::ollama::App),
}

fn print_logo() {
    println!();
    println!("{}", LOGO);
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    print_logo();

    let app = App::parse();

    match app.command {
        SubCommands::OpenAI(sub_app) => crate::providers::openai::run(sub_app, app.global).await,
        SubCommands::Anthropic(sub_app) => {
            crate::providers::anthropic::run(sub_app, app.global).await
        }
        SubCommands::Ollama(sub_app) => crate::providers::ollama::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
