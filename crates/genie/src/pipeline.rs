use crate::codegen::{ChatModel, CodeGen, StageOutput};
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use genie_core::codegen::{describe_dependency, GenerationRequest, SharedDependency, Usage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Maximum number of files generated at the same time.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// What a successful run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub usage: Usage,
}

type TaskResult = Result<(PathBuf, Usage), Error>;

/// Runs the file-paths, shared-dependencies and source-code stages, then
/// writes every generated file under `outdir`.
pub struct Pipeline {
    codegen: CodeGen,
    outdir: PathBuf,
    concurrency: usize,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(model: Arc<dyn ChatModel>, outdir: impl Into<PathBuf>) -> Self {
        Self::with_cancellation(model, outdir, CancellationToken::new())
    }

    pub fn with_cancellation(
        model: Arc<dyn ChatModel>,
        outdir: impl Into<PathBuf>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            codegen: CodeGen::new(model, cancel.clone()),
            outdir: outdir.into(),
            concurrency: DEFAULT_CONCURRENCY,
            cancel,
        }
    }

    /// Cap the number of concurrent generations. Values below one are raised to one.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        log::info!("Stage 1: planning file paths");
        println!("{}", "Create list of files:".bold());
        let StageOutput {
            value: file_plan,
            usage,
        } = with_spinner("Planning files...", self.codegen.file_paths(request)).await?;
        summary.usage += usage;

        print_bullets(&file_plan.file_paths);
        println!();
        println!("{}", "Reasoning:".bold());
        print_bullets(&file_plan.reasoning);
        println!();

        log::info!("Stage 2: planning shared dependencies");
        println!("{}", "Create list of shared dependencies:".bold());
        let StageOutput {
            value: dependency_plan,
            usage,
        } = with_spinner(
            "Planning shared dependencies...",
            self.codegen
                .shared_dependencies(request, &file_plan.file_paths),
        )
        .await?;
        summary.usage += usage;

        let described: Vec<String> = dependency_plan
            .shared_dependencies
            .iter()
            .map(describe_dependency)
            .collect();
        print_bullets(&described);
        println!();
        println!("{}", "Reasoning:".bold());
        print_bullets(&dependency_plan.reasoning);
        println!();

        log::info!(
            "Stage 3: generating {} files (concurrency {})",
            file_plan.file_paths.len(),
            self.concurrency
        );
        self.generate_all(
            Arc::new(request.clone()),
            Arc::new(file_plan.file_paths),
            Arc::new(dependency_plan.shared_dependencies),
            summary,
        )
        .await
    }

    async fn generate_all(
        &self,
        request: Arc<GenerationRequest>,
        file_paths: Arc<Vec<String>>,
        dependencies: Arc<Vec<SharedDependency>>,
        mut summary: RunSummary,
    ) -> Result<RunSummary, Error> {
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();
        let mut first_error: Option<Error> = None;

        for file_path in file_paths.iter() {
            let target = self.outdir.join(file_path);

            if tokio::fs::metadata(&target).await.is_ok() {
                println!(
                    "{}",
                    f!("File {} already exists, skipping", target.display()).yellow()
                );
                summary.skipped.push(target);
                continue;
            }

            while tasks.len() >= self.concurrency {
                if let Some(joined) = tasks.join_next().await {
                    record(joined, &mut summary, &mut first_error);
                }
            }

            if first_error.is_none() && self.cancel.is_cancelled() {
                first_error = Some(Error::Cancelled);
            }
            if first_error.is_some() {
                break;
            }

            let codegen = self.codegen.clone();
            let request = Arc::clone(&request);
            let file_paths = Arc::clone(&file_paths);
            let dependencies = Arc::clone(&dependencies);
            let file_path = file_path.clone();

            log::debug!("Spawning generation for {}", file_path);
            tasks.spawn(async move {
                let output = codegen
                    .generate_source_code(&request, &file_path, &file_paths, &dependencies)
                    .await?;

                write_source(&target, &output.value.source).await?;
                println!("File {} created", output.value.filename.green());

                Ok((target, output.usage))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            record(joined, &mut summary, &mut first_error);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}

fn record(
    joined: Result<TaskResult, tokio::task::JoinError>,
    summary: &mut RunSummary,
    first_error: &mut Option<Error>,
) {
    let err = match joined {
        Ok(Ok((path, usage))) => {
            log::debug!("Finished {}", path.display());
            summary.generated.push(path);
            summary.usage += usage;
            return;
        }
        Ok(Err(err)) => err,
        Err(join_err) => Error::Task(join_err.to_string()),
    };

    log::debug!("Generation task failed: {}", err);
    if first_error.is_none() {
        *first_error = Some(err);
    }
}

/// Write `source` to `path`, creating parent directories as needed.
///
/// On unix the file is created readable and writable by the owner only.
async fn write_source(path: &Path, source: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::filesystem(parent, e))?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(path)
        .await
        .map_err(|e| Error::filesystem(path, e))?;
    file.write_all(source.as_bytes())
        .await
        .map_err(|e| Error::filesystem(path, e))?;
    file.flush().await.map_err(|e| Error::filesystem(path, e))?;

    Ok(())
}

async fn with_spinner<T>(
    message: &str,
    future: impl std::future::Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    let spinner = new_spinner(message);
    let result = future.await;
    spinner.finish_and_clear();
    result
}

fn print_bullets(items: &[String]) {
    for item in items {
        println!("• {}", item);
    }
}

/// Read the prompt from a file when `input` names one, otherwise use it as-is.
pub fn read_file_or_string(input: &str) -> Result<String> {
    let path = Path::new(input);

    if path.is_file() {
        return std::fs::read_to_string(path)
            .with_context(|| f!("Failed to read prompt file '{}'", input));
    }

    Ok(input.to_string())
}

/// Entry point shared by every provider subcommand.
pub async fn run(model: Arc<dyn ChatModel>, global: crate::Global) -> Result<()> {
    let prompt = read_file_or_string(global.prompt.as_deref().unwrap_or_default())?;
    if prompt.trim().is_empty() {
        return Err(eyre!("prompt is required: pass --prompt with text or a file path"));
    }

    if global.verbose {
        eprintln!("Output directory: {}", global.outdir.display());
        eprintln!("Concurrency: {}", global.concurrency);
        eprintln!("Prompt length: {} bytes", prompt.len());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let pipeline = Pipeline::with_cancellation(model, &global.outdir, cancel)
        .concurrency(global.concurrency);
    let summary = pipeline.run(&GenerationRequest::new(prompt)).await?;

    println!();
    println!(
        "Generated {} files, skipped {}",
        summary.generated.len(),
        summary.skipped.len()
    );
    println!();
    println!("{}", "Info:".bold());
    println!("{}", summary.usage);

    Ok(())
}
