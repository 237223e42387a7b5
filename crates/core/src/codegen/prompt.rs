use super::template::{render, TemplateError, TemplateVars};
use super::types::SharedDependency;

const FILE_PATHS_SYSTEM: &str = include_str!("templates/file_paths_system.tpl");
const FILE_PATHS_HUMAN: &str = include_str!("templates/file_paths_human.tpl");
const SHARED_DEPENDENCIES_SYSTEM: &str = include_str!("templates/shared_dependencies_system.tpl");
const CODE_GENERATION_SYSTEM: &str = include_str!("templates/code_generation_system.tpl");
const CODE_GENERATION_HUMAN: &str = include_str!("templates/code_generation_human.tpl");

/// A rendered system/human message pair, ready to send to a chat model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: Option<String>,
    pub human: Option<String>,
}

impl ChatPrompt {
    /// Total length of both messages in bytes.
    pub fn len(&self) -> usize {
        self.system.as_deref().map_or(0, str::len) + self.human.as_deref().map_or(0, str::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the prompt that asks the model for the list of files to generate.
pub fn build_file_paths_prompt(prompt: &str) -> Result<ChatPrompt, TemplateError> {
    let vars = TemplateVars::new().with("prompt", prompt);

    Ok(ChatPrompt {
        system: Some(render(FILE_PATHS_SYSTEM, &vars)?),
        human: Some(render(FILE_PATHS_HUMAN, &vars)?),
    })
}

/// Build the system-only prompt that asks for the dependencies shared between files.
pub fn build_shared_dependencies_prompt(
    prompt: &str,
    file_paths: &[String],
) -> Result<ChatPrompt, TemplateError> {
    let vars = TemplateVars::new()
        .with("prompt", prompt)
        .with("file_paths", file_paths);

    Ok(ChatPrompt {
        system: Some(render(SHARED_DEPENDENCIES_SYSTEM, &vars)?),
        human: None,
    })
}

/// Build the prompt that asks for the source of a single file.
///
/// `shared_dependencies` is the already serialized block from
/// [`shared_dependencies_to_yaml`](super::types::shared_dependencies_to_yaml).
pub fn build_source_code_prompt(
    prompt: &str,
    filename: &str,
    file_paths: &[String],
    shared_dependencies: &str,
) -> Result<ChatPrompt, TemplateError> {
    let vars = TemplateVars::new()
        .with("prompt", prompt)
        .with("filename", filename)
        .with("file_paths", file_paths)
        .with("shared_dependencies", shared_dependencies);

    Ok(ChatPrompt {
        system: Some(render(CODE_GENERATION_SYSTEM, &vars)?),
        human: Some(render(CODE_GENERATION_HUMAN, &vars)?),
    })
}

/// Format a shared dependency for a one-line listing.
pub fn describe_dependency(dependency: &SharedDependency) -> String {
    if dependency.symbols.is_empty() {
        format!("{}: {}", dependency.name, dependency.description)
    } else {
        format!(
            "{}: {} [{}]",
            dependency.name,
            dependency.description,
            dependency.symbols.join(", ")
        )
    }
}
