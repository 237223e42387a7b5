use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// The user's request. Built once from the CLI input and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Natural-language description of the project to generate.
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Output of the file-paths stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePathPlan {
    #[serde(default)]
    pub reasoning: Vec<String>,
    pub file_paths: Vec<String>,
}

/// A symbol group that more than one generated file relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDependency {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Output of the shared-dependencies stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDependencyPlan {
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub shared_dependencies: Vec<SharedDependency>,
}

/// A single generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub filename: String,
    pub source: String,
}

/// Reasons a decoded file-path plan cannot be used.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("model returned an empty file list")]
    Empty,

    #[error("file path must be relative: {0}")]
    AbsolutePath(String),

    #[error("file path escapes the output directory: {0}")]
    ParentTraversal(String),
}

impl FilePathPlan {
    /// Check that the plan names at least one file and that every entry stays
    /// inside the output directory once joined onto it.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.file_paths.is_empty() {
            return Err(PlanError::Empty);
        }

        for file_path in &self.file_paths {
            validate_relative_path(file_path)?;
        }

        Ok(())
    }
}

fn validate_relative_path(file_path: &str) -> Result<(), PlanError> {
    let path = Path::new(file_path);

    if path.is_absolute() || path.has_root() {
        return Err(PlanError::AbsolutePath(file_path.to_string()));
    }

    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(PlanError::ParentTraversal(file_path.to_string()));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(PlanError::AbsolutePath(file_path.to_string()));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

/// Render shared dependencies as block-style YAML for embedding in a prompt.
pub fn shared_dependencies_to_yaml(
    dependencies: &[SharedDependency],
) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(dependencies)
}
