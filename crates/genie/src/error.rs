use genie_core::codegen::{PlanError, ResponseFormatError, TemplateError};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error(transparent)]
    ResponseFormat(#[from] ResponseFormatError),

    #[error("Invalid file plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("Failed to serialize shared dependencies: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Generation task failed: {0}")]
    Task(String),

    #[error("Cancelled")]
    Cancelled,
}

impl Error {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}
