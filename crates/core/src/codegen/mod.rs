pub mod extract;
pub mod prompt;
pub mod template;
pub mod types;
pub mod usage;

pub use extract::{extract_json, parse_json_response, ResponseFormatError};
pub use prompt::{
    build_file_paths_prompt, build_shared_dependencies_prompt, build_source_code_prompt,
    describe_dependency, ChatPrompt,
};
pub use template::{render, TemplateError, TemplateValue, TemplateVars};
pub use types::{
    shared_dependencies_to_yaml, FilePathPlan, GeneratedFile, GenerationRequest, PlanError,
    SharedDependency, SharedDependencyPlan,
};
pub use usage::Usage;
