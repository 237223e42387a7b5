use crate::prelude::*;
use async_trait::async_trait;
use genie_core::codegen::{
    build_file_paths_prompt, build_shared_dependencies_prompt, build_source_code_prompt,
    parse_json_response, shared_dependencies_to_yaml, ChatPrompt, FilePathPlan, GeneratedFile,
    GenerationRequest, SharedDependency, SharedDependencyPlan, Usage,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Text returned by a single chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub usage: Usage,
}

impl Generation {
    pub fn new(prompt: &ChatPrompt, text: String) -> Self {
        let usage = Usage::single(prompt.len(), text.len());
        Self { text, usage }
    }
}

/// The one capability the pipeline needs from a model provider.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Submit the prompt and return the model's reply.
    async fn generate(&self, prompt: &ChatPrompt) -> Result<Generation>;
}

/// Output of a stage together with the usage of the call that produced it.
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub value: T,
    pub usage: Usage,
}

/// The three model-backed stages.
///
/// Every model call races against the cancellation token, so a cancelled run
/// stops waiting on in-flight requests.
#[derive(Clone)]
pub struct CodeGen {
    model: Arc<dyn ChatModel>,
    cancel: CancellationToken,
}

impl CodeGen {
    pub fn new(model: Arc<dyn ChatModel>, cancel: CancellationToken) -> Self {
        Self { model, cancel }
    }

    async fn invoke(&self, prompt: &ChatPrompt) -> Result<Generation, Error> {
        log::debug!("Sending prompt of {} bytes", prompt.len());

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = self.model.generate(prompt) => {
                result.map_err(|e| Error::ModelInvocation(e.to_string()))
            }
        }
    }

    /// Ask the model which files make up the project.
    pub async fn file_paths(
        &self,
        request: &GenerationRequest,
    ) -> Result<StageOutput<FilePathPlan>, Error> {
        let prompt = build_file_paths_prompt(&request.prompt)?;
        let generation = self.invoke(&prompt).await?;

        let plan: FilePathPlan = parse_json_response(&generation.text)?;
        plan.validate()?;

        Ok(StageOutput {
            value: plan,
            usage: generation.usage,
        })
    }

    /// Ask the model what the planned files have in common.
    pub async fn shared_dependencies(
        &self,
        request: &GenerationRequest,
        file_paths: &[String],
    ) -> Result<StageOutput<SharedDependencyPlan>, Error> {
        let prompt = build_shared_dependencies_prompt(&request.prompt, file_paths)?;
        let generation = self.invoke(&prompt).await?;

        let plan: SharedDependencyPlan = parse_json_response(&generation.text)?;

        Ok(StageOutput {
            value: plan,
            usage: generation.usage,
        })
    }

    /// Generate the source of one file. The reply is used verbatim.
    pub async fn generate_source_code(
        &self,
        request: &GenerationRequest,
        filename: &str,
        file_paths: &[String],
        shared_dependencies: &[SharedDependency],
    ) -> Result<StageOutput<GeneratedFile>, Error> {
        let dependencies = shared_dependencies_to_yaml(shared_dependencies)?;
        let prompt =
            build_source_code_prompt(&request.prompt, filename, file_paths, &dependencies)?;
        let generation = self.invoke(&prompt).await?;

        Ok(StageOutput {
            value: GeneratedFile {
                filename: filename.to_string(),
                source: generation.text,
            },
            usage: generation.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genie_core::codegen::{PlanError, ResponseFormatError};
    use std::sync::Mutex;

    /// Replies with a fixed text and records every prompt it receives.
    struct EchoModel {
        reply: String,
        prompts: Mutex<Vec<ChatPrompt>>,
    }

    impl EchoModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn generate(&self, prompt: &ChatPrompt) -> Result<Generation> {
            self.prompts.lock().unwrap().push(prompt.clone());
            Ok(Generation::new(prompt, self.reply.clone()))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn generate(&self, _prompt: &ChatPrompt) -> Result<Generation> {
            Err(eyre!("rate limited"))
        }
    }

    fn codegen(model: Arc<dyn ChatModel>) -> CodeGen {
        CodeGen::new(model, CancellationToken::new())
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("hello world in python")
    }

    #[tokio::test]
    async fn test_file_paths_decodes_plan_from_prose() {
        let model = EchoModel::new(
            "Here you go:\n{\"reasoning\": [\"tiny\"], \"file_paths\": [\"main.py\"]}\nEnjoy!",
        );
        let output = codegen(model.clone()).file_paths(&request()).await.unwrap();

        assert_eq!(output.value.file_paths, vec!["main.py"]);
        assert_eq!(output.value.reasoning, vec!["tiny"]);
        assert_eq!(output.usage.requests, 1);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].system.is_some());
        assert!(prompts[0]
            .human
            .as_deref()
            .unwrap()
            .contains("hello world in python"));
    }

    #[tokio::test]
    async fn test_file_paths_without_json_is_a_format_error() {
        let err = codegen(EchoModel::new("I'd write main.py"))
            .file_paths(&request())
            .await
            .unwrap_err();

        match err {
            Error::ResponseFormat(ResponseFormatError::NoJsonObject { raw }) => {
                assert_eq!(raw, "I'd write main.py");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_paths_rejects_empty_plan() {
        let err = codegen(EchoModel::new(r#"{"reasoning": [], "file_paths": []}"#))
            .file_paths(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidPlan(PlanError::Empty)));
    }

    #[tokio::test]
    async fn test_shared_dependencies_sends_system_message_only() {
        let model = EchoModel::new(
            r#"{"reasoning": ["r"], "shared_dependencies": [{"name": "greet", "description": "greeting helper", "symbols": ["greet"]}]}"#,
        );
        let output = codegen(model.clone())
            .shared_dependencies(&request(), &["main.py".to_string()])
            .await
            .unwrap();

        assert_eq!(output.value.shared_dependencies[0].name, "greet");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].human.is_none());
        assert!(prompts[0].system.as_deref().unwrap().contains("- main.py"));
    }

    #[tokio::test]
    async fn test_generate_source_code_uses_reply_verbatim() {
        let reply = "{not json}\nprint(\"hello world\")\n";
        let model = EchoModel::new(reply);
        let dependencies = vec![SharedDependency {
            name: "greet".to_string(),
            description: "greeting helper".to_string(),
            symbols: vec!["greet".to_string()],
        }];

        let output = codegen(model.clone())
            .generate_source_code(&request(), "main.py", &["main.py".to_string()], &dependencies)
            .await
            .unwrap();

        assert_eq!(output.value.filename, "main.py");
        assert_eq!(output.value.source, reply);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].system.as_deref().unwrap().contains("- name: greet"));
    }

    #[tokio::test]
    async fn test_model_failure_is_passed_through() {
        let err = codegen(Arc::new(FailingModel))
            .file_paths(&request())
            .await
            .unwrap_err();

        match err {
            Error::ModelInvocation(message) => assert!(message.contains("rate limited")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = CodeGen::new(EchoModel::new("{}"), cancel)
            .shared_dependencies(&request(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }
}
