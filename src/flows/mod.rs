use crate::errors::FlowError;
use crate::invoke::Invoker;
use crate::merge;
use crate::prompt;
use crate::schema::FlowInput;
use crate::wire::{
    AppPromptInput, AppPromptOutput, FullProjectInput, FullProjectOutput, GenerateCodeInput,
    GenerateCodeOutput, MergeCodeInput, MergeCodeOutput,
};

/// The four model-backed operations. Each validates its input before any
/// network call and makes at most one model call per attempt.
pub struct Flows {
    invoker: Invoker,
    strict_unique_file_names: bool,
}

impl Flows {
    pub fn new(invoker: Invoker) -> Self {
        Self { invoker, strict_unique_file_names: false }
    }

    /// Reject projects that repeat a file name instead of only logging it.
    pub fn strict_unique_file_names(mut self, strict: bool) -> Self {
        self.strict_unique_file_names = strict;
        self
    }

    pub async fn generate_code(
        &self,
        input: &GenerateCodeInput,
    ) -> Result<GenerateCodeOutput, FlowError> {
        input.validate()?;
        self.invoker.run(prompt::render_code(&input.feature_description)).await
    }

    pub async fn generate_full_project(
        &self,
        input: &FullProjectInput,
    ) -> Result<FullProjectOutput, FlowError> {
        input.validate()?;
        let out: FullProjectOutput = self
            .invoker
            .run(prompt::render_project(&input.feature_description))
            .await?;

        let dups = out.duplicate_file_names();
        for name in &dups {
            tracing::warn!(
                file_name = %name,
                project = %out.project_name,
                "duplicate fileName in generated project"
            );
        }
        if self.strict_unique_file_names && !dups.is_empty() {
            return Err(FlowError::AiGenerationFailed(format!(
                "generated project repeats file names: {}",
                dups.join(", ")
            )));
        }
        Ok(out)
    }

    pub async fn generate_app_prompt(
        &self,
        input: &AppPromptInput,
    ) -> Result<AppPromptOutput, FlowError> {
        input.validate()?;
        let out: AppPromptOutput = self
            .invoker
            .run(prompt::render_app_prompt(&input.user_input))
            .await?;
        if !(3..=5).contains(&out.key_features.len()) {
            tracing::warn!(
                count = out.key_features.len(),
                "app prompt has an unusual number of key features"
            );
        }
        Ok(out)
    }

    pub async fn merge_code(&self, input: &MergeCodeInput) -> Result<MergeCodeOutput, FlowError> {
        input.validate()?;
        if let Some(out) = merge::precheck(input) {
            tracing::info!("merge inputs identical, skipping model call");
            return Ok(out);
        }
        self.invoker
            .run(prompt::render_merge(&input.original_code, &input.duplicate_code))
            .await
    }
}
