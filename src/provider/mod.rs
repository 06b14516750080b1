use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::FlowError;
use crate::wire::CompletionRequest;

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

/// An opaque text-completion service. Returns the raw text of the reply;
/// parsing and validation happen in `invoke`.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, req: &CompletionRequest) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider, FlowError> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let model = cfg.model_name();
    let base = cfg.api_base.clone();
    let key = cfg.api_key()?.unwrap_or_default();

    let p: DynProvider = match cfg.provider {
        ProviderKind::Gemini => Box::new(gemini::Gemini::new(
            model,
            key,
            base.unwrap_or_else(|| gemini::DEFAULT_BASE.into()),
            timeout,
        )),
        ProviderKind::OpenAI => Box::new(openai::OpenAIProvider::new(
            model,
            key,
            base.unwrap_or_else(|| openai::DEFAULT_BASE.into()),
            timeout,
        )),
        ProviderKind::Anthropic => Box::new(anthropic::Anthropic {
            model,
            api_key: key,
            timeout,
            api_base: base.unwrap_or_else(|| anthropic::DEFAULT_BASE.into()),
            api_version: "2023-06-01".into(),
        }),
        ProviderKind::Ollama => Box::new(ollama::Ollama {
            model,
            url: base.unwrap_or_else(|| ollama::DEFAULT_URL.into()),
            timeout,
        }),
    };
    Ok(p)
}

/// System text plus the response schema, for APIs without a native schema
/// slot.
pub(crate) fn system_with_schema(req: &CompletionRequest) -> String {
    let mut s = req.instruction.system_with_notes();
    s.push_str("\n\nResponse JSON Schema:\n");
    let schema = serde_json::to_string_pretty(&req.schema).unwrap_or_else(|_| req.schema.to_string());
    s.push_str(&schema);
    s
}
