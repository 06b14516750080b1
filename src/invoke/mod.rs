use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::FlowError;
use crate::log::ArtifactSink;
use crate::prompt::PROMPT_VERSION;
use crate::provider::DynProvider;
use crate::schema::Contract;
use crate::wire::{CompletionRequest, Instruction};

/// How many times one flow may call the model. The default is a single
/// attempt; retries only happen when configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial_backoff: Duration::from_millis(cfg.initial_backoff_ms),
            max_backoff: Duration::from_millis(cfg.max_backoff_ms),
        }
    }

    /// Delay after failed attempt `attempt` (1-based): doubles each time,
    /// capped at `max_backoff`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Sends a rendered prompt plus response schema to the model and hands back
/// a validated reply or `AiGenerationFailed`.
pub struct Invoker {
    provider: DynProvider,
    policy: RetryPolicy,
    timeout: Duration,
    artifacts: Option<ArtifactSink>,
}

impl Invoker {
    pub fn new(provider: DynProvider, timeout: Duration) -> Self {
        Self { provider, policy: RetryPolicy::default(), timeout, artifacts: None }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_artifacts(mut self, sink: ArtifactSink) -> Self {
        self.artifacts = Some(sink);
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn run<O: Contract>(&self, instruction: Instruction) -> Result<O, FlowError> {
        let req = CompletionRequest {
            flow: O::FLOW.to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
            instruction,
            schema: O::json_schema(),
        };
        let tx = Uuid::new_v4();
        let attempts = self.policy.max_attempts.max(1);

        let mut last = FlowError::AiGenerationFailed("model was not called".into());
        for attempt in 1..=attempts {
            tracing::info!(
                flow = O::FLOW,
                provider = self.provider.name(),
                attempt,
                %tx,
                "calling model"
            );
            match self.attempt::<O>(&req, tx, attempt).await {
                Ok(out) => {
                    tracing::info!(flow = O::FLOW, attempt, "model reply accepted");
                    return Ok(out);
                }
                Err(e) => {
                    if attempt < attempts {
                        let wait = self.policy.backoff_after(attempt);
                        tracing::warn!(
                            flow = O::FLOW,
                            attempt,
                            error = %e,
                            ?wait,
                            "model call failed, retrying"
                        );
                        tokio::time::sleep(wait).await;
                    } else {
                        tracing::warn!(flow = O::FLOW, attempt, error = %e, "model call failed");
                    }
                    last = e;
                }
            }
        }
        Err(last)
    }

    async fn attempt<O: Contract>(
        &self,
        req: &CompletionRequest,
        tx: Uuid,
        attempt: u32,
    ) -> Result<O, FlowError> {
        let raw = match tokio::time::timeout(self.timeout, self.provider.complete(req)).await {
            Err(_) => Err(format!("model call timed out after {}s", self.timeout.as_secs_f32())),
            Ok(Err(e)) => Err(format!("{e:#}")),
            Ok(Ok(raw)) => Ok(raw),
        };

        if let Some(sink) = &self.artifacts {
            let outcome = raw.as_deref().map_err(|e| e.as_str());
            if let Err(e) = sink.save_attempt(tx, attempt, req, outcome) {
                tracing::warn!(error = %e, "could not save request artifacts");
            }
        }

        let raw = raw.map_err(FlowError::AiGenerationFailed)?;
        parse_reply::<O>(&raw)
    }
}

/// Strict parse first; then the first balanced JSON object in the text
/// (models sometimes wrap the object in prose or fences); then validation.
pub fn parse_reply<O: Contract>(raw: &str) -> Result<O, FlowError> {
    if raw.trim().is_empty() {
        return Err(FlowError::AiGenerationFailed("model returned no output".into()));
    }

    let parsed = match serde_json::from_str::<O>(raw) {
        Ok(v) => v,
        Err(strict_err) => {
            let obj = extract_first_json_object(raw).ok_or_else(|| {
                FlowError::AiGenerationFailed(format!("reply is not JSON: {strict_err}"))
            })?;
            serde_json::from_str::<O>(obj).map_err(|e| {
                FlowError::AiGenerationFailed(format!(
                    "reply does not match the {} schema: {e}",
                    O::FLOW
                ))
            })?
        }
    };

    parsed.validate()?;
    Ok(parsed)
}

/// First top-level `{...}` in `s`. Braces inside JSON strings are ignored.
pub fn extract_first_json_object(s: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| &s[st..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
