//! Typed, schema-validated LLM flows for Android code generation, app
//! prompts and code merging, plus a character diff for comparing sources.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod diff;
pub mod errors;
pub mod flows;
pub mod ingest;
pub mod invoke;
pub mod log;
pub mod merge;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod session;
pub mod ux;
pub mod wire;

use std::time::Duration;

use crate::config::Config;
use crate::errors::FlowError;
use crate::flows::Flows;
use crate::invoke::{Invoker, RetryPolicy};
use crate::log::ArtifactSink;

/// Wires provider, retry policy and artifact saving from `cfg`.
pub fn build_flows(cfg: &Config) -> Result<Flows, FlowError> {
    let provider = provider::make_provider(cfg)?;
    let mut invoker = Invoker::new(provider, Duration::from_secs(cfg.timeout_secs))
        .with_policy(RetryPolicy::from_config(cfg));
    if cfg.save_artifacts {
        invoker = invoker.with_artifacts(ArtifactSink::new(&cfg.root));
    }
    Ok(Flows::new(invoker).strict_unique_file_names(cfg.strict_unique_file_names))
}
