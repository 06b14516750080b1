use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::ProviderKind;
use crate::errors::FlowError;

pub const DEFAULT_CONFIG_FILE: &str = "codecalc.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root: String,
    pub provider: ProviderKind,
    /// Unset means the provider's default, see `model_name`.
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub strict_unique_file_names: bool,
    pub save_artifacts: bool,
    pub accept: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: ".".into(),
            provider: ProviderKind::Gemini,
            model: None,
            api_base: None,
            api_key_env: None,
            timeout_secs: 120,
            max_attempts: 1,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            strict_unique_file_names: false,
            save_artifacts: false,
            accept: ".java,.xml,.kt,.gradle,text/plain".into(),
        }
    }
}

impl Config {
    /// Explicit path must exist; otherwise `./codecalc.toml` is used when
    /// present, and defaults when it is not.
    pub fn load(explicit: Option<&Path>) -> Result<Config, FlowError> {
        match explicit {
            Some(p) => Self::from_file(p),
            None => {
                let p = Path::new(DEFAULT_CONFIG_FILE);
                if p.is_file() {
                    Self::from_file(p)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, FlowError> {
        let raw = fs::read_to_string(path).map_err(|e| FlowError::Config(e.to_string()))?;
        toml::from_str(&raw)
            .map_err(|e| FlowError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Env var holding the API key; `None` for providers that need none.
    pub fn key_env(&self) -> Option<String> {
        if let Some(name) = &self.api_key_env {
            return Some(name.clone());
        }
        match self.provider {
            ProviderKind::Gemini => Some("GOOGLE_API_KEY".into()),
            ProviderKind::OpenAI => Some("OPENAI_API_KEY".into()),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY".into()),
            ProviderKind::Ollama => None,
        }
    }

    pub fn model_name(&self) -> String {
        if let Some(m) = self.model.as_deref().filter(|m| !m.trim().is_empty()) {
            return m.to_string();
        }
        match self.provider {
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::OpenAI => "gpt-4.1-mini",
            ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
            ProviderKind::Ollama => "llama3",
        }
        .to_string()
    }

    /// A variable that is exported but blank counts as not set.
    pub fn api_key(&self) -> Result<Option<String>, FlowError> {
        let Some(name) = self.key_env() else {
            return Ok(None);
        };
        match std::env::var(&name) {
            Ok(v) if !v.trim().is_empty() => Ok(Some(v)),
            Ok(_) => Err(FlowError::Config(format!("{name} env var is empty"))),
            Err(_) => Err(FlowError::Config(format!("{name} env var is not set"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_make_one_attempt() {
        let c = Config::default();
        assert_eq!(c.max_attempts, 1);
        assert!(!c.strict_unique_file_names);
        assert_eq!(c.key_env().as_deref(), Some("GOOGLE_API_KEY"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "provider = \"ollama\"\nmodel = \"llama3\"\nmax_attempts = 3").unwrap();
        let c = Config::from_file(f.path()).unwrap();
        assert!(matches!(c.provider, ProviderKind::Ollama));
        assert_eq!(c.model_name(), "llama3");
        assert_eq!(c.max_attempts, 3);
        assert_eq!(c.timeout_secs, 120);
        assert_eq!(c.key_env(), None);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "max_attempts = \"many\"").unwrap();
        assert!(matches!(Config::from_file(f.path()), Err(FlowError::Config(_))));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn model_defaults_follow_provider() {
        let mut c = Config::default();
        assert_eq!(c.model_name(), "gemini-2.0-flash");
        c.provider = ProviderKind::Ollama;
        assert_eq!(c.model_name(), "llama3");
        c.provider = ProviderKind::OpenAI;
        assert_eq!(c.model_name(), "gpt-4.1-mini");
        c.provider = ProviderKind::Anthropic;
        assert!(c.model_name().starts_with("claude"));
        c.model = Some("custom".into());
        assert_eq!(c.model_name(), "custom");
    }

    #[test]
    fn provider_only_file_uses_that_providers_model() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "provider = \"openai\"").unwrap();
        let c = Config::from_file(f.path()).unwrap();
        assert_eq!(c.model_name(), "gpt-4.1-mini");
    }

    #[test]
    fn blank_key_is_a_config_error() {
        let name = "CODECALC_TEST_BLANK_KEY";
        std::env::set_var(name, "  ");
        let c = Config { api_key_env: Some(name.into()), ..Config::default() };
        assert!(matches!(c.api_key(), Err(FlowError::Config(m)) if m.contains("empty")));
        std::env::remove_var(name);
    }

    #[test]
    fn custom_key_env_wins() {
        let c = Config { api_key_env: Some("MY_KEY".into()), ..Config::default() };
        assert_eq!(c.key_env().as_deref(), Some("MY_KEY"));
    }
}
