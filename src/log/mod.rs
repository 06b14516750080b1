use crate::wire::CompletionRequest;
use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Logs go to stderr; stdout is reserved for results. `RUST_LOG` wins over
/// the `--debug` default.
pub fn init_tracing(debug: bool) {
    let default = if debug { "codecalc=debug" } else { "codecalc=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: PathBuf,
    pub response: PathBuf,
}

fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".codecalc").join("tx").join(tx.to_string())
}

/// Writes the request and raw reply of each model call to
/// `<root>/.codecalc/tx/<uuid>/`.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    root: PathBuf,
}

impl ArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn save_attempt(
        &self,
        tx: Uuid,
        attempt: u32,
        req: &CompletionRequest,
        outcome: Result<&str, &str>,
    ) -> anyhow::Result<SavedPaths> {
        let dir = tx_dir(&self.root, tx);
        fs::create_dir_all(&dir)?;

        let stage = format!("{}.{}", req.flow, attempt);
        let request = dir.join(format!("{stage}.request.json"));
        fs::write(&request, to_string_pretty(req)?)?;

        let body = match outcome {
            Ok(raw) => json!({ "at": Utc::now(), "ok": true, "raw": raw }),
            Err(reason) => json!({ "at": Utc::now(), "ok": false, "error": reason }),
        };
        let response = dir.join(format!("{stage}.response.json"));
        fs::write(&response, to_string_pretty(&body)?)?;

        tracing::debug!(dir = %dir.display(), %stage, "artifacts saved");
        Ok(SavedPaths { dir, request, response })
    }
}
