use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Provider;
use crate::wire::CompletionRequest;

pub const DEFAULT_BASE: &str = "https://generativelanguage.googleapis.com";

/// Google Generative Language API, non-streaming `generateContent`.
pub struct Gemini {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
    timeout: Duration,
}

impl Gemini {
    pub fn new(model: String, api_key: String, api_base: String, timeout: Duration) -> Self {
        Self { model, api_key, api_base, client: Client::new(), timeout }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<Part>,
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        );
        let body = GeminiRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: super::system_with_schema(req) }],
            },
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: req.instruction.user.clone() }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.2,
            },
        };

        tracing::debug!(flow = %req.flow, %url, "gemini: POST");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("gemini request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("gemini read body failed")?;
        tracing::debug!(%status, body = %text, "gemini: raw response");

        if !status.is_success() {
            return Err(anyhow!("Gemini API error ({}): {}", status, text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("gemini response parse error: {}", e))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("gemini returned no candidates"))?;

        let joined: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if joined.trim().is_empty() {
            return Err(anyhow!(
                "gemini returned empty content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ));
        }
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Instruction;
    use serde_json::json;

    fn req() -> CompletionRequest {
        CompletionRequest {
            flow: "generate-app-prompt".into(),
            prompt_version: "v".into(),
            instruction: Instruction { system: "sys".into(), user: "todo app".into(), developer: None },
            schema: json!({ "type": "object" }),
        }
    }

    #[tokio::test]
    async fn joins_parts_of_first_candidate() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "gk")
            .match_body(mockito::Matcher::PartialJson(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let g = Gemini::new("gemini-test".into(), "gk".into(), server.url(), Duration::from_secs(5));
        assert_eq!(g.complete(&req()).await.unwrap(), r#"{"a":1}"#);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn safety_block_without_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
            .create_async()
            .await;

        let g = Gemini::new("gemini-test".into(), "gk".into(), server.url(), Duration::from_secs(5));
        let err = g.complete(&req()).await.unwrap_err().to_string();
        assert!(err.contains("SAFETY"));
    }

    #[tokio::test]
    async fn connection_error_does_not_carry_the_key() {
        let g = Gemini::new(
            "gemini-test".into(),
            "SECRET-KEY-123".into(),
            "http://127.0.0.1:9".into(),
            Duration::from_secs(5),
        );
        let err = format!("{:#}", g.complete(&req()).await.unwrap_err());
        assert!(err.contains("gemini request failed"), "{err}");
        assert!(!err.contains("SECRET-KEY-123"), "{err}");
    }
}
