use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, trace, warn},
};

use crate::model::LlmProvider;

pub struct GeminiProvider {
    api_key: Secret<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: Secret<String>, model: String, base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, model, base_url)
    }

    /// Build a provider whose HTTP calls give up after `timeout`.
    pub fn with_timeout(
        api_key: Secret<String>,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, model, base_url))
    }

    pub fn with_client(
        client: reqwest::Client,
        api_key: Secret<String>,
        model: String,
        base_url: String,
    ) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

/// Request body for a single-turn `generateContent` call.
fn build_request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
        "generationConfig": {
            "maxOutputTokens": 8192,
        },
    })
}

/// Extract text content from Gemini response parts.
fn extract_text(parts: &[serde_json::Value]) -> Option<String> {
    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join(""))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let body = build_request_body(prompt);

        debug!(model = %self.model, prompt_len = prompt.len(), "gemini generate request");
        trace!(body = %body, "gemini request body");

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let http_resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = http_resp.status();
        if !status.is_success() {
            let body_text = http_resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body_text, "gemini API error");
            anyhow::bail!("Gemini API error HTTP {status}: {body_text}");
        }

        let resp = http_resp.json::<serde_json::Value>().await?;
        trace!(response = %resp, "gemini raw response");

        let parts = resp["candidates"][0]["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let Some(text) = extract_text(&parts) else {
            let finish_reason = resp["candidates"][0]["finishReason"]
                .as_str()
                .or_else(|| resp["promptFeedback"]["blockReason"].as_str())
                .unwrap_or("unknown");
            anyhow::bail!("Gemini returned no text (reason: {finish_reason})");
        };

        debug!(
            model = %self.model,
            input_tokens = resp["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0),
            output_tokens = resp["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0),
            "gemini generate complete"
        );

        Ok(text)
    }
}
