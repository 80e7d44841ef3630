use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::http::HttpTransport;
use super::{normalize, prompts, report, Attachment, ExtractError, InputKind, ReceiptAi};
use crate::models::{ReceiptRecord, SavedReceipt};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub(crate) const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini `generateContent` client.
#[derive(Debug)]
pub(crate) struct GeminiClient<T: HttpTransport> {
    transport: T,
    api_key: String,
    model: String,
    base_url: String,
}

impl<T: HttpTransport> GeminiClient<T> {
    pub(crate) fn new(transport: T, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(transport, api_key, model, DEFAULT_GEMINI_BASE_URL)
    }

    pub(crate) fn with_base_url(
        transport: T,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            api_key: api_key.into(),
            model: model.into(),
            base_url,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn extraction_body(kind: InputKind, attachment: &Attachment, today: NaiveDate) -> serde_json::Value {
        let today = today.format("%Y-%m-%d").to_string();
        let (prompt, schema) = match kind {
            InputKind::Image => (prompts::receipt_prompt(), prompts::response_schema(None)),
            InputKind::Voice => (
                prompts::voice_prompt(&today),
                prompts::response_schema(Some(&today)),
            ),
        };
        serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inlineData": {
                            "mimeType": attachment.mime_type,
                            "data": attachment.to_base64(),
                        }
                    }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        })
    }

    /// Extraction with an explicit "today", used for the voice date default.
    pub(crate) async fn extract_on(
        &self,
        kind: InputKind,
        attachment: &Attachment,
        today: NaiveDate,
    ) -> Result<ReceiptRecord, ExtractError> {
        let body = Self::extraction_body(kind, attachment, today);
        tracing::info!(%kind, model = %self.model, bytes = attachment.data.len(), "requesting extraction");
        let text = self.generate(&body).await?;
        normalize(&text, kind, today)
    }

    async fn generate(&self, body: &serde_json::Value) -> Result<String, ExtractError> {
        let url = self.generate_url();
        let headers = vec![("x-goog-api-key", self.api_key.as_str())];

        let value = match self.transport.post_json(&url, headers, body).await {
            Ok(v) => v,
            Err(e) => {
                if let ExtractError::Transport { detail } = &e {
                    tracing::error!(error = %detail, "Gemini request failed");
                }
                return Err(e);
            }
        };

        let response: GenerateResponse = serde_json::from_value(value).map_err(|e| {
            tracing::error!(error = %e, "unexpected Gemini response shape");
            ExtractError::transport(format!("unexpected response shape: {e}"))
        })?;
        Ok(response.text())
    }
}

#[async_trait]
impl<T: HttpTransport> ReceiptAi for GeminiClient<T> {
    async fn extract(
        &self,
        kind: InputKind,
        attachment: &Attachment,
    ) -> Result<ReceiptRecord, ExtractError> {
        self.extract_on(kind, attachment, Local::now().date_naive()).await
    }

    async fn analyze(&self, receipts: &[SavedReceipt], query: &str) -> Result<String, ExtractError> {
        let data = report::format_for_analysis(receipts);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompts::analysis_prompt(query, &data) }] }]
        });
        tracing::info!(receipts = receipts.len(), model = %self.model, "requesting analysis");
        let text = self.generate(&body).await?;
        if text.trim().is_empty() {
            tracing::warn!("Gemini returned an empty analysis");
            return Err(ExtractError::transport("empty analysis"));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate; empty if there are none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
