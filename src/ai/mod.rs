mod gemini;
mod http;
mod normalize;
mod prompts;
mod report;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use std::path::Path;
use thiserror::Error;

use crate::models::{ReceiptRecord, SavedReceipt};

pub(crate) use gemini::{GeminiClient, DEFAULT_MODEL};
pub(crate) use http::ReqwestTransport;
use normalize::normalize;

#[cfg(test)]
use mockall::automock;

/// What the user handed us to extract from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputKind {
    Image,
    Voice,
}

impl InputKind {
    fn invalid_format_message(&self) -> &'static str {
        match self {
            Self::Image => "The AI returned an invalid format. This can happen with very unusual receipts. Please try a different image or enter the details manually.",
            Self::Voice => "The AI returned an invalid format from your voice input. Please try speaking more clearly or enter the details manually.",
        }
    }

    fn nothing_found_message(&self) -> &'static str {
        match self {
            Self::Image => "Could not extract any receipt details. The image may be blurry, unclear, or not a valid receipt. Please try again with a clearer picture.",
            Self::Voice => "I couldn't understand the transaction details from your voice recording. Please try again, stating the item, amount, and date clearly.",
        }
    }

    fn mime_prefix(&self) -> &'static str {
        match self {
            Self::Image => "image/",
            Self::Voice => "audio/",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "receipt image"),
            Self::Voice => write!(f, "voice recording"),
        }
    }
}

/// Failures of an AI-backed action. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ExtractError {
    #[error("You have reached your monthly limit of {limit} AI credits.")]
    QuotaExceeded { limit: u32 },

    #[error("{}", .kind.invalid_format_message())]
    InvalidFormat { kind: InputKind },

    #[error("{}", .kind.nothing_found_message())]
    NothingFound { kind: InputKind },

    /// `detail` goes to the log only.
    #[error("An unexpected error occurred while contacting the AI service. Please check your connection and try again.")]
    Transport { detail: String },

    #[error("AI features are not configured. Set SNAPLEDGER_AI__API_KEY (or GEMINI_API_KEY) and restart.")]
    NotConfigured,
}

impl ExtractError {
    pub(crate) fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }
}

/// Raw media plus its MIME type, ready to inline into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attachment {
    pub(crate) mime_type: String,
    pub(crate) data: Vec<u8>,
}

impl Attachment {
    pub(crate) fn from_path(path: &Path, kind: InputKind) -> Result<Self> {
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        if !mime_type.starts_with(kind.mime_prefix()) {
            anyhow::bail!(
                "{} does not look like a {kind} (detected {mime_type})",
                path.display()
            );
        }
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if data.is_empty() {
            anyhow::bail!("{} is empty", path.display());
        }
        Ok(Self { mime_type, data })
    }

    pub(crate) fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// The remote model that reads receipts and answers spending questions.
#[cfg_attr(test, automock)]
#[async_trait]
pub(crate) trait ReceiptAi: Send + Sync {
    /// Extract and normalize receipt fields from an image or a recording.
    async fn extract(
        &self,
        kind: InputKind,
        attachment: &Attachment,
    ) -> Result<ReceiptRecord, ExtractError>;

    /// Free-text analysis of the saved receipts, shown as-is.
    async fn analyze(&self, receipts: &[SavedReceipt], query: &str) -> Result<String, ExtractError>;
}

/// Stand-in used when no API key is configured.
#[derive(Debug, Default)]
pub(crate) struct Unconfigured;

#[async_trait]
impl ReceiptAi for Unconfigured {
    async fn extract(
        &self,
        _kind: InputKind,
        _attachment: &Attachment,
    ) -> Result<ReceiptRecord, ExtractError> {
        Err(ExtractError::NotConfigured)
    }

    async fn analyze(&self, _receipts: &[SavedReceipt], _query: &str) -> Result<String, ExtractError> {
        Err(ExtractError::NotConfigured)
    }
}
