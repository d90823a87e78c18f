//! AI module for course summaries and questions.
//!
//! Uses the Gemini `generateContent` API to summarize a course's reviews and
//! to answer student questions from them. Every call is a single attempt;
//! failures become fixed, human-readable messages and never reach the
//! caller as errors.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coursepilot::ai::{AiClient, CourseAdvisor};
//!
//! let advisor = CourseAdvisor::from_client(AiClient::from_key(Some(key), model).ok());
//! let summary = advisor.summarize(course, &reviews).await;
//! ```

pub mod prompt;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::logs::{log_error, log_info};
use crate::error::{AiError, AiResult};
use crate::models::{CourseEntry, ReviewEntry};

pub use prompt::{question_context, question_prompt, summary_prompt};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fixed messages shown instead of generated text.
pub mod messages {
    pub const SUMMARY_EMPTY: &str = "Summary analysis not available.";
    pub const SUMMARY_FAILED: &str =
        "The AI is currently processing other academic data. Please check back later.";
    pub const ANSWER_EMPTY: &str = "No specific data found for this query.";
    pub const ANSWER_FAILED: &str = "Service temporarily unavailable.";
}

/// A text-generation backend: prompt in, plain text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generated text, possibly empty.
    async fn generate(&self, prompt: &str) -> AiResult<String>;

    fn model(&self) -> &str;
}

// =============================================================================
// Gemini client
// =============================================================================

/// Gemini REST client
#[derive(Clone)]
pub struct AiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

/// `generateContent` response structure
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
    #[serde(default)]
    text: String,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AiClient {
    /// Create a new client with explicit API key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Client from an optional key; a missing or blank key is an error.
    pub fn from_key(api_key: Option<&str>, model: &str) -> AiResult<Self> {
        match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Self::new(key.to_string()).with_model(model)),
            _ => Err(AiError::MissingApiKey),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }
}

#[async_trait]
impl TextGenerator for AiClient {
    async fn generate(&self, prompt: &str) -> AiResult<String> {
        log_info(format!("📡 Calling Gemini ({})", self.model));

        let request_body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorBody>(&body) {
                return Err(AiError::ApiError(error.error.message));
            }
            return Err(AiError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        parse_generated_text(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Concatenate the text parts of the first candidate. No candidate (e.g. a
/// blocked prompt) is an empty answer, not an error.
fn parse_generated_text(body: &str) -> AiResult<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AiError::InvalidJson(e.to_string()))?;

    Ok(response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default())
}

// =============================================================================
// Advisor
// =============================================================================

/// Remove markdown emphasis and header characters the model may emit anyway.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '*' && *c != '#')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Course summaries and Q&A with fixed fallback messages.
///
/// Without a generator (no API key) every call answers with the failure
/// message.
#[derive(Clone, Default)]
pub struct CourseAdvisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl CourseAdvisor {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn from_client(client: Option<AiClient>) -> Self {
        Self::new(client.map(|c| Arc::new(c) as Arc<dyn TextGenerator>))
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn summarize(&self, course: &CourseEntry, reviews: &[&ReviewEntry]) -> String {
        let prompt = summary_prompt(course, reviews);
        self.complete(&prompt, messages::SUMMARY_EMPTY, messages::SUMMARY_FAILED)
            .await
    }

    pub async fn ask(&self, question: &str, course: &CourseEntry, reviews: &[&ReviewEntry]) -> String {
        let prompt = question_prompt(question, course, reviews);
        self.complete(&prompt, messages::ANSWER_EMPTY, messages::ANSWER_FAILED)
            .await
    }

    async fn complete(&self, prompt: &str, when_empty: &str, when_failed: &str) -> String {
        let Some(generator) = &self.generator else {
            log_error(format!("Gemini Error: {}", AiError::MissingApiKey));
            return when_failed.to_string();
        };

        match generator.generate(prompt).await {
            Ok(text) => match sanitize(&text) {
                clean if clean.is_empty() => when_empty.to_string(),
                clean => clean,
            },
            Err(e) => {
                log_error(format!("Gemini Error: {}", e));
                when_failed.to_string()
            }
        }
    }
}
