//! GenAI Client: the single point of entry for all Gemini API calls in Resumex.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini REST API directly.
//! The optimizer only sees the `GenerativeService` trait, so tests swap in a fake.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::upload::{FileState, UploadHandle};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Total attempts per request, the first one included.
const MAX_ATTEMPTS: u32 = 3;
/// Backoff before the second attempt; doubles for each further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Upload session was not opened: response carried no upload URL")]
    MissingUploadUrl,
}

impl GenAiError {
    /// Transport failures, 429 and 5xx are worth another attempt; everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenAiError::Http(e) => !e.is_decode() && !e.is_builder(),
            GenAiError::Api { status, .. } => *status == 429 || *status >= 500,
            GenAiError::Parse(_) | GenAiError::MissingUploadUrl => false,
        }
    }
}

/// One element of a `generateContent` request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    FileData { mime_type: String, file_uri: String },
}

/// The three remote operations the resume pipeline depends on.
///
/// Carried in `AppState` as `Arc<dyn GenerativeService>`.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    async fn upload_file(
        &self,
        data: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadHandle, GenAiError>;

    async fn get_file(&self, name: &str) -> Result<UploadHandle, GenAiError>;

    /// Returns the concatenated text of the first candidate, if any.
    async fn generate_content(
        &self,
        model: &str,
        parts: &[ContentPart],
    ) -> Result<Option<String>, GenAiError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StartUploadRequest<'a> {
    file: StartUploadFile<'a>,
}

#[derive(Debug, Serialize)]
struct StartUploadFile<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: RemoteFile,
}

/// File resource as returned by the Files API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: Option<String>,
    display_name: Option<String>,
    mime_type: Option<String>,
    uri: Option<String>,
    state: Option<String>,
}

impl From<RemoteFile> for UploadHandle {
    fn from(file: RemoteFile) -> Self {
        UploadHandle {
            name: file.name,
            state: FileState::from_wire(file.state.as_deref()),
            uri: file.uri,
            mime_type: file.mime_type,
            display_name: file.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileDataRef<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDataRef<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

impl<'a> From<&'a ContentPart> for RequestPart<'a> {
    fn from(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => RequestPart::Text { text },
            ContentPart::FileData {
                mime_type,
                file_uri,
            } => RequestPart::File {
                file_data: FileDataRef {
                    mime_type,
                    file_uri,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Joins every text part of the first candidate. `None` when there is no text at all.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini REST client. Constructed once in `main` from `Config` and shared via `Arc`.
/// Retries 429, 5xx and transport errors with exponential backoff.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_base_delay: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, GenAiError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Sends the request built by `build`, rebuilding it for every attempt.
    ///
    /// Retryable failures are attempted again up to `MAX_ATTEMPTS` in total; the last
    /// failure is returned once attempts run out.
    async fn send_with_retry<F>(&self, operation: &str, build: F) -> Result<Response, GenAiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;

        loop {
            let result = match build().header("x-goog-api-key", &self.api_key).send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(GenAiError::Http(e)),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    warn!(
                        "{} attempt {} failed ({}), retrying after {}ms...",
                        operation,
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Delay after failed attempt number `attempt` (1-based): base, 2 × base, 4 × base, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt.saturating_sub(1))
}

async fn check_status(response: Response) -> Result<Response, GenAiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(GenAiError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl GenerativeService for GeminiClient {
    /// Resumable upload: open a session, then send the bytes and finalize in one call.
    async fn upload_file(
        &self,
        data: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadHandle, GenAiError> {
        let start_url = format!("{}/upload/v1beta/files", self.base_url);
        let start_body = StartUploadRequest {
            file: StartUploadFile { display_name },
        };
        let content_length = data.len().to_string();

        let session = self
            .send_with_retry("upload start", || {
                self.client
                    .post(&start_url)
                    .header("X-Goog-Upload-Protocol", "resumable")
                    .header("X-Goog-Upload-Command", "start")
                    .header("X-Goog-Upload-Header-Content-Length", &content_length)
                    .header("X-Goog-Upload-Header-Content-Type", mime_type)
                    .json(&start_body)
            })
            .await?;

        let upload_url = session
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(GenAiError::MissingUploadUrl)?;

        let response = self
            .send_with_retry("upload finalize", || {
                self.client
                    .post(&upload_url)
                    .header("X-Goog-Upload-Offset", "0")
                    .header("X-Goog-Upload-Command", "upload, finalize")
                    .body(data.clone())
            })
            .await?;

        let body = response.text().await?;
        let uploaded: UploadFileResponse = serde_json::from_str(&body)?;
        debug!(
            "Uploaded {} ({} bytes) as {:?}",
            display_name,
            data.len(),
            uploaded.file.name
        );
        Ok(uploaded.file.into())
    }

    async fn get_file(&self, name: &str) -> Result<UploadHandle, GenAiError> {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let response = self
            .send_with_retry("file status", || self.client.get(&url))
            .await?;
        let body = response.text().await?;
        let file: RemoteFile = serde_json::from_str(&body)?;
        Ok(file.into())
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: &[ContentPart],
    ) -> Result<Option<String>, GenAiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let request_body = build_generate_request(parts);

        let response = self
            .send_with_retry("generateContent", || {
                self.client.post(&url).json(&request_body)
            })
            .await?;

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "generateContent succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed.text())
    }
}

fn build_generate_request(parts: &[ContentPart]) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: parts.iter().map(RequestPart::from).collect(),
        }],
    }
}
