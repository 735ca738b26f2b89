//! In-memory fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::Config;
use crate::genai_client::{ContentPart, GenAiError, GenerativeService};
use crate::models::resume::{
    ContactInfo, EducationEntry, ExperienceEntry, ProjectEntry, ResumeRecord,
};
use crate::models::upload::{FileState, UploadHandle};
use crate::optimizer::clock::Sleeper;

pub fn test_config() -> Config {
    Config {
        gemini_api_key: "test-key".to_string(),
        gemini_model: "gemini-test".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        poll_interval_ms: 3000,
        poll_timeout_secs: 120,
        max_upload_bytes: 1024 * 1024,
        port: 0,
        rust_log: "info".to_string(),
    }
}

/// A fully populated handle named `files/resume-1` in the given state.
pub fn handle(state: FileState) -> UploadHandle {
    UploadHandle {
        name: Some("files/resume-1".to_string()),
        state,
        uri: Some("https://example.test/v1beta/files/resume-1".to_string()),
        mime_type: Some("application/pdf".to_string()),
        display_name: Some("cv.pdf".to_string()),
    }
}

pub fn sample_record() -> ResumeRecord {
    ResumeRecord {
        name: "Ada Lovelace".to_string(),
        title: "Backend Engineer".to_string(),
        contact: ContactInfo {
            email: "ada@example.com".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            linkedin: "linkedin.com/in/ada".to_string(),
            github: "github.com/ada".to_string(),
        },
        summary: "Backend engineer with eight years of Python and Django experience."
            .to_string(),
        skills: vec![
            "Python".to_string(),
            "Django".to_string(),
            "PostgreSQL".to_string(),
        ],
        experience: vec![ExperienceEntry {
            role: "Senior Software Engineer".to_string(),
            organization: "Analytical Engines Ltd".to_string(),
            duration: "2019 - Present".to_string(),
            achievements: vec![
                "Cut API latency by 40% by introducing query batching".to_string(),
                "Led migration of 12 services to Django 4".to_string(),
            ],
        }],
        education: vec![EducationEntry {
            degree: "BSc Mathematics".to_string(),
            institution: "University of London".to_string(),
            duration: "2011 - 2014".to_string(),
        }],
        projects: vec![ProjectEntry {
            name: "Difference Engine".to_string(),
            description: "Mechanical calculator for polynomial tables.".to_string(),
            technologies: vec!["Brass".to_string(), "Gears".to_string()],
        }],
    }
}

/// Scripted `GenerativeService`.
///
/// `get_file` replays `statuses` in order; once they run out it either repeats the last one
/// (`repeat_last_status`) or answers 404.
pub struct FakeGenAi {
    upload_result: Mutex<Option<Result<UploadHandle, GenAiError>>>,
    statuses: Mutex<VecDeque<UploadHandle>>,
    repeat_last: bool,
    status_latency: Option<Duration>,
    last_status: Mutex<Option<UploadHandle>>,
    generation: Mutex<Option<Result<Option<String>, GenAiError>>>,
    uploads: Mutex<Vec<String>>,
    status_checks: Mutex<usize>,
    generate_calls: Mutex<Vec<(String, Vec<ContentPart>)>>,
}

impl FakeGenAi {
    pub fn new(statuses: Vec<UploadHandle>) -> Self {
        Self {
            upload_result: Mutex::new(None),
            statuses: Mutex::new(statuses.into()),
            repeat_last: false,
            status_latency: None,
            last_status: Mutex::new(None),
            generation: Mutex::new(None),
            uploads: Mutex::new(Vec::new()),
            status_checks: Mutex::new(0),
            generate_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload_result(self, result: Result<UploadHandle, GenAiError>) -> Self {
        *self.upload_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_generation(self, result: Result<Option<String>, GenAiError>) -> Self {
        *self.generation.lock().unwrap() = Some(result);
        self
    }

    pub fn repeat_last_status(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Makes every `get_file` call take `latency` of tokio time.
    pub fn with_status_latency(mut self, latency: Duration) -> Self {
        self.status_latency = Some(latency);
        self
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn status_checks(&self) -> usize {
        *self.status_checks.lock().unwrap()
    }

    pub fn generate_calls(&self) -> Vec<(String, Vec<ContentPart>)> {
        self.generate_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeService for FakeGenAi {
    async fn upload_file(
        &self,
        _data: Bytes,
        _mime_type: &str,
        display_name: &str,
    ) -> Result<UploadHandle, GenAiError> {
        self.uploads.lock().unwrap().push(display_name.to_string());
        self.upload_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(handle(FileState::Processing)))
    }

    async fn get_file(&self, _name: &str) -> Result<UploadHandle, GenAiError> {
        if let Some(latency) = self.status_latency {
            tokio::time::sleep(latency).await;
        }
        *self.status_checks.lock().unwrap() += 1;
        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(status) => {
                *self.last_status.lock().unwrap() = Some(status.clone());
                Ok(status)
            }
            None if self.repeat_last => self
                .last_status
                .lock()
                .unwrap()
                .clone()
                .ok_or(GenAiError::Api {
                    status: 404,
                    message: "no status scripted".to_string(),
                }),
            None => Err(GenAiError::Api {
                status: 404,
                message: "no status scripted".to_string(),
            }),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: &[ContentPart],
    ) -> Result<Option<String>, GenAiError> {
        self.generate_calls
            .lock()
            .unwrap()
            .push((model.to_string(), parts.to_vec()));
        self.generation
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(None))
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
