//! Upload & Poll: hands the resume file to the AI service and waits until it is usable.
//!
//! Flow: upload → poll once → (sleep, poll)* while pending → Ready | error.
//! The loop aborts as soon as a handle comes back without the identifier needed for the
//! next query, when the service reports failure, or when the waiting budget runs out.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::genai_client::{GenAiError, GenerativeService};
use crate::models::upload::{FileState, UploadHandle};
use crate::optimizer::clock::Sleeper;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("remote service rejected the upload: {0}")]
    Remote(#[source] GenAiError),

    #[error("file upload failed, no name was returned")]
    MissingName,
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("status check failed: {0}")]
    Remote(#[source] GenAiError),

    #[error("file name missing during processing status check")]
    MissingName,

    #[error("file processing failed on the server ({name})")]
    Failed { name: String },

    #[error("file was still processing after {waited_secs}s")]
    TimedOut { waited_secs: u64 },

    #[error("uploaded file URI or MIME type is missing")]
    MissingFileReference,
}

/// Timing knobs for `wait_until_ready`.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound on the time spent waiting: sleeps plus the status queries themselves.
    pub timeout: Duration,
}

/// Floor applied to `PollSettings::interval` so a zero interval cannot spin.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(120),
        }
    }
}

/// A processed file the generator can reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    pub uri: String,
    pub mime_type: String,
}

/// Sends the file to the remote service. The returned handle always carries a name.
pub async fn upload(
    ai: &dyn GenerativeService,
    data: Bytes,
    mime_type: &str,
    display_name: &str,
) -> Result<UploadHandle, UploadError> {
    let handle = ai
        .upload_file(data, mime_type, display_name)
        .await
        .map_err(UploadError::Remote)?;

    if handle.name.as_deref().map_or(true, str::is_empty) {
        return Err(UploadError::MissingName);
    }

    info!("Uploaded {} as {:?}", display_name, handle.name);
    Ok(handle)
}

/// Queries the current state of `handle`.
pub async fn poll(
    ai: &dyn GenerativeService,
    handle: &UploadHandle,
) -> Result<UploadHandle, ProcessingError> {
    let name = handle
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(ProcessingError::MissingName)?;

    ai.get_file(name).await.map_err(ProcessingError::Remote)
}

/// Polls until the file leaves the pending states.
///
/// The first query happens immediately; each further query is preceded by one
/// `settings.interval` sleep (at least `MIN_POLL_INTERVAL`). Time spent inside the
/// queries counts toward `settings.timeout` as well. Returns the Ready handle.
pub async fn wait_until_ready(
    ai: &dyn GenerativeService,
    sleeper: &dyn Sleeper,
    handle: &UploadHandle,
    settings: PollSettings,
) -> Result<UploadHandle, ProcessingError> {
    let interval = settings.interval.max(MIN_POLL_INTERVAL);
    let mut slept = Duration::ZERO;
    let mut polling = Duration::ZERO;

    let started = Instant::now();
    let mut current = poll(ai, handle).await?;
    polling += started.elapsed();

    while current.state.is_pending() {
        let waited = slept + polling;
        if waited + interval > settings.timeout {
            warn!(
                "Giving up on {:?} after waiting {}s",
                current.name,
                waited.as_secs()
            );
            return Err(ProcessingError::TimedOut {
                waited_secs: waited.as_secs(),
            });
        }

        debug!("{:?} is {:?}, checking again shortly", current.name, current.state);
        sleeper.sleep(interval).await;
        slept += interval;

        let started = Instant::now();
        current = poll(ai, &current).await?;
        polling += started.elapsed();
    }

    let waited = slept + polling;
    match current.state {
        FileState::Failed => Err(ProcessingError::Failed {
            name: current.name.unwrap_or_default(),
        }),
        _ => {
            info!("{:?} is ready after {}s of waiting", current.name, waited.as_secs());
            Ok(current)
        }
    }
}

/// Extracts the URI and MIME type the generator needs from a Ready handle.
pub fn file_reference(handle: &UploadHandle) -> Result<FileReference, ProcessingError> {
    match (&handle.uri, &handle.mime_type) {
        (Some(uri), Some(mime_type)) if !uri.is_empty() && !mime_type.is_empty() => {
            Ok(FileReference {
                uri: uri.clone(),
                mime_type: mime_type.clone(),
            })
        }
        _ => Err(ProcessingError::MissingFileReference),
    }
}
