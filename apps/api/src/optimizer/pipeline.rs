//! Resume optimization pipeline: orchestrates one user-initiated rewrite.
//!
//! Flow: upload → wait_until_ready → file_reference → generate_rewrite →
//!       extract_record → render_document.
//!
//! Every stage fails fast; nothing is retried or cached here. The HTTP client
//! underneath retries transient transport failures on its own.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::genai_client::GenerativeService;
use crate::models::resume::ResumeRecord;
use crate::optimizer::clock::Sleeper;
use crate::optimizer::extractor::{extract_record, ExtractionError};
use crate::optimizer::generator::{generate_rewrite, GenerationError};
use crate::optimizer::upload::{
    file_reference, upload, wait_until_ready, PollSettings, ProcessingError, UploadError,
};
use crate::render::{render_document, DocumentRenderer, RenderError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Collaborators injected into every pipeline run.
#[derive(Clone)]
pub struct PipelineDeps {
    pub ai: Arc<dyn GenerativeService>,
    pub sleeper: Arc<dyn Sleeper>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub poll: PollSettings,
}

/// The user's input for one run.
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub attempt: u64,
    pub request_id: Uuid,
    pub job_description: String,
    pub file: Bytes,
    pub mime_type: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct OptimizedResume {
    pub record: ResumeRecord,
    pub file_name: String,
    pub pdf: Vec<u8>,
}

/// Runs the full pipeline for one request.
pub async fn optimize_resume(
    deps: &PipelineDeps,
    settings: &PipelineSettings,
    request: OptimizeRequest,
) -> Result<OptimizedResume, PipelineError> {
    let span = info_span!(
        "optimize_resume",
        attempt = request.attempt,
        request_id = %request.request_id
    );
    run_stages(deps, settings, request).instrument(span).await
}

async fn run_stages(
    deps: &PipelineDeps,
    settings: &PipelineSettings,
    request: OptimizeRequest,
) -> Result<OptimizedResume, PipelineError> {
    let ai = deps.ai.as_ref();

    // Step 1: Upload
    info!("Uploading {} ({} bytes)", request.display_name, request.file.len());
    let handle = upload(ai, request.file, &request.mime_type, &request.display_name).await?;

    // Step 2: Wait for server-side processing
    let ready = wait_until_ready(ai, deps.sleeper.as_ref(), &handle, settings.poll).await?;
    let file = file_reference(&ready)?;

    // Step 3: Rewrite
    let raw_text = generate_rewrite(ai, &settings.model, &request.job_description, &file).await?;

    // Step 4: Extract + validate
    let record = extract_record(&raw_text)?;
    info!(
        "Extracted resume for {:?}: {} skills, {} jobs, {} projects",
        record.name,
        record.skills.len(),
        record.experience.len(),
        record.projects.len()
    );

    // Step 5: Render
    let pdf = render_document(deps.renderer.clone(), record.clone()).await?;
    let file_name = record.output_file_name();
    info!("Rendered {} ({} bytes)", file_name, pdf.len());

    Ok(OptimizedResume {
        record,
        file_name,
        pdf,
    })
}
