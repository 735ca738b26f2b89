//! Axum route handlers for the Resume API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::optimizer::extractor::parse_record;
use crate::optimizer::input::{validate_job_description, validate_resume_file, ResumeFile};
use crate::optimizer::latest::LatestResume;
use crate::optimizer::pipeline::{optimize_resume, OptimizeRequest};
use crate::render::render_document;
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUME_FIELD: &str = "resume";

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/optimize
///
/// Multipart fields: `job_description` (text) and `resume` (file).
/// Responds with the rewritten resume as a PDF attachment.
pub async fn handle_optimize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let max_bytes = state.config.max_upload_bytes;
    let mut job_description: Option<String> = None;
    let mut resume: Option<ResumeFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            JOB_DESCRIPTION_FIELD => {
                let text = field.text().await.map_err(multipart_error)?;
                job_description = Some(validate_job_description(&text)?);
            }
            RESUME_FIELD => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                resume = Some(validate_resume_file(
                    file_name.as_deref(),
                    content_type.as_deref(),
                    data,
                    max_bytes,
                )?);
            }
            _ => {
                // Drain unknown parts so the stream can advance.
                field.bytes().await.map_err(multipart_error)?;
            }
        }
    }

    let job_description = job_description
        .ok_or_else(|| AppError::Validation(format!("missing '{JOB_DESCRIPTION_FIELD}' field")))?;
    let resume =
        resume.ok_or_else(|| AppError::Validation(format!("missing '{RESUME_FIELD}' field")))?;

    let attempt = state.latest.begin_attempt();
    let request_id = Uuid::new_v4();
    info!(
        "Optimize attempt {} ({}) for {} [{}]",
        attempt, request_id, resume.file_name, resume.mime_type
    );

    let request = OptimizeRequest {
        attempt,
        request_id,
        job_description,
        file: resume.data,
        mime_type: resume.mime_type,
        display_name: resume.file_name,
    };
    let optimized =
        optimize_resume(&state.pipeline_deps(), &state.pipeline_settings(), request).await?;

    let stored = state
        .latest
        .store(LatestResume {
            attempt,
            request_id,
            file_name: optimized.file_name.clone(),
            generated_at: Utc::now(),
            record: optimized.record,
        })
        .await;
    if !stored {
        info!("Attempt {} finished after a newer one; latest resume kept", attempt);
    }

    Ok(pdf_response(&optimized.file_name, optimized.pdf))
}

/// GET /api/v1/resumes/latest
pub async fn handle_get_latest(
    State(state): State<AppState>,
) -> Result<Json<LatestResume>, AppError> {
    state
        .latest
        .get()
        .await
        .map(Json)
        .ok_or_else(no_resume_yet)
}

/// GET /api/v1/resumes/latest/pdf
pub async fn handle_get_latest_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    let latest = state.latest.get().await.ok_or_else(no_resume_yet)?;
    let pdf = render_document(state.renderer.clone(), latest.record).await?;
    Ok(pdf_response(&latest.file_name, pdf))
}

/// POST /api/v1/resumes/render
///
/// Renders a caller-supplied resume JSON with the same validation applied to model output.
pub async fn handle_render(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let text = std::str::from_utf8(&body)
        .map_err(|_| AppError::Validation("request body must be UTF-8 JSON".to_string()))?;
    let record = parse_record(text)?;
    let file_name = record.output_file_name();
    let pdf = render_document(state.renderer.clone(), record).await?;
    Ok(pdf_response(&file_name, pdf))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn pdf_response(file_name: &str, pdf: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(file_name)),
        ],
        pdf,
    )
        .into_response()
}

/// `filename` carries an ASCII fallback; `filename*` carries the exact UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, ATTR_CHAR)
    )
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
    }
}

fn no_resume_yet() -> AppError {
    AppError::NotFound("no resume has been generated yet".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name_is_used_in_both_parameters() {
        assert_eq!(
            content_disposition("Ada_Lovelace_Resume.pdf"),
            "attachment; filename=\"Ada_Lovelace_Resume.pdf\"; \
             filename*=UTF-8''Ada_Lovelace_Resume.pdf"
        );
    }

    #[test]
    fn test_non_ascii_name_is_percent_encoded_with_ascii_fallback() {
        assert_eq!(
            content_disposition("Zoë_Šimková_Resume.pdf"),
            "attachment; filename=\"Zo__imkov__Resume.pdf\"; \
             filename*=UTF-8''Zo%C3%AB_%C5%A0imkov%C3%A1_Resume.pdf"
        );
    }

    #[test]
    fn test_header_value_stays_ascii() {
        let value = content_disposition("Łukasz Ó'Brien_Resume.pdf");
        assert!(value.is_ascii());
        assert!(axum::http::HeaderValue::from_str(&value).is_ok());
    }
}
