//! Validation of the user's job description and resume file.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC: &str = "application/msword";
pub const TEXT: &str = "text/plain";

const ACCEPTED_MIME_TYPES: [&str; 4] = [PDF, DOCX, DOC, TEXT];

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("job_description must not be empty")]
    EmptyJobDescription,

    #[error("resume file is empty")]
    EmptyFile,

    #[error("resume file is {size} bytes; the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported resume type {0:?}; upload a PDF, DOCX, DOC or TXT file")]
    UnsupportedType(String),
}

/// A resume file that passed validation.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Resolves the MIME type of an uploaded part.
///
/// A declared content type wins when it is on the accepted list (parameters such as
/// `; charset=utf-8` are ignored). Otherwise the type is inferred from the extension.
pub fn resolve_mime_type(content_type: Option<&str>, file_name: &str) -> Option<&'static str> {
    if let Some(declared) = content_type {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if let Some(known) = ACCEPTED_MIME_TYPES.iter().find(|m| **m == essence) {
            return Some(known);
        }
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)?;

    match extension.as_str() {
        "pdf" => Some(PDF),
        "docx" => Some(DOCX),
        "doc" => Some(DOC),
        "txt" => Some(TEXT),
        _ => None,
    }
}

/// Trims the job description and rejects it when nothing is left.
pub fn validate_job_description(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyJobDescription);
    }
    Ok(trimmed.to_string())
}

/// Checks size and type of an uploaded resume.
pub fn validate_resume_file(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
    max_bytes: usize,
) -> Result<ResumeFile, InputError> {
    let file_name = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("resume")
        .to_string();

    if data.is_empty() {
        return Err(InputError::EmptyFile);
    }
    if data.len() > max_bytes {
        return Err(InputError::TooLarge {
            size: data.len(),
            limit: max_bytes,
        });
    }

    let mime_type = resolve_mime_type(content_type, &file_name).ok_or_else(|| {
        InputError::UnsupportedType(content_type.unwrap_or("unknown").to_string())
    })?;

    Ok(ResumeFile {
        file_name,
        mime_type: mime_type.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_is_used_when_accepted() {
        assert_eq!(resolve_mime_type(Some("application/pdf"), "cv.bin"), Some(PDF));
        assert_eq!(
            resolve_mime_type(Some("Text/Plain; charset=utf-8"), "cv"),
            Some(TEXT)
        );
    }

    #[test]
    fn test_octet_stream_falls_back_to_extension() {
        assert_eq!(
            resolve_mime_type(Some("application/octet-stream"), "My CV.DOCX"),
            Some(DOCX)
        );
        assert_eq!(resolve_mime_type(None, "old.doc"), Some(DOC));
    }

    #[test]
    fn test_unknown_type_and_extension_is_rejected() {
        assert_eq!(resolve_mime_type(Some("image/png"), "photo.png"), None);
        assert_eq!(resolve_mime_type(None, "no_extension"), None);
    }

    #[test]
    fn test_job_description_is_trimmed() {
        assert_eq!(
            validate_job_description("  Rust engineer \n").unwrap(),
            "Rust engineer"
        );
        assert_eq!(
            validate_job_description(" \t\n"),
            Err(InputError::EmptyJobDescription)
        );
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let err = validate_resume_file(Some("cv.pdf"), Some(PDF), Bytes::new(), 100).unwrap_err();
        assert_eq!(err, InputError::EmptyFile);
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let data = Bytes::from(vec![b'x'; 101]);
        let err = validate_resume_file(Some("cv.pdf"), Some(PDF), data, 100).unwrap_err();
        assert_eq!(err, InputError::TooLarge { size: 101, limit: 100 });
    }

    #[test]
    fn test_unsupported_type_names_the_declared_type() {
        let err = validate_resume_file(
            Some("photo.png"),
            Some("image/png"),
            Bytes::from_static(b"png"),
            100,
        )
        .unwrap_err();
        assert_eq!(err, InputError::UnsupportedType("image/png".to_string()));
    }

    #[test]
    fn test_valid_file_keeps_name_and_resolved_type() {
        let file = validate_resume_file(
            Some("cv.txt"),
            None,
            Bytes::from_static(b"Ada Lovelace"),
            100,
        )
        .unwrap();
        assert_eq!(file.file_name, "cv.txt");
        assert_eq!(file.mime_type, TEXT);
    }

    #[test]
    fn test_missing_file_name_gets_placeholder() {
        let file =
            validate_resume_file(None, Some(PDF), Bytes::from_static(b"%PDF"), 100).unwrap();
        assert_eq!(file.file_name, "resume");
    }
}
