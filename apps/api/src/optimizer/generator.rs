//! Content Generator: one rewrite request combining the prompt and the processed file.

use thiserror::Error;
use tracing::info;

use crate::genai_client::{ContentPart, GenAiError, GenerativeService};
use crate::optimizer::prompts::build_rewrite_prompt;
use crate::optimizer::upload::FileReference;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Remote(#[source] GenAiError),

    #[error("the response text was empty")]
    EmptyResponse,
}

/// Sends `instruction` plus the file reference and returns the model's raw text.
pub async fn generate(
    ai: &dyn GenerativeService,
    model: &str,
    instruction: &str,
    file: &FileReference,
) -> Result<String, GenerationError> {
    let parts = [
        ContentPart::Text(instruction.to_string()),
        ContentPart::FileData {
            mime_type: file.mime_type.clone(),
            file_uri: file.uri.clone(),
        },
    ];

    let text = ai
        .generate_content(model, &parts)
        .await
        .map_err(GenerationError::Remote)?
        .filter(|t| !t.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)?;

    info!("Model {} returned {} chars", model, text.len());
    Ok(text)
}

/// Builds the rewrite instruction for `job_description` and runs `generate`.
pub async fn generate_rewrite(
    ai: &dyn GenerativeService,
    model: &str,
    job_description: &str,
    file: &FileReference,
) -> Result<String, GenerationError> {
    let instruction = build_rewrite_prompt(job_description);
    generate(ai, model, &instruction, file).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGenAi;

    fn file() -> FileReference {
        FileReference {
            uri: "https://example.test/files/1".to_string(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_instruction_then_file() {
        let ai = FakeGenAi::new(vec![]).with_generation(Ok(Some("{\"name\":\"A\"}".to_string())));
        let text = generate(&ai, "gemini-test", "Rewrite", &file()).await.unwrap();
        assert_eq!(text, "{\"name\":\"A\"}");

        let calls = ai.generate_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "gemini-test");
        assert_eq!(
            calls[0].1,
            vec![
                ContentPart::Text("Rewrite".to_string()),
                ContentPart::FileData {
                    mime_type: "application/pdf".to_string(),
                    file_uri: "https://example.test/files/1".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_text_is_empty_response() {
        let ai = FakeGenAi::new(vec![]).with_generation(Ok(None));
        let err = generate(&ai, "m", "Rewrite", &file()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_whitespace_text_is_empty_response() {
        let ai = FakeGenAi::new(vec![]).with_generation(Ok(Some("  \n".to_string())));
        let err = generate(&ai, "m", "Rewrite", &file()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_retried_here() {
        let ai = FakeGenAi::new(vec![]).with_generation(Err(GenAiError::Api {
            status: 500,
            message: "boom".to_string(),
        }));
        let err = generate(&ai, "m", "Rewrite", &file()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Remote(_)));
        assert_eq!(ai.generate_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rewrite_prompt_carries_job_description() {
        let ai = FakeGenAi::new(vec![]).with_generation(Ok(Some("ok".to_string())));
        generate_rewrite(&ai, "m", "Staff Rust engineer", &file())
            .await
            .unwrap();
        let calls = ai.generate_calls();
        match &calls[0].1[0] {
            ContentPart::Text(prompt) => assert!(prompt.contains("Staff Rust engineer")),
            other => panic!("expected text part first, got {other:?}"),
        }
    }
}
