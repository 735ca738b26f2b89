// Renderer: ResumeRecord → paginated PDF.
// Layout is computed as plain data first, then painted. Rendering is CPU-bound and
// runs inside tokio::task::spawn_blocking (see `render_document`).

pub mod font_metrics;
pub mod layout;
pub mod pdf;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::resume::ResumeRecord;
use crate::render::layout::{layout_record, PageConfig};
use crate::render::pdf::paint_pdf;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Document renderer boundary. Carried in `AppState` as `Arc<dyn DocumentRenderer>`.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, record: &ResumeRecord) -> Result<Vec<u8>, RenderError>;
}

/// Default renderer: single-column resume on US Letter.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    pub page_config: PageConfig,
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, record: &ResumeRecord) -> Result<Vec<u8>, RenderError> {
        let pages = layout_record(record, &self.page_config);
        debug!("Laid out resume for {:?} on {} page(s)", record.name, pages.len());

        let title = if record.name.trim().is_empty() {
            "Resume".to_string()
        } else {
            format!("{} - Resume", record.name.trim())
        };
        paint_pdf(&title, &pages, &self.page_config)
    }
}

/// Runs `renderer` on the blocking pool so layout and PDF encoding stay off the executor.
pub async fn render_document(
    renderer: Arc<dyn DocumentRenderer>,
    record: ResumeRecord,
) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render(&record))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))?
}
