use std::sync::Arc;

use crate::config::Config;
use crate::genai_client::GenerativeService;
use crate::optimizer::clock::Sleeper;
use crate::optimizer::latest::LatestResumeStore;
use crate::optimizer::pipeline::{PipelineDeps, PipelineSettings};
use crate::optimizer::upload::PollSettings;
use crate::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Remote AI service. `GeminiClient` in production, a fake in tests.
    pub ai: Arc<dyn GenerativeService>,
    pub sleeper: Arc<dyn Sleeper>,
    pub renderer: Arc<dyn DocumentRenderer>,
    /// Last successful rewrite, for re-download.
    pub latest: LatestResumeStore,
}

impl AppState {
    pub fn pipeline_deps(&self) -> PipelineDeps {
        PipelineDeps {
            ai: self.ai.clone(),
            sleeper: self.sleeper.clone(),
            renderer: self.renderer.clone(),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            model: self.config.gemini_model.clone(),
            poll: PollSettings {
                interval: self.config.poll_interval(),
                timeout: self.config.poll_timeout(),
            },
        }
    }
}
