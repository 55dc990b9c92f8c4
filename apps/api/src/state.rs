use std::sync::Arc;

use crate::screening::pipeline::ScreeningPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScreeningPipeline>,
}
