use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the LLM profile and how many keys are loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let executor = state.pipeline.executor();
    let selection = executor.selection();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screener-api",
        "provider": selection.provider.to_string(),
        "model": selection.model,
        "keys_loaded": executor.key_pool().total_keys()
    }))
}
