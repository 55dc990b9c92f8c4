// Resume screening: parse a resume, then score it against job requirements.
// All LLM calls go through llm_client's CallExecutor.

pub mod batch;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod text_extract;
