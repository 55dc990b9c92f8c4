//! Screening pipeline — resume parsing followed by candidate analysis.
//!
//! Parsing → Analysis, never back. A parsing failure ends the run; an analysis
//! failure ends it with the parsed resume attached for partial use.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::llm_client::{CallExecutor, StructuredResult};
use crate::screening::models::{AnalysisView, JobRequirements, ParsedResumeView};
use crate::screening::prompts::{candidate_analysis_prompt, resume_parse_prompt};

/// Which stage produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parsing,
    Analysis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineResult {
    Success {
        parsed_resume: Map<String, Value>,
        analysis: Map<String, Value>,
    },
    ParsingFailed {
        error: String,
    },
    AnalysisFailed {
        error: String,
        parsed_data: Map<String, Value>,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineResult::Success { .. } => None,
            PipelineResult::ParsingFailed { .. } => Some(Stage::Parsing),
            PipelineResult::AnalysisFailed { .. } => Some(Stage::Analysis),
        }
    }
}

#[derive(Serialize)]
struct PipelineResultBody<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsed_data: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsed_resume: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<&'a Map<String, Value>>,
}

impl Serialize for PipelineResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = PipelineResultBody {
            status: "error",
            stage: self.stage(),
            error: None,
            parsed_data: None,
            parsed_resume: None,
            analysis: None,
        };
        match self {
            PipelineResult::Success {
                parsed_resume,
                analysis,
            } => {
                body.status = "success";
                body.parsed_resume = Some(parsed_resume);
                body.analysis = Some(analysis);
            }
            PipelineResult::ParsingFailed { error } => body.error = Some(error),
            PipelineResult::AnalysisFailed { error, parsed_data } => {
                body.error = Some(error);
                body.parsed_data = Some(parsed_data);
            }
        }
        body.serialize(serializer)
    }
}

pub struct ScreeningPipeline {
    executor: CallExecutor,
    max_attempts: u32,
    /// Held for a whole run so resumes are processed one at a time.
    run_gate: Mutex<()>,
}

impl ScreeningPipeline {
    pub fn new(executor: CallExecutor, max_attempts: u32) -> Self {
        Self {
            executor,
            max_attempts,
            run_gate: Mutex::new(()),
        }
    }

    pub fn executor(&self) -> &CallExecutor {
        &self.executor
    }

    /// Runs both stages for one resume.
    pub async fn run(&self, resume_text: &str, job: &JobRequirements) -> PipelineResult {
        let _guard = self.run_gate.lock().await;

        info!(
            "Resume parsing started ({} characters)",
            resume_text.chars().count()
        );
        let parsed_resume = match self.parse_stage(resume_text).await {
            StructuredResult::Success(payload) => payload,
            StructuredResult::Error { error, .. } => {
                error!("Resume parsing failed: {error}");
                return PipelineResult::ParsingFailed {
                    error: format!("Resume parsing failed: {error}"),
                };
            }
        };

        let view = ParsedResumeView(&parsed_resume);
        info!(
            "Resume parsed: name={}, email={}, skills={}",
            view.name(),
            view.email(),
            view.skills().len()
        );
        info!(
            "Candidate analysis started for job '{}' (required skills: {})",
            job.job_title_or_default(),
            job.required_skills_or_default()
        );

        let prompt = candidate_analysis_prompt(&parsed_resume, job);
        match self.executor.execute(&prompt, self.max_attempts).await {
            StructuredResult::Success(analysis) => {
                let view = AnalysisView(&analysis);
                info!(
                    "Candidate analysis completed: confidence={}%, shortlisted={}, recommendation={}",
                    view.confidence_score(),
                    view.shortlisted(),
                    view.recommendation()
                );
                PipelineResult::Success {
                    parsed_resume,
                    analysis,
                }
            }
            StructuredResult::Error { error, .. } => {
                error!("Candidate analysis failed: {error}");
                PipelineResult::AnalysisFailed {
                    error: format!("Analysis failed: {error}"),
                    parsed_data: parsed_resume,
                }
            }
        }
    }

    /// Runs only the parsing stage. Used by the resume filter.
    pub async fn parse_resume(&self, resume_text: &str) -> StructuredResult {
        let _guard = self.run_gate.lock().await;
        self.parse_stage(resume_text).await
    }

    async fn parse_stage(&self, resume_text: &str) -> StructuredResult {
        let prompt = resume_parse_prompt(resume_text);
        self.executor.execute(&prompt, self.max_attempts).await
    }
}
