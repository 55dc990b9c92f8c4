//! Batch processing: full screening for many resumes, and the resume filter
//! (parse-only extraction into a flat table). Resumes are always processed in
//! order, one at a time.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::StructuredResult;
use crate::screening::models::{JobRequirements, ParsedResumeView};
use crate::screening::pipeline::{PipelineResult, ScreeningPipeline};

const EXTRACTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeDocument {
    pub file_name: String,
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct ScreeningOutcome {
    pub file_name: String,
    pub result: PipelineResult,
}

/// One row of the resume-filter table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRow {
    pub file_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub experience_years: f64,
    pub skills: String,
    pub education: String,
    pub summary: String,
    pub extracted_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
    pub average_experience_years: f64,
    pub total_skills: usize,
    pub with_email: usize,
}

#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    pub rows: Vec<ExtractedRow>,
    pub failures: Vec<ExtractionFailure>,
    pub summary: ExtractionSummary,
}

pub async fn screen_batch(
    pipeline: &ScreeningPipeline,
    resumes: Vec<ResumeDocument>,
    job: &JobRequirements,
) -> Vec<ScreeningOutcome> {
    let total = resumes.len();
    let mut outcomes = Vec::with_capacity(total);

    for (idx, doc) in resumes.into_iter().enumerate() {
        info!("Screening {}/{}: {}", idx + 1, total, doc.file_name);
        let result = pipeline.run(&doc.resume_text, job).await;
        outcomes.push(ScreeningOutcome {
            file_name: doc.file_name,
            result,
        });
    }

    let succeeded = outcomes.iter().filter(|o| o.result.is_success()).count();
    info!("Batch screening complete: {succeeded}/{total} succeeded");

    outcomes
}

pub async fn extract_batch(
    pipeline: &ScreeningPipeline,
    resumes: Vec<ResumeDocument>,
) -> ExtractionReport {
    let total = resumes.len();
    let mut rows = Vec::new();
    let mut failures = Vec::new();

    for (idx, doc) in resumes.into_iter().enumerate() {
        info!("Extracting {}/{}: {}", idx + 1, total, doc.file_name);

        if doc.resume_text.trim().is_empty() {
            warn!("{}: resume text is empty", doc.file_name);
            failures.push(ExtractionFailure {
                file_name: doc.file_name,
                error: "Resume text is empty".to_string(),
            });
            continue;
        }

        match pipeline.parse_resume(&doc.resume_text).await {
            StructuredResult::Success(payload) => rows.push(extracted_row(doc.file_name, &payload)),
            StructuredResult::Error { error, .. } => {
                warn!("{}: {}", doc.file_name, error);
                failures.push(ExtractionFailure {
                    file_name: doc.file_name,
                    error,
                });
            }
        }
    }

    let summary = summarize(&rows, failures.len());
    info!(
        "Extraction complete: {} successful, {} failed, {} total",
        summary.successful, summary.failed, summary.total
    );

    ExtractionReport {
        rows,
        failures,
        summary,
    }
}

pub fn extracted_row(file_name: String, payload: &serde_json::Map<String, serde_json::Value>) -> ExtractedRow {
    let view = ParsedResumeView(payload);
    ExtractedRow {
        file_name,
        name: view.name().to_string(),
        email: view.email().to_string(),
        phone: view.phone().to_string(),
        experience_years: view.experience_years(),
        skills: view.skills().join(", "),
        education: view.education().join(", "),
        summary: view.summary().to_string(),
        extracted_at: Local::now().format(EXTRACTED_AT_FORMAT).to_string(),
    }
}

fn summarize(rows: &[ExtractedRow], failed: usize) -> ExtractionSummary {
    let successful = rows.len();
    let average_experience_years = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.experience_years).sum::<f64>() / successful as f64
    };
    let total_skills = rows
        .iter()
        .filter(|r| !r.skills.is_empty())
        .map(|r| r.skills.split(", ").count())
        .sum();
    let with_email = rows.iter().filter(|r| r.email != "N/A").count();

    ExtractionSummary {
        successful,
        failed,
        total: successful + failed,
        average_experience_years,
        total_skills,
        with_email,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::llm_client::executor::tests::ScriptedTransport;
    use crate::llm_client::LlmError;
    use crate::screening::pipeline::tests::{pipeline, ANALYSIS, PARSED};

    fn doc(file_name: &str, text: &str) -> ResumeDocument {
        ResumeDocument {
            file_name: file_name.to_string(),
            resume_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_screen_batch_keeps_input_order() {
        let transport = ScriptedTransport::new(vec![
            Ok(PARSED.to_string()),
            Ok(ANALYSIS.to_string()),
            Ok("no json".to_string()),
        ]);
        let pipeline = pipeline(transport.clone());

        let outcomes = screen_batch(
            &pipeline,
            vec![doc("a.pdf", "first resume"), doc("b.pdf", "second resume")],
            &JobRequirements::default(),
        )
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].file_name, "a.pdf");
        assert!(outcomes[0].result.is_success());
        assert_eq!(outcomes[1].file_name, "b.pdf");
        assert!(!outcomes[1].result.is_success());

        let prompts = transport.prompts_seen.lock().unwrap();
        assert!(prompts[0].contains("first resume"));
        assert!(prompts[2].contains("second resume"));
    }

    #[tokio::test]
    async fn test_extract_batch_rows_failures_and_summary() {
        let transport = ScriptedTransport::new(vec![
            Ok(PARSED.to_string()),
            Err(LlmError::Api {
                status: 500,
                message: "server exploded".to_string(),
            }),
            Ok(r#"{"name": "Sam", "experience_years": 1, "skills": ["Go"], "education": [{"degree": "BSc", "field": "CS"}]}"#.to_string()),
        ]);
        let pipeline = pipeline(transport.clone());

        let report = extract_batch(
            &pipeline,
            vec![
                doc("jane.txt", "Jane resume"),
                doc("blank.txt", "   "),
                doc("broken.txt", "Broken resume"),
                doc("sam.txt", "Sam resume"),
            ],
        )
        .await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].name, "Jane Doe");
        assert_eq!(report.rows[0].skills, "Rust, SQL");
        assert_eq!(report.rows[0].phone, "N/A");
        assert_eq!(report.rows[1].education, "BSc in CS");
        assert_eq!(report.rows[1].email, "N/A");

        assert_eq!(
            report.failures,
            vec![
                ExtractionFailure {
                    file_name: "blank.txt".to_string(),
                    error: "Resume text is empty".to_string(),
                },
                ExtractionFailure {
                    file_name: "broken.txt".to_string(),
                    error: "API call failed: API error (status 500): server exploded".to_string(),
                },
            ]
        );

        assert_eq!(report.summary.successful, 2);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.total, 4);
        assert!((report.summary.average_experience_years - 2.0).abs() < f64::EPSILON);
        assert_eq!(report.summary.total_skills, 3);
        assert_eq!(report.summary.with_email, 1);
    }

    #[test]
    fn test_extracted_row_timestamp_format() {
        let payload = json!({"name": "Jane"});
        let row = extracted_row("jane.txt".to_string(), payload.as_object().unwrap());
        assert!(chrono::NaiveDateTime::parse_from_str(&row.extracted_at, EXTRACTED_AT_FORMAT).is_ok());
        assert_eq!(row.skills, "");
        assert_eq!(row.education, "");
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = summarize(&[], 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_experience_years, 0.0);
    }
}
