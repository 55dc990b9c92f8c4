//! Screening inputs and read-only views over stage payloads.
//!
//! Stage payloads stay as raw JSON maps; the views here only read them for
//! logging and the resume-filter table. They never reject a payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_EXPERIENCE_RANGE: &str = "0 to 3";

/// Job requirements supplied by the recruiter. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub required_skills: Option<String>,
    /// Free text such as "2" or "2-3".
    #[serde(default, deserialize_with = "lenient_string")]
    pub required_experience_years: Option<String>,
    #[serde(default)]
    pub nice_to_have: Option<String>,
}

impl JobRequirements {
    pub fn job_title_or_default(&self) -> &str {
        non_blank(self.job_title.as_deref()).unwrap_or(NOT_AVAILABLE)
    }

    pub fn required_skills_or_default(&self) -> &str {
        non_blank(self.required_skills.as_deref()).unwrap_or(NOT_AVAILABLE)
    }

    pub fn required_experience_or_default(&self) -> &str {
        non_blank(self.required_experience_years.as_deref()).unwrap_or(DEFAULT_EXPERIENCE_RANGE)
    }

    pub fn nice_to_have_or_default(&self) -> &str {
        non_blank(self.nice_to_have.as_deref()).unwrap_or(NOT_AVAILABLE)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts `"2-3"`, `2` or `2.5` for experience fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Read-only view of a stage-1 payload.
pub struct ParsedResumeView<'a>(pub &'a Map<String, Value>);

impl<'a> ParsedResumeView<'a> {
    pub fn name(&self) -> &'a str {
        str_field(self.0, "name")
    }

    pub fn email(&self) -> &'a str {
        str_field(self.0, "email")
    }

    pub fn phone(&self) -> &'a str {
        str_field(self.0, "phone")
    }

    pub fn summary(&self) -> &'a str {
        str_field(self.0, "summary")
    }

    /// Numeric experience; numbers-as-strings are read, anything else is 0.
    pub fn experience_years(&self) -> f64 {
        match self.0.get("experience_years") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn skills(&self) -> Vec<&'a str> {
        self.0
            .get("skills")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// `"<degree> in <field>"` per education entry.
    pub fn education(&self) -> Vec<String> {
        self.0
            .get("education")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|edu| {
                        let degree = edu.get("degree").and_then(Value::as_str).unwrap_or("");
                        let field = edu.get("field").and_then(Value::as_str).unwrap_or("");
                        format!("{degree} in {field}")
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Read-only view of a stage-2 payload.
pub struct AnalysisView<'a>(pub &'a Map<String, Value>);

impl<'a> AnalysisView<'a> {
    pub fn confidence_score(&self) -> f64 {
        self.0
            .get("confidence_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    pub fn shortlisted(&self) -> bool {
        self.0
            .get("shortlisted")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn recommendation(&self) -> &'a str {
        str_field(self.0, "recommendation")
    }
}

fn str_field<'a>(payload: &'a Map<String, Value>, key: &str) -> &'a str {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
}
