// LLM prompt constants for the two screening stages.
// Templates use `{placeholder}` tokens replaced before sending.

use serde_json::{Map, Value};

use crate::llm_client::prompts::{system_instruction, JSON_ONLY_FOOTER};
use crate::llm_client::{CompletionPrompt, ResponseShape};
use crate::screening::models::JobRequirements;

/// Resume text beyond this many characters is not sent.
pub const RESUME_PREFIX_CHARS: usize = 4000;

const PARSE_TEMPERATURE: f32 = 0.1;
const ANALYSIS_TEMPERATURE: f32 = 0.3;

pub const RESUME_SHAPE: ResponseShape = ResponseShape {
    name: "resume parsing",
    fields: &[
        "name",
        "email",
        "phone",
        "skills",
        "experience_years",
        "experience_details",
        "education",
        "summary",
    ],
};

pub const ANALYSIS_SHAPE: ResponseShape = ResponseShape {
    name: "candidate analysis",
    fields: &[
        "candidate_name",
        "candidate_email",
        "confidence_score",
        "shortlisted",
        "key_strengths",
        "gaps",
        "recommendation",
        "email_subject",
        "email_body",
    ],
};

const RESUME_PARSE_ROLE: &str = "You are an expert resume parser. \
    Read carefully and extract skills, experience and contact information exactly as written.";

const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Extract information from the resume below EXACTLY as written.

RESUME TEXT:
{resume_text}

Rules:

1. SKILLS
   - Include only skills that are explicitly written in the resume (skills sections, job and project descriptions).
   - Do NOT infer, assume or add related skills. Copy skill names as they appear.
   - Example: "Skills: Python, SQL, DNS" -> ["Python", "SQL", "DNS"], never adding "Linux" or "Networking".

2. EXPERIENCE
   - Count full-time work only; internships and education do not count.
   - Compute the span from the dates given ("Oct 2023 - July 2025" is about 1.75 years).
   - A whole number or a decimal is fine. No full-time work means 0.

3. CONTACT
   - Name, email and phone exactly as written.

Return a JSON object with this structure:
{
    "name": "Full Name",
    "email": "email@example.com",
    "phone": "+1234567890",
    "skills": ["Only", "Skills", "Written", "In", "The", "Resume"],
    "experience_years": 2,
    "experience_details": [
        {"role": "Job Title", "company": "Company Name", "duration": "2 years", "type": "full-time"}
    ],
    "education": [
        {"degree": "Degree Name", "field": "Field", "year": 2020}
    ],
    "summary": "Brief summary"
}

"#;

const CANDIDATE_ANALYSIS_ROLE: &str =
    "You are an expert recruiter. Analyze candidates against job requirements.";

const CANDIDATE_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the candidate below against the job requirements.

CANDIDATE DATA:
{candidate_json}

JOB REQUIREMENTS:
- Job Title: {job_title}
- Required Skills: {required_skills}
- Required Experience: {required_experience_years} years
- Technical Skills: {nice_to_have}

Rules:

1. KEY STRENGTHS (3-5 items): specific candidate skills that match the requirements,
   naming the actual technologies and the experience level.
   Write "Strong experience in Python and SQL", not "Good technical skills".

2. GAPS (2-4 items): specific required skills the candidate is missing, and any
   experience shortfall. Write "No experience with AWS", not "Lacks cloud skills".

3. RECOMMENDATION: 2-3 honest sentences on the fit, naming skills that align or are missing.

4. CONFIDENCE SCORE (0-100), weighted:
   - Skill match: 40%
   - Experience level: 30%
   - Education: 20%
   - Achievements: 10%

Return a JSON object with this structure:
{
    "candidate_name": "Name",
    "candidate_email": "email@example.com",
    "confidence_score": 75,
    "shortlisted": true,
    "key_strengths": ["Proficient in Python with 2+ years experience"],
    "gaps": ["No experience with AWS cloud platform"],
    "recommendation": "Two or three sentences.",
    "email_subject": "Interview Opportunity - Job Title",
    "email_body": "<p>Dear Candidate...</p>"
}

"#;

/// Stage-1 prompt. Only the first [`RESUME_PREFIX_CHARS`] characters are embedded.
pub fn resume_parse_prompt(resume_text: &str) -> CompletionPrompt {
    let prefix: String = resume_text.chars().take(RESUME_PREFIX_CHARS).collect();
    let user = format!(
        "{}{}",
        fill_template(RESUME_PARSE_PROMPT_TEMPLATE, &[("resume_text", prefix.as_str())]),
        JSON_ONLY_FOOTER
    );

    CompletionPrompt {
        system: system_instruction(RESUME_PARSE_ROLE),
        user,
        temperature: PARSE_TEMPERATURE,
        shape: RESUME_SHAPE,
    }
}

/// Stage-2 prompt built from the stage-1 payload and the job requirements.
pub fn candidate_analysis_prompt(
    parsed_resume: &Map<String, Value>,
    job: &JobRequirements,
) -> CompletionPrompt {
    let candidate_json =
        serde_json::to_string_pretty(parsed_resume).unwrap_or_else(|_| "{}".to_string());
    let body = fill_template(
        CANDIDATE_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("candidate_json", candidate_json.as_str()),
            ("job_title", job.job_title_or_default()),
            ("required_skills", job.required_skills_or_default()),
            (
                "required_experience_years",
                job.required_experience_or_default(),
            ),
            ("nice_to_have", job.nice_to_have_or_default()),
        ],
    );

    CompletionPrompt {
        system: system_instruction(CANDIDATE_ANALYSIS_ROLE),
        user: format!("{body}{JSON_ONLY_FOOTER}"),
        temperature: ANALYSIS_TEMPERATURE,
        shape: ANALYSIS_SHAPE,
    }
}

/// Replaces `{token}` occurrences in a single left-to-right pass. Substituted
/// values are never rescanned, and braces that do not form a known token are
/// copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values.iter().find_map(|(token, value)| {
            tail.strip_prefix(*token)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
