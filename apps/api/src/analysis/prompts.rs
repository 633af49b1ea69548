// Skill-gap analysis prompt template.

pub const ANALYSIS_PROMPT: &str = "
Compare the following CV and job description. Identify missing or weak skills and give an ATS score (0-100). Format the output as JSON with fields: skillGaps[], atsScore.

CV:
{cv_text}

Job Description:
{job_description}
";

/// Renders the analysis prompt. Both inputs are embedded verbatim, without
/// truncation.
pub fn build_analysis_prompt(cv_text: &str, job_description: &str) -> String {
    // Single pass so a CV containing "{job_description}" is not re-expanded.
    let (head, tail) = ANALYSIS_PROMPT
        .split_once("{cv_text}")
        .unwrap_or((ANALYSIS_PROMPT, ""));
    let tail = tail.replace("{job_description}", job_description);

    let mut prompt = String::with_capacity(head.len() + cv_text.len() + tail.len());
    prompt.push_str(head);
    prompt.push_str(cv_text);
    prompt.push_str(&tail);
    prompt
}
