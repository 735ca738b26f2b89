// Prompt constants for the resume rewrite call.
// The uploaded resume travels as a separate file part; only the job description is inlined.

/// Output schema the model is told to follow. Mirrors `ResumeRecord`.
pub const RESUME_SCHEMA: &str = r#"{
  "name": "Full Name",
  "title": "Target Job Title",
  "contact": {
    "email": "name@example.com",
    "phone": "+1 555 0100",
    "linkedin": "linkedin.com/in/profile",
    "github": "github.com/profile"
  },
  "summary": "Three to four sentence professional summary.",
  "skills": ["Skill", "Skill"],
  "experience": [
    {
      "role": "Job Title",
      "organization": "Company",
      "duration": "Jan 2022 - Present",
      "achievements": ["Action-verb bullet with a measurable result"]
    }
  ],
  "education": [
    {"degree": "Degree", "institution": "School", "duration": "2015 - 2019"}
  ],
  "projects": [
    {"name": "Project", "description": "One sentence.", "technologies": ["Tech"]}
  ]
}"#;

/// Rewrite prompt. Replace `{job_description}` and `{schema}` before sending.
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer who optimizes resumes for Applicant Tracking Systems (ATS).

The attached file is the candidate's current resume. Rewrite it for the job description below.

Rules:
- Use ONLY facts present in the attached resume. Do not invent employers, dates, degrees or metrics.
- Mirror the important keywords and technologies of the job description where the resume supports them.
- Start every achievement with a strong action verb and keep it to one or two lines.
- Keep the result short enough for a single page where possible.
- Plain text only inside values: no markdown, no tables, no icons.
- Use an empty string or an empty list when the resume has no information for a field.

Job description:
"""
{job_description}
"""

Respond with a single JSON object that follows this schema exactly (no extra fields):
{schema}"#;

/// Fills the rewrite template for one job description.
pub fn build_rewrite_prompt(job_description: &str) -> String {
    REWRITE_PROMPT_TEMPLATE
        .replace("{schema}", RESUME_SCHEMA)
        .replace("{job_description}", job_description.trim())
}
