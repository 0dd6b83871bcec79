// Market intelligence prompt templates.

pub const MARKET_INTEL_SYSTEM: &str = "\
You are a labor-market analyst who summarizes hiring conditions for job seekers. \
You MUST respond with valid JSON only, with no markdown fences and no explanations. \
When you are unsure of a figure, give your best conservative estimate instead of omitting the field.";

/// Replace `{role}` and `{location}` before sending.
pub const MARKET_INTEL_PROMPT: &str = r#"Summarize the current job market for the role below.

ROLE: {role}
LOCATION: {location}

Return a JSON object with this EXACT schema (no extra fields):
{
  "demand_level": "high" | "moderate" | "low",
  "salary_range": {"min": 90000, "max": 140000, "currency": "USD"},
  "top_skills": ["skill", "skill", "skill"],
  "hiring_trend": "growing" | "stable" | "declining",
  "summary": "Two or three sentences a job seeker can act on."
}

Rules:
- top_skills: 3 to 8 entries, most in-demand first.
- salary_range: annual base pay, whole numbers, min <= max.
- summary: plain language, no bullet points."#;

pub fn build_market_prompt(role: &str, location: &str) -> String {
    MARKET_INTEL_PROMPT
        .replace("{role}", role)
        .replace("{location}", location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_filled() {
        let prompt = build_market_prompt("Backend Engineer", "Berlin");
        assert!(prompt.contains("ROLE: Backend Engineer"));
        assert!(prompt.contains("LOCATION: Berlin"));
        assert!(!prompt.contains("{role}"));
        assert!(!prompt.contains("{location}"));
    }
}
