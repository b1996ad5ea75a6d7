//! Prompt templates for issue analysis.

/// System turn sent ahead of every analysis prompt.
pub const SYSTEM_PROMPT: &str =
    "You are an assistant that MUST return only valid JSON matching the requested schema.";

const SCHEMA: &str = r#"{
  "summary": "A one-sentence summary of the user's problem or request.",
  "type": "bug | feature_request | documentation | question | other",
  "priority_score": "A score 1–5 plus a short justification.",
  "suggested_labels": ["2–3 short GitHub labels"],
  "potential_impact": "One sentence on user impact (if this is a bug)."
}"#;

/// Worked example input shown to the model.
pub const EXAMPLE_INPUT: &str = r#"Title: "Login button not responding on mobile"
Body: "When I tap the login button on iOS, nothing happens. It works on desktop."
Comments: "Likely a mobile touch handler issue""#;

/// Worked example output shown to the model.
pub const EXAMPLE_OUTPUT: &str = r#"{
  "summary": "Login button on mobile devices is unresponsive.",
  "type": "bug",
  "priority_score": "4 - High impact on mobile login flow.",
  "suggested_labels": ["bug", "mobile", "login-flow"],
  "potential_impact": "Mobile users may be blocked from logging in."
}"#;

const RULES: &str = "IMPORTANT:
- Return ONLY valid JSON.
- Do NOT include any explanation outside JSON.
- Keep sentences short and clear.";

/// Build the user turn for `issue_text`.
///
/// The issue text is appended verbatim after the schema, the worked example
/// and the formatting rules.
#[must_use]
pub fn build_prompt(issue_text: &str) -> String {
    format!(
        "You are an assistant that analyzes GitHub issues and returns ONLY a JSON object.

JSON schema:
{SCHEMA}

Example input:
{EXAMPLE_INPUT}

Example output:
{EXAMPLE_OUTPUT}

{RULES}

Now analyze this issue:

{issue_text}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, IssueType};

    #[test]
    fn example_output_matches_schema() {
        let example: AnalysisResult =
            serde_json::from_str(EXAMPLE_OUTPUT).expect("example parses");
        assert_eq!(example.issue_type, IssueType::Bug);
        assert_eq!(example.suggested_labels, ["bug", "mobile", "login-flow"]);
    }

    #[test]
    fn schema_lists_every_field() {
        let schema: serde_json::Value = serde_json::from_str(SCHEMA).expect("schema parses");
        let keys: Vec<&str> = schema
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        for field in [
            "summary",
            "type",
            "priority_score",
            "suggested_labels",
            "potential_impact",
        ] {
            assert!(keys.contains(&field), "missing {field}");
        }
    }

    #[test]
    fn prompt_ends_with_issue_text() {
        let prompt = build_prompt("Crash on save\n\nSteps: ...");
        assert!(prompt.ends_with("Now analyze this issue:\n\nCrash on save\n\nSteps: ...\n"));
        assert!(prompt.contains(SCHEMA));
        assert!(prompt.contains(EXAMPLE_OUTPUT));
        assert!(prompt.contains("- Return ONLY valid JSON."));
    }

    #[test]
    fn schema_ranges_use_en_dashes() {
        let prompt = build_prompt("x");
        assert!(prompt.contains("\"A score 1\u{2013}5 plus a short justification.\""));
        assert!(prompt.contains("[\"2\u{2013}3 short GitHub labels\"]"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt("same"), build_prompt("same"));
    }

    #[test]
    fn braces_in_issue_text_are_kept_verbatim() {
        let prompt = build_prompt("fn main() { println!(\"{}\", 1); }");
        assert!(prompt.contains("fn main() { println!(\"{}\", 1); }"));
    }
}
