//! Request and analysis data structures.

use serde::{Deserialize, Serialize};

/// Body accepted by `POST /analyze_issue`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub repo_url: String,
    pub issue_number: u64,
}

/// Category the model assigns to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    FeatureRequest,
    Documentation,
    Question,
    Other,
}

/// Shape the model is asked to return.
///
/// Replies are passed through to the caller as raw JSON; this type is only
/// used to describe the worked example and to note schema drift in logs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub priority_score: String,
    pub suggested_labels: Vec<String>,
    pub potential_impact: String,
}
