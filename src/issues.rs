//! Fetch an issue with its comments and flatten them into prompt text.

use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::AssistantError;
use crate::github::{GitHubClient, decode, ensure_success};
use crate::ref_parser::RepoRef;

/// Maximum number of characters of issue text forwarded to the model.
pub const MAX_ISSUE_CHARS: usize = 15_000;

/// Appended when the combined text exceeds [`MAX_ISSUE_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]";

/// Separator placed between individual comment bodies.
pub const COMMENT_SEPARATOR: &str = "\n---\n";

/// Subset of the REST issue payload used for analysis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub comments_url: Option<String>,
}

/// Issue comment as returned by the comments endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: Option<String>,
}

/// Fetch issue metadata.
///
/// # Errors
///
/// Returns [`AssistantError::IssueNotFound`] on 404, and a GitHub error for
/// any other failure.
pub async fn fetch_issue(
    client: &GitHubClient,
    repo: &RepoRef,
    number: u64,
) -> Result<Issue, AssistantError> {
    let url = client.issue_url(repo, number)?;
    let response = client.get(url).await?;
    if response.status() == StatusCode::NOT_FOUND {
        info!("issue {repo}#{number} not found");
        return Err(AssistantError::IssueNotFound);
    }
    decode(ensure_success(response).await?).await
}

/// Fetch the first page of comments for `issue`.
///
/// Returns an empty list without a request when the issue reports no
/// comments or carries no comments URL.
///
/// # Errors
///
/// Returns a GitHub error when the URL is invalid or the request fails.
pub async fn fetch_comments(
    client: &GitHubClient,
    issue: &Issue,
) -> Result<Vec<Comment>, AssistantError> {
    let Some(raw_url) = issue.comments_url.as_deref().filter(|_| issue.comments > 0) else {
        return Ok(Vec::new());
    };
    let url = Url::parse(raw_url).map_err(|e| AssistantError::GitHubResponse {
        path: "comments_url".into(),
        message: format!("invalid URL {raw_url}: {e}"),
    })?;
    let response = ensure_success(client.get(url).await?).await?;
    let comments: Vec<Comment> = decode(response).await?;
    debug!("fetched {} comments", comments.len());
    Ok(comments)
}

/// Join title, body and comments into one block of text.
///
/// Sections are separated by blank lines. The comments section is only
/// present when `comments` is non-empty.
#[must_use]
pub fn combine_issue_text(issue: &Issue, comments: &[Comment]) -> String {
    let comments_section = if comments.is_empty() {
        String::new()
    } else {
        let bodies: Vec<&str> = comments
            .iter()
            .map(|c| c.body.as_deref().unwrap_or_default())
            .collect();
        format!("\n\nComments:\n{}", bodies.join(COMMENT_SEPARATOR))
    };
    [
        issue.title.as_deref().unwrap_or_default(),
        issue.body.as_deref().unwrap_or_default(),
        comments_section.as_str(),
    ]
    .join("\n\n")
}

/// Cap `text` at [`MAX_ISSUE_CHARS`] characters, appending
/// [`TRUNCATION_MARKER`] when anything was dropped.
#[must_use]
pub fn truncate_issue_text(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_ISSUE_CHARS) {
        debug!("truncating issue text at byte {cut}");
        text.truncate(cut);
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

/// Fetch an issue and its comments, returning the truncated combined text.
///
/// # Errors
///
/// Propagates any error from [`fetch_issue`] or [`fetch_comments`].
pub async fn fetch_issue_text(
    client: &GitHubClient,
    repo: &RepoRef,
    number: u64,
) -> Result<String, AssistantError> {
    let issue = fetch_issue(client, repo, number).await?;
    let comments = fetch_comments(client, &issue).await?;
    Ok(truncate_issue_text(combine_issue_text(&issue, &comments)))
}
