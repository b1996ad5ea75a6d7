//! Parse repository references out of free-form GitHub URLs.

use crate::AssistantError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Each segment stops at the next slash, query, fragment or whitespace, so a
// trailing slash after the repository is never captured.
static GITHUB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/(?P<owner>[^/?#\s]+)/(?P<name>[^/?#\s]+)").expect("valid regex")
});

/// Locate `github.com/<owner>/<repo>` anywhere in `input`.
///
/// Anything before the host (scheme, `www.`) and after the repository
/// segment (`/issues/3`, query strings) is ignored.
///
/// # Errors
///
/// Returns [`AssistantError::InvalidRepoUrl`] when no such substring exists.
///
/// # Examples
///
/// ```
/// # use issue_assistant::ref_parser::parse_repo_url;
/// let repo = parse_repo_url("https://github.com/acme/widgets/").unwrap();
/// assert_eq!(repo.owner, "acme");
/// assert_eq!(repo.name, "widgets");
/// ```
pub fn parse_repo_url(input: &str) -> Result<RepoRef, AssistantError> {
    let caps = GITHUB_RE
        .captures(input)
        .ok_or(AssistantError::InvalidRepoUrl)?;
    match (caps.name("owner"), caps.name("name")) {
        (Some(owner), Some(name)) => Ok(RepoRef {
            owner: owner.as_str().to_owned(),
            name: name.as_str().to_owned(),
        }),
        _ => Err(AssistantError::InvalidRepoUrl),
    }
}
