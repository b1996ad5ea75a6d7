//! Minimal GitHub REST client.
//!
//! Wraps a `reqwest::Client` preloaded with the headers the v3 API expects
//! and a per-request timeout. Callers decide how each status is surfaced;
//! this module only builds URLs, sends requests and decodes bodies.

use crate::AssistantError;
use crate::ref_parser::RepoRef;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Public GitHub API endpoint used when no override is configured.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Maximum number of characters kept from a response body in error messages.
pub(crate) const BODY_SNIPPET_LEN: usize = 500;

/// Trim `text` to `max` characters, appending `...` when truncated.
pub(crate) fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        let mut out = text.chars().take(max).collect::<String>();
        out.push_str("...");
        out
    }
}

fn setup_error(context: &str, err: impl std::fmt::Display) -> AssistantError {
    AssistantError::ClientSetup {
        context: context.to_owned(),
        message: err.to_string(),
    }
}

/// Build the default header set for tracker requests.
///
/// The authorization header is only present when `token` is non-empty.
fn build_headers(token: Option<&str>) -> Result<HeaderMap, AssistantError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("issue-assistant"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let value = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|e| setup_error("build authorization header", e))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// GitHub REST client configuration.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api: Url,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client targeting the `api` base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::ClientSetup`] when the base URL cannot be
    /// parsed, the token is not a valid header value, or the underlying
    /// client cannot be built.
    pub fn new(token: Option<&str>, api: &str, timeout: Duration) -> Result<Self, AssistantError> {
        let base = api.trim_end_matches('/');
        let mut api =
            Url::parse(base).map_err(|e| setup_error(&format!("parse API base URL {base}"), e))?;
        let normalised_path = match api.path().trim_end_matches('/') {
            "" => "/".to_owned(),
            path => format!("{path}/"),
        };
        api.set_path(&normalised_path);
        let client = reqwest::Client::builder()
            .default_headers(build_headers(token)?)
            .timeout(timeout)
            .build()
            .map_err(|e| setup_error("build GitHub client", e))?;
        Ok(Self { api, client })
    }

    /// URL of a single issue: `{api}/repos/{owner}/{repo}/issues/{number}`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::ClientSetup`] if the base URL cannot carry
    /// path segments.
    pub fn issue_url(&self, repo: &RepoRef, number: u64) -> Result<Url, AssistantError> {
        let number = number.to_string();
        let mut url = self.api.clone();
        url.path_segments_mut()
            .map_err(|()| setup_error("build issue URL", self.api.as_str()))?
            .pop_if_empty()
            .extend([
                "repos",
                repo.owner.as_str(),
                repo.name.as_str(),
                "issues",
                number.as_str(),
            ]);
        Ok(url)
    }

    /// Send a GET request, mapping transport failures to
    /// [`AssistantError::GitHubRequest`].
    ///
    /// The response is returned whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::GitHubRequest`] on connection errors and
    /// timeouts.
    pub async fn get(&self, url: Url) -> Result<Response, AssistantError> {
        debug!("GET {url}");
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AssistantError::GitHubRequest {
                context: format!("GET {url}"),
                source: e,
            })
    }
}

/// Turn a non-success response into [`AssistantError::GitHubStatus`].
///
/// # Errors
///
/// Returns [`AssistantError::GitHubStatus`] with a snippet of the body when
/// the status is not in the 2xx range.
pub async fn ensure_success(response: Response) -> Result<Response, AssistantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(AssistantError::GitHubStatus {
        status: status.as_u16(),
        url,
        snippet: snippet(&body, BODY_SNIPPET_LEN),
    })
}

/// Read and deserialise a JSON body, reporting the failing path on error.
///
/// # Errors
///
/// Returns [`AssistantError::GitHubRequest`] when the body cannot be read
/// and [`AssistantError::GitHubResponse`] when it does not match `T`.
pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AssistantError> {
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| AssistantError::GitHubRequest {
            context: format!("read body from {url}"),
            source: e,
        })?;
    let mut de = serde_json::Deserializer::from_str(&body);
    serde_path_to_error::deserialize(&mut de).map_err(|e| AssistantError::GitHubResponse {
        path: e.path().to_string(),
        message: format!("{} | snippet: {}", e.inner(), snippet(&body, BODY_SNIPPET_LEN)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn repo() -> RepoRef {
        RepoRef {
            owner: "acme".into(),
            name: "widgets".into(),
        }
    }

    #[rstest]
    #[case("https://api.github.com", "https://api.github.com/repos/acme/widgets/issues/42")]
    #[case("https://api.github.com/", "https://api.github.com/repos/acme/widgets/issues/42")]
    #[case(
        "https://ghe.example.test/api/v3/",
        "https://ghe.example.test/api/v3/repos/acme/widgets/issues/42"
    )]
    fn builds_issue_url_under_base(#[case] base: &str, #[case] expected: &str) {
        let client = GitHubClient::new(None, base, Duration::from_secs(1)).expect("client");
        let url = client.issue_url(&repo(), 42).expect("issue url");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let err = GitHubClient::new(None, "not a url", Duration::from_secs(1))
            .expect_err("invalid base");
        assert!(matches!(err, AssistantError::ClientSetup { .. }));
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("abc123"), true)]
    fn authorization_header_only_with_token(#[case] token: Option<&str>, #[case] present: bool) {
        let headers = build_headers(token).expect("headers");
        assert_eq!(headers.contains_key(AUTHORIZATION), present);
        assert_eq!(
            headers.get(ACCEPT).and_then(|v| v.to_str().ok()),
            Some("application/vnd.github.v3+json")
        );
        if present {
            assert_eq!(
                headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
                Some("token abc123")
            );
        }
    }

    #[test]
    fn snippet_truncates_long_text() {
        assert_eq!(snippet("abcdef", 3), "abc...");
        assert_eq!(snippet("abc", 3), "abc");
    }
}
