//! Error type shared by the request pipeline.
//!
//! Every failure along the analysis path is a variant of [`AssistantError`].
//! The HTTP layer turns each variant into a status code and a
//! `{"detail": ...}` body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Invalid GitHub repository URL")]
    InvalidRepoUrl,
    #[error("Issue not found")]
    IssueNotFound,
    #[error("GitHub API error: {context}: {source}")]
    GitHubRequest {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GitHub API error: HTTP status {status} from {url} | body snippet: {snippet}")]
    GitHubStatus {
        status: u16,
        url: String,
        snippet: String,
    },
    #[error("GitHub API error: malformed response at {path}: {message}")]
    GitHubResponse { path: String, message: String },
    #[error("LLM request failed: {0}")]
    LlmRequest(String),
    #[error("Unexpected LLM response format: {0}")]
    LlmFormat(String),
    #[error("Could not locate JSON in model output:\n{cleaned}")]
    JsonNotFound { cleaned: String },
    #[error("Failed to parse JSON. Error: {source}\nRaw JSON string:\n{raw}")]
    JsonParse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
    #[error("client setup failed: {context}: {message}")]
    ClientSetup { context: String, message: String },
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
}

impl AssistantError {
    /// HTTP status reported to the caller for this failure.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRepoUrl => StatusCode::BAD_REQUEST,
            Self::InvalidBody(rejection) => rejection.status(),
            Self::IssueNotFound => StatusCode::NOT_FOUND,
            Self::GitHubRequest { .. } | Self::GitHubStatus { .. } | Self::GitHubResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::LlmRequest(_)
            | Self::LlmFormat(_)
            | Self::JsonNotFound { .. }
            | Self::JsonParse { .. }
            | Self::ClientSetup { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed with {status}: {self}");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
