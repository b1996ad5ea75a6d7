//! HTTP surface: router construction and the analysis pipeline.
//!
//! [`AppState`] is built once from [`Config`] at startup and shared
//! read-only with every request. A request runs repository parsing, issue
//! fetching, prompt building, completion and extraction in order, stopping
//! at the first failure.

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use log::{debug, info};
use serde_json::value::RawValue;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::AssistantError;
use crate::config::Config;
use crate::extract::extract_json;
use crate::github::GitHubClient;
use crate::issues::fetch_issue_text;
use crate::llm::ChatClient;
use crate::models::{AnalysisResult, AnalyzeRequest};
use crate::prompt::build_prompt;
use crate::ref_parser::parse_repo_url;

/// Clients shared by all requests.
#[derive(Debug, Clone)]
pub struct AppState {
    pub github: GitHubClient,
    pub llm: ChatClient,
}

impl AppState {
    /// Build both outbound clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::ClientSetup`] when either client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self, AssistantError> {
        let github = GitHubClient::new(
            config.github_token.as_deref(),
            &config.github_api_url,
            config.http_timeout,
        )?;
        let llm = ChatClient::new(
            &config.api_key,
            &config.llm_base_url,
            config.model.clone(),
            config.llm_timeout,
        )?;
        Ok(Self { github, llm })
    }
}

/// Run the full analysis for one request.
///
/// # Errors
///
/// Returns the first [`AssistantError`] raised by any stage.
pub async fn analyze(
    state: &AppState,
    request: &AnalyzeRequest,
) -> Result<Box<RawValue>, AssistantError> {
    let repo = parse_repo_url(&request.repo_url)?;
    info!("analysing {repo}#{}", request.issue_number);

    let issue_text = fetch_issue_text(&state.github, &repo, request.issue_number).await?;
    let prompt = build_prompt(&issue_text);
    debug!(
        "prompt for {repo}#{} is {} characters",
        request.issue_number,
        prompt.chars().count()
    );

    let reply = state.llm.complete(&prompt).await?;
    let parsed = extract_json(&reply)?;
    if serde_json::from_str::<AnalysisResult>(parsed.get()).is_err() {
        debug!("model reply does not follow the requested schema; returning it unchanged");
    }
    Ok(parsed)
}

async fn analyze_issue(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Box<RawValue>>, AssistantError> {
    let Json(request) = payload?;
    analyze(&state, &request).await.map(Json)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;
    info!("{method} {path} -> {}", response.status());
    response
}

/// Build the application router with permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze_issue", post(analyze_issue))
        .route("/health", get(health))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
