//! Analyse GitHub issues with a hosted language model.
//!
//! The crate exposes the pieces of a single HTTP endpoint: repository
//! reference parsing, issue retrieval, prompt construction, the completion
//! client and JSON extraction, plus the router that ties them together.

pub mod cli_args;
pub mod config;
pub mod environment;
pub mod error;
pub mod extract;
pub mod github;
pub mod issues;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod ref_parser;
pub mod server;

pub use config::{Config, ConfigError};
pub use error::AssistantError;
pub use extract::extract_json;
pub use models::{AnalysisResult, AnalyzeRequest, IssueType};
pub use ref_parser::{RepoRef, parse_repo_url};
pub use server::{AppState, analyze, router};
