//! Command-line argument structures.
//!
//! Every flag is optional so that unset flags never mask values coming from
//! the configuration file or environment.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Options accepted by the `issue-assistant` binary.
#[derive(Parser, Serialize, Default, Debug, Clone)]
#[command(
    name = "issue-assistant",
    about = "Analyse GitHub issues with a hosted language model"
)]
pub struct ServerArgs {
    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,
    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(long, value_name = "ADDR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Model identifier passed to the completion endpoint
    #[arg(long, value_name = "MODEL")]
    #[serde(
        rename = "huggingface_model_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,
    /// Base URL of the GitHub REST API
    #[arg(long, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,
    /// GitHub token for authenticated API requests
    #[arg(long, value_name = "TOKEN")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    /// GitHub request timeout in seconds
    #[arg(long, value_name = "SECS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<u64>,
    /// Completion request timeout in seconds
    #[arg(long, value_name = "SECS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_timeout: Option<u64>,
}
