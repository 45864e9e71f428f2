use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CLUB_DATA_PATH: &str = "data/clubs.json";

/// What the chat endpoint does when the grounding call fails after the
/// resolver already produced a usable draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroundingFailurePolicy {
    /// Surface the failure to the caller as a 500.
    #[default]
    Fail,
    /// Return the resolver's draft reply instead.
    Draft,
}

impl FromStr for GroundingFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "draft" => Ok(Self::Draft),
            other => Err(anyhow!(
                "unknown grounding failure policy '{other}' (expected 'fail' or 'draft')"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres for reviews. Reviews are kept in memory when unset.
    pub database_url: Option<String>,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub club_data_path: String,
    /// Pre-rendered `name,id` listing. Derived from the club data when unset.
    pub club_list_path: Option<String>,
    pub grounding_failure_policy: GroundingFailurePolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            club_data_path: optional_env("CLUB_DATA_PATH")
                .unwrap_or_else(|| DEFAULT_CLUB_DATA_PATH.to_string()),
            club_list_path: optional_env("CLUB_LIST_PATH"),
            grounding_failure_policy: optional_env("GROUNDING_FAILURE_POLICY")
                .map(|v| v.parse::<GroundingFailurePolicy>())
                .transpose()
                .context("GROUNDING_FAILURE_POLICY is invalid")?
                .unwrap_or_default(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an env var, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
