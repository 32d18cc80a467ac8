//! Configuration loading with env-var overrides.
//!
//! Reads an optional TOML file (`KONSULENT_CONFIG`, else `config/default.toml`
//! when present), fills every missing field with its default, then applies
//! environment overrides. The LLM API key is only ever read from the
//! environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger::LogFormat;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// `konsulent-api` settings.
#[derive(Debug, Clone)]
pub struct RosterServiceConfig {
    /// Socket address the roster service listens on.
    pub bind: String,
}

/// `llm-verktoy-api` settings.
#[derive(Debug, Clone)]
pub struct QueryServiceConfig {
    /// Socket address the query service listens on.
    pub bind: String,
    /// Base URL of the roster service, without the `/konsulenter` path.
    pub roster_url: String,
    /// Bound on the whole roster fetch, in seconds.
    pub roster_timeout_seconds: u64,
}

/// Chat-completions endpoint configuration. One endpoint, one model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Fully-resolved configuration shared by both binaries.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub roster_service: RosterServiceConfig,
    pub query_service: QueryServiceConfig,
    pub llm: LlmConfig,
    /// API key from `OPENAI_API_KEY` — `None` puts the summarizer in
    /// template-only mode. Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

/// Environment values that take precedence over the file.
///
/// Collected once by [`EnvOverrides::from_env`]; tests build it by hand
/// instead of mutating process env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub roster_bind: Option<String>,
    pub query_bind: Option<String>,
    pub roster_url: Option<String>,
    pub llm_api_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            log_level: non_empty_var("LOG_LEVEL"),
            log_format: non_empty_var("LOG_FORMAT"),
            roster_bind: non_empty_var("KONSULENT_API_BIND"),
            query_bind: non_empty_var("LLM_VERKTOY_API_BIND"),
            roster_url: non_empty_var("KONSULENT_API_URL"),
            llm_api_base_url: non_empty_var("OPENAI_API_BASE_URL"),
            llm_model: non_empty_var("OPENAI_MODEL"),
            llm_api_key: non_empty_var("OPENAI_API_KEY"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    general: RawGeneral,
    #[serde(default)]
    roster_service: RawRosterService,
    #[serde(default)]
    query_service: RawQueryService,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGeneral {
    #[serde(default = "default_log_level")]
    log_level: String,
    /// `"text"` or `"json"`.
    #[serde(default = "default_log_format")]
    log_format: String,
}

impl Default for RawGeneral {
    fn default() -> Self {
        Self { log_level: default_log_level(), log_format: default_log_format() }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRosterService {
    #[serde(default = "default_roster_bind")]
    bind: String,
}

impl Default for RawRosterService {
    fn default() -> Self {
        Self { bind: default_roster_bind() }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQueryService {
    #[serde(default = "default_query_bind")]
    bind: String,
    #[serde(default = "default_roster_url")]
    roster_url: String,
    #[serde(default = "default_roster_timeout_seconds")]
    roster_timeout_seconds: u64,
}

impl Default for RawQueryService {
    fn default() -> Self {
        Self {
            bind: default_query_bind(),
            roster_url: default_roster_url(),
            roster_timeout_seconds: default_roster_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLlm {
    #[serde(default = "default_llm_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_llm_model")]
    model: String,
    #[serde(default = "default_llm_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            api_base_url: default_llm_api_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout_seconds(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "text".to_string() }
fn default_roster_bind() -> String { "0.0.0.0:8000".to_string() }
fn default_query_bind() -> String { "0.0.0.0:8001".to_string() }
fn default_roster_url() -> String { "http://localhost:8000".to_string() }
fn default_roster_timeout_seconds() -> u64 { 5 }
fn default_llm_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_llm_model() -> String { "gpt-4o-mini".to_string() }
fn default_llm_timeout_seconds() -> u64 { 5 }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from the configured file (if any), then apply env overrides.
pub fn load() -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();
    match non_empty_var("KONSULENT_CONFIG") {
        // An explicitly named file must exist.
        Some(path) => {
            let path = PathBuf::from(path);
            load_from(Some(path.as_path()), &overrides)
        }
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            load_from(default.exists().then_some(default), &overrides)
        }
    }
}

/// Internal loader — accepts an explicit path and overrides.
///
/// `path = None` means "no file": every field takes its default.
pub fn load_from(path: Option<&Path>, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    let log_format: LogFormat = overrides
        .log_format
        .as_deref()
        .unwrap_or(parsed.general.log_format.as_str())
        .parse()
        .map_err(|e| AppError::Config(format!("general.log_format: {e}")))?;

    let config = Config {
        log_level: overrides
            .log_level
            .clone()
            .unwrap_or(parsed.general.log_level),
        log_format,
        roster_service: RosterServiceConfig {
            bind: overrides
                .roster_bind
                .clone()
                .unwrap_or(parsed.roster_service.bind),
        },
        query_service: QueryServiceConfig {
            bind: overrides
                .query_bind
                .clone()
                .unwrap_or(parsed.query_service.bind),
            roster_url: overrides
                .roster_url
                .clone()
                .unwrap_or(parsed.query_service.roster_url),
            roster_timeout_seconds: parsed.query_service.roster_timeout_seconds,
        },
        llm: LlmConfig {
            api_base_url: overrides
                .llm_api_base_url
                .clone()
                .unwrap_or(parsed.llm.api_base_url),
            model: overrides.llm_model.clone().unwrap_or(parsed.llm.model),
            timeout_seconds: parsed.llm.timeout_seconds,
        },
        llm_api_key: overrides.llm_api_key.clone(),
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), AppError> {
    if config.query_service.roster_timeout_seconds == 0 {
        return Err(AppError::Config("query_service.roster_timeout_seconds must be > 0".into()));
    }
    if config.llm.timeout_seconds == 0 {
        return Err(AppError::Config("llm.timeout_seconds must be > 0".into()));
    }
    for (name, url) in [
        ("query_service.roster_url", &config.query_service.roster_url),
        ("llm.api_base_url", &config.llm.api_base_url),
    ] {
        reqwest::Url::parse(url)
            .map_err(|e| AppError::Config(format!("{name} is not a valid URL ('{url}'): {e}")))?;
    }
    Ok(())
}

// ── Test support ──────────────────────────────────────────────────────────────

impl Config {
    /// Defaults with the roster and LLM pointed at the given URLs and no API
    /// key. Used by tests that stand up mock upstreams.
    pub fn for_upstreams(roster_url: &str, llm_api_base_url: &str) -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Text,
            roster_service: RosterServiceConfig { bind: "127.0.0.1:0".into() },
            query_service: QueryServiceConfig {
                bind: "127.0.0.1:0".into(),
                roster_url: roster_url.to_string(),
                roster_timeout_seconds: default_roster_timeout_seconds(),
            },
            llm: LlmConfig {
                api_base_url: llm_api_base_url.to_string(),
                model: "test-model".into(),
                timeout_seconds: 2,
            },
            llm_api_key: None,
        }
    }
}
