//! Configuration loading and models for answerbench.
//!
//! Configuration is loaded via figment from multiple layers:
//! 1. YAML file (base configuration)
//! 2. Environment variables (ANSWERBENCH_ prefix, __ as nested separator)
//! 3. CLI overrides (passed programmatically)
//!
//! The whole configuration is immutable for the duration of a batch run and
//! passed by reference into every call.

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Figment(#[from] figment::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// DEFAULTS (all in one place)
// ============================================================================

fn default_method() -> HttpMethod {
    HttpMethod::Post
}

fn default_judge_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_judge_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.0
}

// ============================================================================
// SUT TARGET
// ============================================================================

/// HTTP method used to call the system under test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// One user-supplied header, forwarded verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// Where and how to reach the system under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SutTarget {
    pub base_url: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    /// Ordered list; applied to each request in order.
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
}

impl SutTarget {
    /// Full endpoint URL, joining base and path with a single slash.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path.is_empty() {
            return base.to_string();
        }
        format!("{}/{}", base, self.path.trim_start_matches('/'))
    }
}

// ============================================================================
// JUDGE SETTINGS
// ============================================================================

/// Length of the comments requested from the judge. Only changes the prompt
/// instruction and the output token budget, never the reply schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommentVerbosity {
    #[default]
    Brief,
    Detailed,
}

impl CommentVerbosity {
    /// Max output tokens requested from the judge.
    pub fn max_tokens(&self) -> u32 {
        match self {
            CommentVerbosity::Brief => 600,
            CommentVerbosity::Detailed => 1200,
        }
    }
}

/// Credentials and sampling settings for the judge service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSettings {
    pub api_key: String,
    #[serde(default = "default_judge_base_url")]
    pub base_url: String,
    #[serde(default = "default_judge_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub verbosity: CommentVerbosity,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_judge_base_url(),
            model: default_judge_model(),
            temperature: default_temperature(),
            verbosity: CommentVerbosity::default(),
        }
    }
}

// ============================================================================
// EVAL CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub sut: SutTarget,
    #[serde(default)]
    pub judge: JudgeSettings,
    /// Per-request timeout for every network call. None means unbounded.
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
}

impl EvalConfig {
    /// Build the shared HTTP client used for both SUT and judge calls.
    pub fn build_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs_f64(secs));
        }
        builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))
    }
}

// ============================================================================
// CLI OVERRIDES
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_model: Option<String>,
}

// ============================================================================
// LOADING
// ============================================================================

pub fn load_config(path: impl AsRef<Path>) -> Result<EvalConfig, ConfigError> {
    load_config_with_overrides(path, ConfigOverrides::default())
}

pub fn load_config_with_overrides(
    path: impl AsRef<Path>,
    overrides: ConfigOverrides,
) -> Result<EvalConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let interpolated = interpolate_env_vars(&contents);

    let mut figment = Figment::new()
        .merge(Yaml::string(&interpolated))
        .merge(Env::prefixed("ANSWERBENCH_").split("__"));

    if let Some(t) = overrides.timeout_seconds {
        #[derive(Serialize)]
        struct TimeoutOverride {
            timeout_seconds: f64,
        }
        figment = figment.merge(Serialized::defaults(TimeoutOverride { timeout_seconds: t }));
    }

    if let Some(model) = overrides.judge_model {
        #[derive(Serialize)]
        struct JudgeModelOverride {
            model: String,
        }
        #[derive(Serialize)]
        struct JudgeOverride {
            judge: JudgeModelOverride,
        }
        figment = figment.merge(Serialized::defaults(JudgeOverride {
            judge: JudgeModelOverride { model },
        }));
    }

    let cfg: EvalConfig = figment.extract()?;
    validate_config(&cfg)?;
    Ok(cfg)
}

fn interpolate_env_vars(input: &str) -> String {
    use once_cell::sync::Lazy;
    use regex::Regex;
    use std::env;

    static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid regex")
    });

    ENV_VAR_RE
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_val = caps.get(2).map(|m| m.as_str());
            match env::var(var_name) {
                Ok(val) => val,
                Err(_) => default_val.unwrap_or("").to_string(),
            }
        })
        .to_string()
}

fn validate_config(cfg: &EvalConfig) -> Result<(), ConfigError> {
    if cfg.sut.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("sut.base_url must not be empty".into()));
    }
    if cfg.judge.model.trim().is_empty() {
        return Err(ConfigError::Invalid("judge.model must not be empty".into()));
    }
    if !(0.0..=1.0).contains(&cfg.judge.temperature) {
        return Err(ConfigError::Invalid(format!(
            "judge.temperature must be within [0.0, 1.0], got {}",
            cfg.judge.temperature
        )));
    }
    if let Some(t) = cfg.timeout_seconds {
        if t <= 0.0 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be positive when set".into(),
            ));
        }
    }
    Ok(())
}
