//! Benchmark configuration parsing and validation.
//!
//! Configuration is a TOML file naming the solver and judge model lists plus
//! endpoint and budget settings. See `bench.toml` at the repo root.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Parsed benchmark configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BenchConfig {
    pub models: ModelsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub budgets: BudgetConfig,
}

/// Ordered model lists. Solvers and judges are independent and may overlap.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelsConfig {
    pub solvers: Vec<String>,
    pub judges: Vec<String>,
}

/// Generation endpoint settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API credential.
    #[serde(default = "default_key_env")]
    pub key_env: String,
    /// `HTTP-Referer` attribution override.
    #[serde(default)]
    pub referer: Option<String>,
    /// `X-Title` attribution override.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Phase-specific output-length budgets.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct BudgetConfig {
    #[serde(default = "default_solve_max_tokens")]
    pub solve_max_tokens: u32,
    #[serde(default = "default_judge_max_tokens")]
    pub judge_max_tokens: u32,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_solve_max_tokens() -> u32 {
    32_768
}

fn default_judge_max_tokens() -> u32 {
    4_096
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_env: default_key_env(),
            referer: None,
            title: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            solve_max_tokens: default_solve_max_tokens(),
            judge_max_tokens: default_judge_max_tokens(),
        }
    }
}

impl BenchConfig {
    /// Load and validate a configuration file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let config: BenchConfig = toml::from_str(&contents)
            .with_context(|| format!("parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validate config {}", path.display()))?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn parse_str(contents: &str) -> Result<Self> {
        let config: BenchConfig = toml::from_str(contents).context("parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.models.solvers.is_empty() {
            bail!("models.solvers must be a non-empty list");
        }
        if self.models.judges.is_empty() {
            bail!("models.judges must be a non-empty list");
        }
        for model in self.models.solvers.iter().chain(&self.models.judges) {
            if model.trim().is_empty() {
                bail!("model identifiers must be non-empty");
            }
        }
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must be non-empty");
        }
        if self.api.key_env.trim().is_empty() {
            bail!("api.key_env must be non-empty");
        }
        if self.api.request_timeout_secs == 0 {
            bail!("api.request_timeout_secs must be > 0");
        }
        if self.budgets.solve_max_tokens == 0 {
            bail!("budgets.solve_max_tokens must be > 0");
        }
        if self.budgets.judge_max_tokens == 0 {
            bail!("budgets.judge_max_tokens must be > 0");
        }
        Ok(())
    }

    /// Read the API credential from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        let key = std::env::var(&self.api.key_env)
            .with_context(|| format!("read credential from {}", self.api.key_env))?;
        if key.trim().is_empty() {
            bail!("{} is set but empty", self.api.key_env);
        }
        Ok(key)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }
}
