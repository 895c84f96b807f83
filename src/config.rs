use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Not `Debug`: it carries the API key.
#[derive(Clone)]
pub struct AppConfig {
    /// Only needed once a collaborator call is made.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("study-lens")
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get("STUDY_LENS_API_KEY").or_else(|| get("GEMINI_API_KEY"));
        if let Some(model) = get("STUDY_LENS_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = get("STUDY_LENS_BASE_URL") {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(anyhow!("STUDY_LENS_BASE_URL must be an http(s) URL, got '{base_url}'"));
            }
            config.base_url = base_url;
        }
        if let Some(data_dir) = get("STUDY_LENS_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(timeout) = get("STUDY_LENS_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .parse()
                .with_context(|| format!("invalid STUDY_LENS_TIMEOUT_SECS '{timeout}'"))?;
        }

        Ok(config)
    }
}
