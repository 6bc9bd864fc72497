//! Run configuration.
//!
//! Every constant the pipeline needs (output location, attribution, category,
//! languages, remote API settings) lives in [`FeedConfig`]. A config file is
//! optional; missing keys fall back to the defaults below and CLI flags are
//! applied on top in `main`.
//!
//! ```yaml
//! output_dir: output
//! author: RGR Saúde
//! category: saude
//! languages: [pt, en, es]
//! schema: posts
//! remote:
//!   api_key_env: GEMINI_API_KEY
//!   preferred_keywords: [flash, fast, pro, general]
//! ```

use crate::models::Language;
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config lists no languages")]
    NoLanguages,
    #[error("language {0} is listed more than once")]
    DuplicateLanguage(Language),
}

/// Shape of the written feed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedSchema {
    /// `{generated_at, posts: [...]}`
    #[default]
    Posts,
    /// `{updated_at, items: [{category, title, summary}]}`
    Items,
}

/// Settings for the generative-text API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API root, without the `/v1beta` version segment.
    pub base_url: String,
    /// Pinned model name (e.g. `models/gemini-1.5-flash`). Skips discovery when set.
    pub model: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model-name keywords in order of preference.
    pub preferred_keywords: Vec<String>,
    /// Subject the model is asked to write about.
    pub topic: String,
    /// Number of entries requested.
    pub topic_count: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            preferred_keywords: ["flash", "fast", "pro", "general"]
                .into_iter()
                .map(String::from)
                .collect(),
            topic: "saúde e bem-estar".to_string(),
            topic_count: 3,
        }
    }
}

/// Everything a run needs, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub output_dir: PathBuf,
    pub feed_file: String,
    /// Attribution for hand-written catalog posts.
    pub author: String,
    /// Attribution for model-generated posts.
    pub ai_author: String,
    pub category: String,
    /// Expansion order; also restricts which translations are published.
    pub languages: Vec<Language>,
    pub excerpt_limit: usize,
    pub schema: FeedSchema,
    /// Language of the post added by `append`.
    pub append_lang: Language,
    pub remote: RemoteConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            feed_file: "site_feed.json".to_string(),
            author: "RGR Saúde".to_string(),
            ai_author: "RGR Saúde (IA)".to_string(),
            category: "saude".to_string(),
            languages: Language::ALL.to_vec(),
            excerpt_limit: crate::utils::EXCERPT_LIMIT,
            schema: FeedSchema::Posts,
            append_lang: Language::Pt,
            remote: RemoteConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Load configuration from a YAML file, or the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as a map
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }
        if let Some(lang) = self.languages.iter().duplicates().next() {
            return Err(ConfigError::DuplicateLanguage(*lang));
        }
        Ok(())
    }

    /// Full path of the feed file.
    pub fn feed_path(&self) -> PathBuf {
        self.output_dir.join(&self.feed_file)
    }
}
