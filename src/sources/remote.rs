//! Content generation through a Gemini-style REST API.
//!
//! A run makes at most two calls:
//!
//! 1. `GET {base}/v1beta/models` to discover a model (skipped when one is pinned)
//! 2. `POST {base}/v1beta/{model}:generateContent` with the prompt
//!
//! The response text is stripped of markdown fences and decoded strictly into
//! [`ContentEntry`] values. Every failure after the credential check is soft:
//! [`ContentSource::entries`] logs it and returns an empty vector so the run
//! aborts without touching the feed file. There is no retry.

use super::resolver::{EndpointResolver, KeywordResolver, ModelDescriptor};
use super::{Attribution, ContentSource};
use crate::config::{FeedConfig, RemoteConfig};
use crate::models::{ContentEntry, Language, Translation};
use crate::utils::{slugify, strip_code_fences, truncate_for_log};
use itertools::Itertools;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("environment variable {0} is not set; it must hold the API key")]
    MissingCredential(String),
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected API response body: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("no available model supports generateContent")]
    NoSuitableModel,
    #[error("response contains no candidate text")]
    EmptyCandidate,
    #[error("model output is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid entry at index {index}: {reason}")]
    Shape { index: usize, reason: String },
}

// ---- wire types ----

/// The key travels in a header so it never appears in URLs or in error messages.
const API_KEY_HEADER: &str = "x-goog-api-key";
const MODEL_PAGE_SIZE: u32 = 1000;
const MAX_MODEL_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// One object of the JSON array the model is asked for.
#[derive(Debug, Deserialize)]
struct GeneratedEntry {
    id: String,
    tags: Vec<String>,
    content: BTreeMap<String, GeneratedTranslation>,
}

#[derive(Debug, Deserialize)]
struct GeneratedTranslation {
    title: String,
    html: String,
}

/// Client for the generative-text API.
pub struct RemoteGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: Option<String>,
    resolver: Box<dyn EndpointResolver + Send + Sync>,
    topic: String,
    topic_count: usize,
    languages: Vec<Language>,
}

impl fmt::Debug for RemoteGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteGenerator")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("topic", &self.topic)
            .field("topic_count", &self.topic_count)
            .field("languages", &self.languages)
            .finish()
    }
}

impl RemoteGenerator {
    /// Build a generator, reading the API key from the configured variable.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::MissingCredential`] when the variable is unset or empty.
    pub fn from_env(config: &FeedConfig) -> Result<Self, GeneratorError> {
        let var = &config.remote.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => {
                Ok(Self::new(&config.remote, key, config.languages.clone()))
            }
            _ => Err(GeneratorError::MissingCredential(var.clone())),
        }
    }

    pub fn new(remote: &RemoteConfig, api_key: String, languages: Vec<Language>) -> Self {
        Self {
            client: Client::new(),
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: remote.model.clone(),
            resolver: Box::new(KeywordResolver::new(remote.preferred_keywords.clone())),
            topic: remote.topic.clone(),
            topic_count: remote.topic_count,
            languages,
        }
    }

    /// Replace the model-selection heuristic.
    pub fn with_resolver(mut self, resolver: impl EndpointResolver + Send + Sync + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, GeneratorError> {
        Ok(Url::parse(&format!("{}/v1beta/{}", self.base_url, path))?)
    }

    /// Fetch every page of the model listing.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, GeneratorError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_MODEL_PAGES {
            let mut url = self.endpoint("models")?;
            url.query_pairs_mut()
                .append_pair("pageSize", &MODEL_PAGE_SIZE.to_string());
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let resp = self
                .client
                .get(url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;
            let status = resp.status();
            let body = resp.text().await?;
            if !status.is_success() {
                return Err(GeneratorError::Status {
                    status: status.as_u16(),
                    body: truncate_for_log(&body, 300),
                });
            }
            let list: ModelList = serde_json::from_str(&body).map_err(GeneratorError::Envelope)?;
            debug!(page, count = list.models.len(), "Fetched model page");
            models.extend(list.models);

            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(models),
            }
        }
        warn!(pages = MAX_MODEL_PAGES, "Model listing still paginating; using what was fetched");
        Ok(models)
    }

    /// Determine which model to call: the pinned one, or one picked from the listing.
    #[instrument(level = "info", skip_all)]
    pub async fn resolve_model(&self) -> Result<String, GeneratorError> {
        if let Some(model) = &self.model {
            debug!(%model, "Using pinned model");
            return Ok(qualify_model_name(model));
        }

        let models = self.list_models().await?;
        let model = self
            .resolver
            .resolve(&models)
            .ok_or(GeneratorError::NoSuitableModel)?;
        let display_name = models
            .iter()
            .find(|m| m.name == model)
            .and_then(|m| m.display_name.as_deref())
            .unwrap_or("-");
        info!(%model, display_name, available = models.len(), "Selected model");
        Ok(qualify_model_name(&model))
    }

    /// Resolve a model, send the prompt once, and decode the answer.
    #[instrument(level = "info", skip_all)]
    pub async fn generate(&self) -> Result<Vec<ContentEntry>, GeneratorError> {
        let t0 = Instant::now();
        let model = self.resolve_model().await?;

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: build_prompt(&self.topic, self.topic_count, &self.languages),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = self.endpoint(&format!("{model}:generateContent"))?;
        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        info!(
            %model,
            status = status.as_u16(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "generateContent returned"
        );
        if !status.is_success() {
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let envelope: GenerateResponse =
            serde_json::from_str(&body).map_err(GeneratorError::Envelope)?;
        let text = candidate_text(&envelope).ok_or(GeneratorError::EmptyCandidate)?;
        debug!(preview = %truncate_for_log(&text, 300), "Model output");

        parse_entries(&text, &self.languages)
    }
}

impl ContentSource for RemoteGenerator {
    fn name(&self) -> &str {
        "remote"
    }

    fn attribution(&self) -> Attribution {
        Attribution::Generated
    }

    async fn entries(&self) -> Vec<ContentEntry> {
        match self.generate().await {
            Ok(entries) => {
                info!(count = entries.len(), "Remote generator produced entries");
                entries
            }
            Err(e) => {
                warn!(error = %e, "Remote generation failed; no entries produced");
                Vec::new()
            }
        }
    }
}

/// Listing returns `models/<id>`; a pinned model may be given as the bare id.
fn qualify_model_name(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

/// Concatenated text parts of the first candidate, if any.
fn candidate_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if text.trim().is_empty() { None } else { Some(text) }
}

/// The instruction sent to the model.
pub fn build_prompt(topic: &str, count: usize, languages: &[Language]) -> String {
    let codes = languages.iter().map(|l| l.code()).join(", ");
    let example_content = languages
        .iter()
        .map(|l| format!(r#""{}": {{"title": "...", "html": "<p>...</p>"}}"#, l.code()))
        .join(", ");
    format!(
        "Escreva {count} artigos curtos e originais sobre {topic}.\n\
         Responda APENAS com JSON puro, sem blocos de código markdown e sem texto adicional.\n\
         O JSON deve ser uma lista de objetos, cada um com:\n\
         - \"id\": um identificador curto em inglês, minúsculo, sem espaços\n\
         - \"tags\": exatamente 3 palavras-chave\n\
         - \"content\": um objeto com as chaves {codes}, cada uma com \"title\" e \"html\" (parágrafos <p>)\n\
         Formato: [{{\"id\": \"...\", \"tags\": [\"...\", \"...\", \"...\"], \"content\": {{{example_content}}}}}]"
    )
}

/// Strictly decode the model's text into content entries.
///
/// Fences are stripped first. Each entry needs a non-empty id (normalised
/// through [`slugify`]), at least one non-empty tag, and at least one
/// complete translation in `languages`. Unknown language keys are ignored.
/// Any violation rejects the whole response.
pub fn parse_entries(text: &str, languages: &[Language]) -> Result<Vec<ContentEntry>, GeneratorError> {
    let cleaned = strip_code_fences(text);
    let raw: Vec<GeneratedEntry> = serde_json::from_str(&cleaned).map_err(GeneratorError::Decode)?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.len());
    for (index, generated) in raw.into_iter().enumerate() {
        let shape = |reason: String| GeneratorError::Shape { index, reason };

        let id = slugify(&generated.id);
        if id.is_empty() {
            return Err(shape(format!("id {:?} has no usable characters", generated.id)));
        }
        if !seen.insert(id.clone()) {
            return Err(shape(format!("duplicate id {id}")));
        }

        let tags: Vec<String> = generated
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return Err(shape("no tags".to_string()));
        }

        let mut translations = BTreeMap::new();
        for (code, t) in generated.content {
            let Ok(lang) = code.parse::<Language>() else {
                debug!(index, %code, "Ignoring unsupported language");
                continue;
            };
            if !languages.contains(&lang) {
                continue;
            }
            if t.title.trim().is_empty() || t.html.trim().is_empty() {
                return Err(shape(format!("empty title or html for {lang}")));
            }
            translations.insert(lang, Translation::new(t.title.trim(), t.html.trim()));
        }
        if translations.is_empty() {
            return Err(shape("no supported translation".to_string()));
        }

        entries.push(ContentEntry {
            id,
            tags,
            translations,
        });
    }
    Ok(entries)
}
