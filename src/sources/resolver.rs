//! Model selection for the remote generator.
//!
//! Picking a model is separate from talking to the API so the heuristic can
//! be swapped or tested without any HTTP.

use serde::Deserialize;
use tracing::debug;

/// The generation method a model must support to be usable.
pub const GENERATE_CONTENT: &str = "generateContent";

/// One entry of the model listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Resource name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn can_generate(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT)
    }
}

/// Chooses which model to call from the available ones.
pub trait EndpointResolver {
    /// Returns the model resource name, or `None` when nothing is suitable.
    fn resolve(&self, models: &[ModelDescriptor]) -> Option<String>;
}

/// Prefers capable models whose name contains an earlier keyword.
///
/// Falls back to the first capable model when no keyword matches.
#[derive(Debug, Clone)]
pub struct KeywordResolver {
    keywords: Vec<String>,
}

impl KeywordResolver {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl EndpointResolver for KeywordResolver {
    fn resolve(&self, models: &[ModelDescriptor]) -> Option<String> {
        let capable: Vec<&ModelDescriptor> = models.iter().filter(|m| m.can_generate()).collect();
        debug!(
            available = models.len(),
            capable = capable.len(),
            "Resolving model"
        );

        for keyword in &self.keywords {
            if let Some(m) = capable
                .iter()
                .find(|m| m.name.to_lowercase().contains(keyword.as_str()))
            {
                return Some(m.name.clone());
            }
        }
        capable.first().map(|m| m.name.clone())
    }
}
