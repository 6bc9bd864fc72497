//! Data models for content entries, posts, and persisted feeds.
//!
//! This module defines the core data structures used throughout the pipeline:
//!
//! - [`ContentEntry`]: A topical item with per-language translations, before expansion
//! - [`Post`]: One language-specific, publishable record
//! - [`Feed`]: The canonical persisted artifact (`generated_at` + `posts`)
//! - [`ItemsFeed`]: The simpler alternate schema (`updated_at` + `items`)
//!
//! # Data Flow
//!
//! ```text
//! ContentEntry (catalog or model output) -> Post (one per language) -> Feed (JSON file)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A supported content language.
///
/// The declaration order is the canonical expansion order: pt, en, es.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    En,
    Es,
}

impl Language {
    /// All supported languages in canonical order.
    pub const ALL: [Language; 3] = [Language::Pt, Language::En, Language::Es];

    /// The lowercase language code used in ids and JSON.
    pub fn code(self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" => Ok(Language::Pt),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(format!("unsupported language code: {other}")),
        }
    }
}

/// Title and HTML body of one entry in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub title: String,
    pub html: String,
}

impl Translation {
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
        }
    }
}

/// One topical item prior to per-language expansion.
///
/// Entries only live for the duration of a run; they are built from the
/// static catalog or decoded from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    /// Short slug, unique within a run.
    pub id: String,
    /// Ordered keyword tags, copied onto every post.
    pub tags: Vec<String>,
    /// Available translations. Languages missing here produce no post.
    pub translations: BTreeMap<Language, Translation>,
}

impl ContentEntry {
    pub fn translation(&self, lang: Language) -> Option<&Translation> {
        self.translations.get(&lang)
    }
}

/// One published, language-specific record.
///
/// Field order is the JSON key order of the feed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// `{entry_id}-{lang}`, unique within a feed.
    pub id: String,
    pub category: String,
    /// Always written; absent only in legacy monolingual feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<Language>,
    pub title: String,
    /// Plain-text prefix of `content`.
    pub excerpt: String,
    /// Raw HTML body.
    pub content: String,
    pub tags: Vec<String>,
    pub published_at: String,
    pub author: String,
}

/// The canonical persisted feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub generated_at: String,
    pub posts: Vec<Post>,
}

impl Feed {
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            posts: Vec::new(),
        }
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.posts.iter().any(|p| p.id == post_id)
    }
}

/// A row of the alternate, summary-only feed schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub category: String,
    pub title: String,
    pub summary: String,
}

/// The alternate feed schema: `{updated_at, items}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsFeed {
    pub updated_at: String,
    pub items: Vec<FeedItem>,
}
