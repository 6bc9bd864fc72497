//! Expansion of content entries into language-specific posts.
//!
//! Output order is entry order × language order, and each post id is
//! `{entry_id}-{lang}`. Entries that lack a language are skipped for that
//! language. Distinct entry ids are the caller's responsibility.

use crate::config::FeedConfig;
use crate::models::{ContentEntry, FeedItem, Language, Post};
use crate::utils::excerpt_from_html;
use tracing::{debug, instrument};

/// Constants stamped onto every post of one run.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    pub category: &'a str,
    pub author: &'a str,
    pub languages: &'a [Language],
    pub excerpt_limit: usize,
}

impl<'a> Assembler<'a> {
    pub fn from_config(config: &'a FeedConfig, author: &'a str) -> Self {
        Self {
            category: &config.category,
            author,
            languages: &config.languages,
            excerpt_limit: config.excerpt_limit,
        }
    }

    /// Build the post for one entry in one language, if that translation exists.
    pub fn post(&self, entry: &ContentEntry, lang: Language, published_at: &str) -> Option<Post> {
        let t = entry.translation(lang)?;
        Some(Post {
            id: format!("{}-{}", entry.id, lang),
            category: self.category.to_string(),
            lang: Some(lang),
            title: t.title.clone(),
            excerpt: excerpt_from_html(&t.html, self.excerpt_limit),
            content: t.html.clone(),
            tags: entry.tags.clone(),
            published_at: published_at.to_string(),
            author: self.author.to_string(),
        })
    }

    /// Expand every entry into its posts.
    #[instrument(level = "info", skip_all, fields(entries = entries.len()))]
    pub fn assemble(&self, entries: &[ContentEntry], published_at: &str) -> Vec<Post> {
        let posts: Vec<Post> = entries
            .iter()
            .flat_map(|entry| {
                self.languages
                    .iter()
                    .filter_map(move |&lang| self.post(entry, lang, published_at))
            })
            .collect();
        debug!(posts = posts.len(), "Assembled posts");
        posts
    }
}

/// Project posts onto the summary-only items schema.
pub fn to_items(posts: &[Post]) -> Vec<FeedItem> {
    posts
        .iter()
        .map(|p| FeedItem {
            category: p.category.clone(),
            title: p.title.clone(),
            summary: p.excerpt.clone(),
        })
        .collect()
}
