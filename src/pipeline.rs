//! Run orchestration: source → assembler → store.
//!
//! [`run_generate`] builds a complete feed from any [`ContentSource`] and
//! overwrites the feed file. [`run_append`] adds a single random catalog tip
//! to the existing feed. Neither touches the file system until content has
//! been obtained, so a failed source leaves any existing feed as it was.

use crate::assembler::{Assembler, to_items};
use crate::config::{FeedConfig, FeedSchema};
use crate::models::{ContentEntry, Feed, ItemsFeed, Language};
use crate::outputs::json::{StoreError, append_post, write_document};
use crate::sources::catalog::catalog;
use crate::sources::{Attribution, ContentSource};
use crate::utils::{ensure_writable_dir, utc_timestamp};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("content source '{0}' produced no entries; feed left untouched")]
    NoContent(String),
    #[error("append language {0} is not among the configured languages")]
    LanguageNotPublished(Language),
    #[error("output directory {path} is not usable: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a successful run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: PathBuf,
    /// Posts (or items) in the written file.
    pub total: usize,
    /// Posts added by this run.
    pub added: usize,
}

async fn prepare_output(config: &FeedConfig) -> Result<(), PipelineError> {
    ensure_writable_dir(&config.output_dir)
        .await
        .map_err(|e| PipelineError::OutputDir {
            path: config.output_dir.clone(),
            reason: e.to_string(),
        })
}

/// Generate a full feed from `source` and overwrite the feed file.
///
/// # Errors
///
/// [`PipelineError::NoContent`] when the source yields nothing; the output
/// directory and file are not touched in that case.
#[instrument(level = "info", skip_all, fields(source = source.name()))]
pub async fn run_generate<S: ContentSource>(
    config: &FeedConfig,
    source: &S,
    now: DateTime<Utc>,
) -> Result<RunSummary, PipelineError> {
    let entries = source.entries().await;
    if entries.is_empty() {
        warn!("Source returned no entries; aborting without writing");
        return Err(PipelineError::NoContent(source.name().to_string()));
    }
    info!(entries = entries.len(), "Obtained content entries");

    prepare_output(config).await?;

    let timestamp = utc_timestamp(now);
    let author = source.attribution().author(config);
    let posts = Assembler::from_config(config, author).assemble(&entries, &timestamp);
    let path = config.feed_path();
    let total = posts.len();

    match config.schema {
        FeedSchema::Posts => {
            let feed = Feed {
                generated_at: timestamp,
                posts,
            };
            write_document(&feed, &path).await?;
        }
        FeedSchema::Items => {
            let feed = ItemsFeed {
                updated_at: timestamp,
                items: to_items(&posts),
            };
            write_document(&feed, &path).await?;
        }
    }

    info!(path = %path.display(), total, schema = ?config.schema, "Feed generated");
    Ok(RunSummary {
        path,
        total,
        added: total,
    })
}

/// Pick one catalog entry uniformly at random.
pub fn pick_tip<'c, R: Rng + ?Sized>(
    catalog: &'c [ContentEntry],
    rng: &mut R,
) -> Option<&'c ContentEntry> {
    catalog.choose(rng)
}

/// Prepend one random catalog tip to the feed file, skipping duplicates.
///
/// Always writes the canonical posts schema. `append_lang` must be one of
/// the configured languages.
#[instrument(level = "info", skip_all, fields(lang = %config.append_lang))]
pub async fn run_append<R: Rng + ?Sized>(
    config: &FeedConfig,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<RunSummary, PipelineError> {
    if !config.languages.contains(&config.append_lang) {
        return Err(PipelineError::LanguageNotPublished(config.append_lang));
    }
    let entries = catalog();
    let timestamp = utc_timestamp(now);
    let assembler = Assembler::from_config(config, Attribution::Human.author(config));

    let Some(post) = pick_tip(&entries, rng)
        .and_then(|entry| assembler.post(entry, config.append_lang, &timestamp))
    else {
        warn!("No catalog tip available in the requested language");
        return Err(PipelineError::NoContent("static".to_string()));
    };
    info!(post_id = %post.id, "Picked tip");

    prepare_output(config).await?;
    let path = config.feed_path();
    let (feed, inserted) = append_post(&path, post, &timestamp).await?;

    Ok(RunSummary {
        path,
        total: feed.posts.len(),
        added: usize::from(inserted),
    })
}
