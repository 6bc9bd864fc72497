//! Content sources for the feed pipeline.
//!
//! A source yields the [`ContentEntry`] values a run publishes. Two sources
//! exist:
//!
//! | Source | Module | Attribution | Failure mode |
//! |--------|--------|-------------|--------------|
//! | Static catalog | [`catalog`] | human author | none |
//! | Remote generator | [`remote`] | AI author | soft: empty result |
//!
//! Sources never return partial results: either every entry decoded and
//! validated, or the run gets nothing and aborts without writing.

pub mod catalog;
pub mod remote;
pub mod resolver;

use crate::config::FeedConfig;
use crate::models::ContentEntry;

/// Who wrote the entries of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    Human,
    Generated,
}

impl Attribution {
    /// The author string stamped on posts from this source.
    pub fn author(self, config: &FeedConfig) -> &str {
        match self {
            Attribution::Human => &config.author,
            Attribution::Generated => &config.ai_author,
        }
    }
}

/// Trait for anything that can supply content entries for one run.
///
/// The returned futures carry no `Send` bound; the pipeline awaits them on
/// the current task.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn attribution(&self) -> Attribution;

    /// Produce this run's entries. An empty vector means "nothing usable".
    async fn entries(&self) -> Vec<ContentEntry>;
}
