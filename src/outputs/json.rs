//! JSON feed persistence.
//!
//! Two write paths exist:
//!
//! - **Overwrite**: [`write_document`] serializes a whole feed (either schema)
//!   and replaces the file.
//! - **Append**: [`append_post`] loads the existing feed, prepends one post
//!   unless its id is already present, and rewrites the file.
//!
//! Files are pretty-printed UTF-8 with non-ASCII text kept literal. Writes go
//! to a sibling `.tmp` file that is then renamed over the target, so readers
//! never see a half-written feed. Concurrent runs on one path are not guarded.

use crate::models::{Feed, ItemsFeed, Post};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize feed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("existing feed {path} uses the items schema; append needs a posts feed")]
    SchemaMismatch { path: PathBuf },
    #[error("existing feed {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `document` and replace the file at `path` with it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_document<T: Serialize>(document: &T, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(document)?;
    let tmp = temp_path(path);

    fs::write(&tmp, json.as_bytes()).await.map_err(io_error(&tmp))?;
    fs::rename(&tmp, path).await.map_err(io_error(path))?;
    info!(bytes = json.len(), "Wrote feed file");
    Ok(())
}

/// Read the feed at `path`; `None` when the file does not exist.
///
/// A file that exists but does not parse is an error rather than an empty
/// feed, so a later write never silently discards it. A feed in the items
/// schema gets its own error.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_feed(path: &Path) -> Result<Option<Feed>, StoreError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No existing feed");
            return Ok(None);
        }
        Err(e) => return Err(io_error(path)(e)),
    };
    match serde_json::from_str::<Feed>(&raw) {
        Ok(feed) => Ok(Some(feed)),
        Err(_) if serde_json::from_str::<ItemsFeed>(&raw).is_ok() => {
            Err(StoreError::SchemaMismatch {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Put `post` at the front of the feed unless a post with its id exists.
///
/// Returns whether the post was inserted.
pub fn prepend_unique(feed: &mut Feed, post: Post) -> bool {
    if feed.contains(&post.id) {
        return false;
    }
    feed.posts.insert(0, post);
    true
}

/// Load (or start) the feed at `path`, prepend `post` if new, stamp
/// `generated_at` with `now`, and rewrite the file.
///
/// Returns the resulting feed and whether the post was inserted.
#[instrument(level = "info", skip_all, fields(path = %path.display(), post_id = %post.id))]
pub async fn append_post(path: &Path, post: Post, now: &str) -> Result<(Feed, bool), StoreError> {
    let mut feed = load_feed(path).await?.unwrap_or_else(|| Feed::new(now));
    let inserted = prepend_unique(&mut feed, post);
    feed.generated_at = now.to_string();
    if inserted {
        info!(total = feed.posts.len(), "Prepended post");
    } else {
        info!(total = feed.posts.len(), "Post already present; skipping");
    }
    write_document(&feed, path).await?;
    Ok((feed, inserted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedItem, ItemsFeed, Language};

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            category: "saude".to_string(),
            lang: Some(Language::Pt),
            title: "Água".to_string(),
            excerpt: "Beba água".to_string(),
            content: "<p>Beba água</p>".to_string(),
            tags: vec!["hidratação".to_string()],
            published_at: "2025-05-06T14:30:00Z".to_string(),
            author: "RGR Saúde".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");
        let feed = Feed {
            generated_at: "2025-05-06T14:30:00Z".to_string(),
            posts: vec![post("water-pt"), post("water-en")],
        };

        write_document(&feed, &path).await.unwrap();
        let loaded = load_feed(&path).await.unwrap().unwrap();
        assert_eq!(loaded, feed);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_written_json_is_pretty_and_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");
        let mut feed = Feed::new("2025-05-06T14:30:00Z");
        feed.posts.push(post("water-pt"));

        write_document(&feed, &path).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"title\": \"Água\""));
        assert!(!raw.contains("\\u00c1"));
        assert!(raw.starts_with("{\n  \"generated_at\""));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");
        std::fs::write(&path, "x".repeat(10_000)).unwrap();

        let items = ItemsFeed {
            updated_at: "2025-05-06T14:30:00Z".to_string(),
            items: vec![FeedItem {
                category: "saude".to_string(),
                title: "Sono".to_string(),
                summary: "Durma bem".to_string(),
            }],
        };
        write_document(&items, &path).await.unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["items"][0]["title"], "Sono");
        assert!(value.get("posts").is_none());
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_feed(&dir.path().join("nope.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_feed(&path).await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_items_feed_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");
        std::fs::write(&path, r#"{"updated_at": "t", "items": []}"#).unwrap();
        let err = load_feed(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("items schema"));
    }

    #[test]
    fn test_prepend_unique() {
        let mut feed = Feed::new("t");
        assert!(prepend_unique(&mut feed, post("a")));
        assert!(prepend_unique(&mut feed, post("b")));
        assert!(!prepend_unique(&mut feed, post("a")));
        let ids: Vec<&str> = feed.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_append_creates_then_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");

        let (feed, inserted) = append_post(&path, post("sleep-pt"), "2025-05-06T10:00:00Z")
            .await
            .unwrap();
        assert!(inserted);
        assert_eq!(feed.posts.len(), 1);

        let (feed, inserted) = append_post(&path, post("sleep-pt"), "2025-05-06T11:00:00Z")
            .await
            .unwrap();
        assert!(!inserted);
        assert_eq!(feed.posts.len(), 1);
        assert_eq!(feed.generated_at, "2025-05-06T11:00:00Z");

        let on_disk = load_feed(&path).await.unwrap().unwrap();
        assert_eq!(on_disk, feed);
    }

    #[tokio::test]
    async fn test_append_prepends_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site_feed.json");
        let mut existing = Feed::new("2025-05-05T10:00:00Z");
        existing.posts.push(post("water-pt"));
        write_document(&existing, &path).await.unwrap();

        let (feed, _) = append_post(&path, post("food-pt"), "2025-05-06T10:00:00Z")
            .await
            .unwrap();
        let ids: Vec<&str> = feed.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["food-pt", "water-pt"]);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("out/site_feed.json")),
            PathBuf::from("out/site_feed.json.tmp")
        );
    }
}
