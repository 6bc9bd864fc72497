//! Output generation for the feed file.
//!
//! # Submodules
//!
//! - [`json`]: Reads, writes and appends to the JSON feed
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── site_feed.json
//! ```

pub mod json;
