//! Command-line interface definitions for Wellness Feed.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Flags override values loaded from the optional YAML config file.

use crate::config::{FeedConfig, FeedSchema};
use crate::models::Language;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the Wellness Feed application.
///
/// # Examples
///
/// ```sh
/// # Static catalog, default output/site_feed.json
/// wellness_feed generate
///
/// # Ask the model for fresh entries
/// GEMINI_API_KEY=... wellness_feed generate --source remote
///
/// # Prepend one random catalog tip to the existing feed
/// wellness_feed -o ./public append --lang en
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "WELLNESS_FEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory for the feed file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Feed schema to write
    #[arg(long, value_enum)]
    pub schema: Option<FeedSchema>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build a complete feed and overwrite the feed file
    Generate {
        /// Where the content entries come from
        #[arg(short, long, value_enum, default_value_t = SourceKind::Static)]
        source: SourceKind,
    },
    /// Prepend one random catalog tip to the existing feed
    Append {
        /// Language of the appended tip
        #[arg(short, long, value_parser = parse_language)]
        lang: Option<Language>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// The built-in catalog
    Static,
    /// The generative-text API
    Remote,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

impl Cli {
    /// Apply CLI overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut FeedConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(schema) = self.schema {
            config.schema = schema;
        }
        if let Command::Append { lang: Some(lang) } = &self.command {
            config.append_lang = *lang;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_generate_defaults_to_static() {
        let cli = Cli::parse_from(["wellness_feed", "generate"]);
        assert_eq!(
            cli.command,
            Command::Generate {
                source: SourceKind::Static
            }
        );
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn test_cli_remote_with_overrides() {
        let cli = Cli::parse_from([
            "wellness_feed",
            "-o",
            "/tmp/out",
            "--schema",
            "items",
            "generate",
            "--source",
            "remote",
        ]);
        let mut config = FeedConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.schema, FeedSchema::Items);
        assert_eq!(
            cli.command,
            Command::Generate {
                source: SourceKind::Remote
            }
        );
    }

    #[test]
    fn test_cli_append_lang() {
        let cli = Cli::parse_from(["wellness_feed", "append", "--lang", "es"]);
        let mut config = FeedConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.append_lang, Language::Es);
    }

    #[test]
    fn test_cli_rejects_unknown_lang() {
        assert!(Cli::try_parse_from(["wellness_feed", "append", "--lang", "fr"]).is_err());
    }
}
