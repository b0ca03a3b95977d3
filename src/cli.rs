//! Command-line interface definitions for News Digest.
//!
//! Credentials can be given as flags but are normally read from the
//! environment (`NAVER_CLIENT_ID`, `NAVER_CLIENT_SECRET`, `OPENAI_API_KEY`).
//!
//! ```sh
//! news_digest listing --category economy
//! news_digest search 반도체 --limit 10 --sort recency -o results.json
//! news_digest recommend --store saved.json --search
//! ```

use clap::{Parser, Subcommand};
use news_digest::models::{Category, SortMode};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Write JSON results to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Search API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub naver_client_id: Option<String>,

    /// Search API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub naver_client_secret: Option<String>,

    /// Summarization API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Headlines of a news section (`all` fans out over the main sections)
    Listing {
        #[arg(short = 'g', long, default_value = "all")]
        category: Category,
    },

    /// Search articles by keyword
    Search {
        keyword: String,

        /// Maximum number of results (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long, default_value = "relevance")]
        sort: SortMode,
    },

    /// Extract the readable body of an article
    Body { url: String },

    /// Extract an article body and summarize it
    Summarize { url: String },

    /// Recommend a search keyword from favorited articles
    Recommend {
        /// Saved-article store (JSON file)
        #[arg(long)]
        store: String,

        /// Also run a search for the recommended keyword
        #[arg(long)]
        search: bool,
    },

    /// Save an article to the store
    Save {
        url: String,

        #[arg(long)]
        title: String,

        #[arg(short = 'g', long, default_value = "all")]
        category: Category,

        #[arg(long)]
        store: String,
    },

    /// Mark a saved article as favorite (or clear the mark with --off)
    Favorite {
        id: u64,

        #[arg(long)]
        store: String,

        #[arg(long)]
        off: bool,
    },
}
