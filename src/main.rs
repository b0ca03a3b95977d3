//! # News Digest
//!
//! Command-line driver for the `news_digest` library: section listings,
//! keyword search, article body extraction, AI summaries, and keyword
//! recommendations from favorited articles.
//!
//! ## Usage
//!
//! ```sh
//! news_digest listing --category all
//! news_digest search 반도체 --sort recency
//! news_digest summarize https://n.news.naver.com/mnews/article/001/0015000000
//! ```
//!
//! Results are printed as JSON on stdout (or written to `--output`); logs go
//! to stderr. Ctrl-C abandons an in-flight listing, search or body fetch.

use clap::Parser;
use news_digest::config::Config;
use news_digest::fetcher::Fetcher;
use news_digest::models::SavedArticle;
use news_digest::output::write_json;
use news_digest::pipeline::{CancelSignal, Pipeline, cancel_pair};
use news_digest::recommend;
use news_digest::search_api::{ApiCredentials, NaverSearchApi};
use news_digest::store::{ArticleStore, MemoryStore};
use news_digest::summarize::{ChatCompletionClient, Summarize};
use news_digest::utils::now_millis;
use serde_json::json;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

/// Number of keywords listed next to a recommendation.
const TOP_KEYWORDS: usize = 5;

/// A signal that fires on Ctrl-C.
fn interrupt_signal() -> CancelSignal {
    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling");
            handle.cancel();
        }
    });
    signal
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_digest starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, config = ?args.config, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref()).await?;
    let fetcher = Fetcher::new(&config.http)?;
    let credentials = ApiCredentials::from_parts(args.naver_client_id.clone(), args.naver_client_secret.clone());
    if credentials.is_none() {
        info!("Search API credentials not set; searches will use the results page only");
    }
    let api = NaverSearchApi::new(fetcher.clone(), config.sources.search_api_base.clone(), credentials);
    let pipeline = Pipeline::new(fetcher, api, &config)?;
    let output = args.output.as_deref();

    match args.command {
        Command::Listing { category } => {
            let acquisition = pipeline
                .acquire_listing_cancellable(category, &interrupt_signal())
                .await?;
            write_json(&acquisition, output).await?;
        }

        Command::Search { keyword, limit, sort } => {
            let limit = limit.unwrap_or(pipeline.search_limit());
            let acquisition = pipeline
                .acquire_search_cancellable(&keyword, limit, sort, &interrupt_signal())
                .await?;
            write_json(&acquisition, output).await?;
        }

        Command::Body { url } => {
            let body = pipeline.fetch_body_cancellable(&url, &interrupt_signal()).await?;
            write_json(&json!({ "url": url, "body": body }), output).await?;
        }

        Command::Summarize { url } => {
            let body = pipeline.fetch_body_cancellable(&url, &interrupt_signal()).await?;
            if !body.is_available() {
                warn!(%url, "No body to summarize");
                return Err(body.text().into());
            }
            let summarizer = ChatCompletionClient::new(config.summarizer.clone(), args.openai_api_key.clone())?;
            match summarizer.summarize(body.text()).await {
                Ok(summary) => {
                    write_json(&json!({ "url": url, "body": body, "summary": summary }), output).await?;
                }
                Err(e) => {
                    error!(%url, error = %e, "Summarization failed");
                    return Err(e.user_message().into());
                }
            }
        }

        Command::Recommend { store, search } => {
            let store = MemoryStore::load(Path::new(&store)).await?;
            let liked = store.list_favorites();
            info!(liked = liked.len(), "Loaded favorites");
            let top_keywords = recommend::top_keywords(&liked, TOP_KEYWORDS);
            let favorite_category = recommend::favorite_category(&liked);

            let (recommendation, acquisition) = if search {
                match pipeline.acquire_recommended(&liked).await {
                    Some((recommendation, acquisition)) => (Some(recommendation), Some(acquisition)),
                    None => (None, None),
                }
            } else {
                (recommend::recommend(&liked), None)
            };
            if recommendation.is_none() {
                warn!("No keyword could be recommended");
            }

            write_json(
                &json!({
                    "recommendation": recommendation,
                    "top_keywords": top_keywords,
                    "favorite_category": favorite_category,
                    "results": acquisition,
                }),
                output,
            )
            .await?;
        }

        Command::Save {
            url,
            title,
            category,
            store: store_path,
        } => {
            let path = Path::new(&store_path);
            let mut store = MemoryStore::load(path).await?;
            let is_test = url.starts_with(news_digest::models::PLACEHOLDER_URL_PREFIX);
            let id = store.insert(SavedArticle {
                id: 0,
                title,
                url,
                content: String::new(),
                summary: String::new(),
                timestamp: now_millis(),
                is_summarized: false,
                category,
                is_favorite: false,
                is_test,
            });
            store.save(path).await?;
            write_json(&store.get(id), output).await?;
        }

        Command::Favorite {
            id,
            store: store_path,
            off,
        } => {
            let path = Path::new(&store_path);
            let mut store = MemoryStore::load(path).await?;
            store.toggle_favorite(id, !off)?;
            store.save(path).await?;
            write_json(&store.get(id), output).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs(),
        elapsed_ms = elapsed.as_millis(),
        "news_digest finished"
    );
    Ok(())
}
