//! Acquisition pipeline.
//!
//! Turns a [`FetchRequest`] into an [`Acquisition`]: an ordered,
//! URL-deduplicated list of [`ArticleStub`]s plus a status flag.
//!
//! - **Listing**: `ALL` fans out to [`Category::FANOUT`]; every section is
//!   fetched concurrently and results are concatenated in fan-out order.
//!   Stubs whose URL an earlier section already produced are dropped. A
//!   section that fails, yields nothing, or is left with nothing after that
//!   dedup is substituted with placeholders (when enabled), so every
//!   requested category is represented.
//! - **Search**: the strategies in [`SEARCH_CHAIN`] are tried in order and
//!   the first one that produces at least one stub wins. A failing strategy
//!   counts as zero results; nothing is retried in place.
//!
//! The pipeline holds no mutable state, so one instance can serve any number
//! of concurrent requests. Each `*_cancellable` variant races the work
//! against a [`CancelSignal`] and returns [`Cancelled`] as soon as it fires.

use crate::config::{Config, LimitsConfig};
use crate::dates;
use crate::error::{Cancelled, ConfigError, FetchError, StrategyError};
use crate::extractor::{ArticleBody, ExtractMode, ExtractedItem, extract};
use crate::fetcher::PageSource;
use crate::models::{
    Acquisition, AcquisitionStatus, ArticleStub, Category, FetchRequest, PLACEHOLDER_URL_PREFIX, Recommendation,
    SavedArticle, SortMode,
};
use crate::placeholder;
use crate::recommend;
use crate::search_api::{MAX_DISPLAY, SearchApi};
use crate::utils::today;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use url::Url;

/// Search strategies, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Structured search API.
    Api,
    /// HTML search results page.
    PageScrape,
}

pub const SEARCH_CHAIN: [SearchStrategy; 2] = [SearchStrategy::Api, SearchStrategy::PageScrape];

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Receiver side of a cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // keep the value readable after the sender is gone
        drop(tx);
        Self(rx)
    }

    /// A signal that fires once `timeout` has elapsed.
    pub fn after(timeout: Duration) -> Self {
        let (handle, signal) = cancel_pair();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            handle.cancel();
        });
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the signal fires; never resolves if the handle is
    /// dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.0.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A connected cancellation handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(rx))
}

/// Drive `work` to completion unless `signal` fires first.
pub async fn run_cancellable<T>(signal: &CancelSignal, work: impl Future<Output = T>) -> Result<T, Cancelled> {
    let mut signal = signal.clone();
    if signal.is_cancelled() {
        return Err(Cancelled);
    }
    tokio::select! {
        biased;
        _ = signal.cancelled() => Err(Cancelled),
        out = work => Ok(out),
    }
}

/// Drop later stubs whose URL was already seen.
pub fn dedup_by_url(stubs: Vec<ArticleStub>) -> Vec<ArticleStub> {
    stubs.into_iter().unique_by(|stub| stub.url.clone()).collect()
}

fn item_to_stub(item: ExtractedItem, category: Category, today: NaiveDate) -> ArticleStub {
    ArticleStub {
        title: item.display_title(),
        publish_date: dates::normalize_on(item.date_text.as_deref().unwrap_or_default(), today),
        url: item.href,
        body_preview: String::new(),
        category,
    }
}

/// `sort` and `nso` parameters of the HTML search page.
fn page_sort_params(sort: SortMode) -> (&'static str, &'static str) {
    match sort {
        SortMode::Relevance => ("0", "so:r,p:all,a:all"),
        SortMode::Recency => ("1", "so:dd,p:all,a:all"),
    }
}

/// The acquisition pipeline, generic over its page and search API sources.
#[derive(Debug)]
pub struct Pipeline<P, A> {
    pages: P,
    api: A,
    listing_base: Url,
    search_base: Url,
    limits: LimitsConfig,
    placeholders: bool,
}

impl<P: PageSource, A: SearchApi> Pipeline<P, A> {
    /// Build a pipeline over `pages` and `api`.
    ///
    /// # Arguments
    ///
    /// * `pages` - Source of raw HTML for section, search and article pages.
    /// * `api` - The structured search API tried before the results page.
    /// * `config` - Base URLs, per-request limits and the placeholder switch.
    ///
    /// # Returns
    ///
    /// A `ConfigError` if either configured base URL does not parse.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let fetcher = Fetcher::new(&config.http)?;
    /// let api = NaverSearchApi::new(fetcher.clone(), config.sources.search_api_base.clone(), None);
    /// let pipeline = Pipeline::new(fetcher, api, &config)?;
    /// ```
    pub fn new(pages: P, api: A, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            pages,
            api,
            listing_base: Url::parse(&config.sources.listing_base)?,
            search_base: Url::parse(&config.sources.search_page_base)?,
            limits: config.limits.clone(),
            placeholders: config.placeholders,
        })
    }

    /// Default search result limit.
    pub fn search_limit(&self) -> usize {
        self.limits.search_results
    }

    /// Run whichever chain `request` selects.
    pub async fn acquire(&self, request: &FetchRequest) -> Acquisition {
        match request {
            FetchRequest::Listing { category } => self.acquire_listing(*category).await,
            FetchRequest::Search {
                keyword,
                result_limit,
                sort_mode,
            } => self.acquire_search(keyword, *result_limit, *sort_mode).await,
        }
    }

    fn section_url(&self, category: Category) -> Result<Url, FetchError> {
        let section = category
            .section_id()
            .ok_or_else(|| FetchError::InvalidUrl(format!("{category} has no section page")))?;
        self.listing_base
            .join(&format!("/section/{section}"))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }

    async fn scrape_section(&self, category: Category, limit: usize) -> Result<Vec<ArticleStub>, FetchError> {
        let url = self.section_url(category)?;
        let html = self.pages.fetch_page(url.as_str()).await?;
        let today = today();
        Ok(extract(&html, ExtractMode::Listing, &self.listing_base, limit)
            .into_items()
            .into_iter()
            .map(|item| item_to_stub(item, category, today))
            .collect())
    }

    /// Headlines for `category`.
    ///
    /// # Arguments
    ///
    /// * `category` - A concrete section, or [`Category::All`] to fan out over
    ///   [`Category::FANOUT`] with the smaller per-category cap.
    ///
    /// # Returns
    ///
    /// Stubs grouped by category in fan-out order, unique by URL. Every
    /// requested category contributes at least one stub unless placeholders
    /// are disabled. The status is `Live` when no section needed substituting,
    /// `Placeholder` when all of them did, and `Partial` otherwise.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let acquisition = pipeline.acquire_listing(Category::All).await;
    /// for stub in &acquisition.stubs {
    ///     println!("{} {}", stub.category, stub.title);
    /// }
    /// ```
    #[instrument(level = "info", skip_all, fields(%category))]
    pub async fn acquire_listing(&self, category: Category) -> Acquisition {
        let t0 = Instant::now();
        let targets = category.expand();
        let limit = if category == Category::All {
            self.limits.per_category_fanout
        } else {
            self.limits.per_category
        };

        // `buffered` keeps results in target order even though sections load concurrently
        let results: Vec<(Category, Result<Vec<ArticleStub>, FetchError>)> = stream::iter(targets.iter().copied())
            .map(|target| async move { (target, self.scrape_section(target, limit).await) })
            .buffered(targets.len().max(1))
            .collect()
            .await;

        let today = today();
        let mut seen = HashSet::new();
        let mut stubs = Vec::new();
        let mut substituted = 0;
        for (target, result) in results {
            match result {
                Ok(found) if !found.is_empty() => {
                    let scraped = found.len();
                    let fresh: Vec<ArticleStub> = found.into_iter().filter(|s| seen.insert(s.url.clone())).collect();
                    if !fresh.is_empty() {
                        info!(category = %target, count = fresh.len(), dropped = scraped - fresh.len(), "Section scraped");
                        stubs.extend(fresh);
                        continue;
                    }
                    warn!(category = %target, scraped, "Every headline already listed under an earlier section");
                }
                Ok(_) => warn!(category = %target, "Section yielded no headlines"),
                Err(e) => warn!(category = %target, error = %e, "Section fetch failed"),
            }
            substituted += 1;
            if self.placeholders {
                let fill = placeholder::listing_placeholders(target, limit, today);
                stubs.extend(fill.into_iter().filter(|s| seen.insert(s.url.clone())));
            }
        }

        let status = match (substituted, self.placeholders) {
            (0, _) => AcquisitionStatus::Live,
            (_, false) if stubs.is_empty() => AcquisitionStatus::Empty,
            (_, false) => AcquisitionStatus::Live,
            (n, true) if n == targets.len() => AcquisitionStatus::Placeholder,
            (_, true) => AcquisitionStatus::Partial,
        };
        info!(
            count = stubs.len(),
            substituted,
            ?status,
            elapsed_ms = t0.elapsed().as_millis(),
            "Listing acquired"
        );
        Acquisition { status, stubs }
    }

    fn search_page_url(&self, keyword: &str, sort: SortMode) -> Result<Url, FetchError> {
        let mut url = self
            .search_base
            .join("/search.naver")
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let (sort_param, nso) = page_sort_params(sort);
        url.query_pairs_mut()
            .append_pair("where", "news")
            .append_pair("query", keyword)
            .append_pair("sm", "tab_opt")
            .append_pair("sort", sort_param)
            .append_pair("nso", nso);
        Ok(url)
    }

    async fn scrape_search_page(
        &self,
        keyword: &str,
        limit: usize,
        sort: SortMode,
    ) -> Result<Vec<ArticleStub>, FetchError> {
        let url = self.search_page_url(keyword, sort)?;
        let html = self.pages.fetch_page(url.as_str()).await?;
        let today = today();
        Ok(extract(&html, ExtractMode::SearchResults, &self.search_base, limit)
            .into_items()
            .into_iter()
            .map(|item| {
                let category = Category::from_url(&item.href);
                item_to_stub(item, category, today)
            })
            .collect())
    }

    async fn run_strategy(
        &self,
        strategy: SearchStrategy,
        keyword: &str,
        limit: usize,
        sort: SortMode,
    ) -> Result<Vec<ArticleStub>, StrategyError> {
        match strategy {
            SearchStrategy::Api => Ok(self.api.search(keyword, limit, sort).await?),
            SearchStrategy::PageScrape => Ok(self.scrape_search_page(keyword, limit, sort).await?),
        }
    }

    fn search_fallback(&self, keyword: &str) -> Acquisition {
        if !self.placeholders {
            warn!("Search produced nothing and placeholders are disabled");
            return Acquisition {
                status: AcquisitionStatus::Empty,
                stubs: Vec::new(),
            };
        }
        warn!("Search produced nothing; returning placeholders");
        Acquisition {
            status: AcquisitionStatus::Placeholder,
            stubs: placeholder::search_placeholders(keyword, today()),
        }
    }

    /// Search for `keyword`, returning at most `limit` stubs.
    ///
    /// # Arguments
    ///
    /// * `keyword` - Search terms; surrounding whitespace is ignored.
    /// * `limit` - Result cap, clamped to `1..=100`.
    /// * `sort` - Relevance or recency ordering, passed to every strategy.
    ///
    /// # Returns
    ///
    /// The first non-empty strategy result as a `Live` acquisition. When
    /// every strategy fails or comes back empty, or the keyword is blank,
    /// keyword-tagged placeholders (or an `Empty` acquisition when
    /// placeholders are disabled).
    #[instrument(level = "info", skip_all, fields(%keyword, limit, ?sort))]
    pub async fn acquire_search(&self, keyword: &str, limit: usize, sort: SortMode) -> Acquisition {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            warn!("Blank keyword; skipping search strategies");
            return self.search_fallback(keyword);
        }
        let limit = limit.clamp(1, MAX_DISPLAY);

        for strategy in SEARCH_CHAIN {
            let t0 = Instant::now();
            match self.run_strategy(strategy, keyword, limit, sort).await {
                Ok(found) if !found.is_empty() => {
                    let mut stubs = dedup_by_url(found);
                    stubs.truncate(limit);
                    info!(
                        ?strategy,
                        count = stubs.len(),
                        elapsed_ms = t0.elapsed().as_millis(),
                        "Search strategy succeeded"
                    );
                    return Acquisition::live(stubs);
                }
                Ok(_) => info!(?strategy, "Search strategy returned nothing; trying next"),
                Err(e) => warn!(?strategy, error = %e, "Search strategy failed; trying next"),
            }
        }
        self.search_fallback(keyword)
    }

    /// Fetch and extract the readable body of the article at `url`.
    ///
    /// A page without usable text is [`ArticleBody::Unavailable`], not an
    /// error. Placeholder URLs are never fetched.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let body = pipeline.fetch_body("https://n.news.naver.com/mnews/article/001/0015000000").await?;
    /// println!("{}", body.text());
    /// ```
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch_body(&self, url: &str) -> Result<ArticleBody, FetchError> {
        if url.starts_with(PLACEHOLDER_URL_PREFIX) {
            info!("Placeholder URL has no body");
            return Ok(ArticleBody::Unavailable);
        }
        let html = self.pages.fetch_page(url).await?;
        Ok(extract(&html, ExtractMode::ArticleBody, &self.listing_base, 0).into_body())
    }

    /// Recommend a keyword from `liked` and search for it by relevance.
    ///
    /// Returns `None` when no keyword can be derived, in which case no
    /// search is made.
    pub async fn acquire_recommended(&self, liked: &[SavedArticle]) -> Option<(Recommendation, Acquisition)> {
        let recommendation = recommend::recommend(liked)?;
        let acquisition = self
            .acquire_search(&recommendation.keyword.term, self.limits.search_results, SortMode::Relevance)
            .await;
        Some((recommendation, acquisition))
    }

    pub async fn acquire_listing_cancellable(
        &self,
        category: Category,
        signal: &CancelSignal,
    ) -> Result<Acquisition, Cancelled> {
        run_cancellable(signal, self.acquire_listing(category)).await
    }

    pub async fn acquire_search_cancellable(
        &self,
        keyword: &str,
        limit: usize,
        sort: SortMode,
        signal: &CancelSignal,
    ) -> Result<Acquisition, Cancelled> {
        run_cancellable(signal, self.acquire_search(keyword, limit, sort)).await
    }

    pub async fn fetch_body_cancellable(&self, url: &str, signal: &CancelSignal) -> Result<ArticleBody, FetchError> {
        run_cancellable(signal, self.fetch_body(url)).await?
    }
}
