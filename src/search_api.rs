//! Structured news search API client.
//!
//! The API answers `GET /v1/search/news.json?query=…&display=…&sort=sim|date`
//! with HTML-entity-encoded strings and `<b>` highlight markup in titles and
//! descriptions. Items are cleaned and turned into [`ArticleStub`]s; the
//! canonical publisher URL (`originallink`) is preferred over the
//! aggregator's proxy `link`.

use crate::dates;
use crate::error::ApiError;
use crate::fetcher::Fetcher;
use crate::models::{ArticleStub, Category, SortMode};
use crate::utils::{truncate_for_log, upcase};
use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Upper bound of the `display` parameter.
pub const MAX_DISPLAY: usize = 100;

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// The structured-search strategy, as seen by the pipeline.
pub trait SearchApi {
    async fn search(&self, keyword: &str, limit: usize, sort: SortMode) -> Result<Vec<ArticleStub>, ApiError>;
}

/// Client id/secret pair sent as request headers.
#[derive(Clone)]
pub struct ApiCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ApiCredentials {
    /// Both values present and non-blank, or `None`.
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => Some(Self {
                client_id: id,
                client_secret: secret,
            }),
            _ => None,
        }
    }
}

/// Response envelope of the search API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub last_build_date: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub display: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One search hit. All strings are entity-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub originallink: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// Remove tags, then decode HTML entities.
pub fn clean_text(raw: &str) -> String {
    let stripped = MARKUP.replace_all(raw, "");
    decode_html_entities(&stripped).trim().to_string()
}

/// Display name of the outlet that published `url`.
pub fn source_name(url: &str) -> String {
    const OUTLETS: [(&str, &str); 20] = [
        ("chosun", "조선일보"),
        ("joongang", "중앙일보"),
        ("donga", "동아일보"),
        ("hankyung", "한국경제"),
        ("khan", "경향신문"),
        ("hani", "한겨레"),
        ("sbs", "SBS"),
        ("kbs", "KBS"),
        ("mbc", "MBC"),
        ("jtbc", "JTBC"),
        ("ytn", "YTN"),
        ("yna", "연합뉴스"),
        ("yonhap", "연합뉴스"),
        ("newsis", "뉴시스"),
        ("news1", "뉴스1"),
        ("mt.co.kr", "머니투데이"),
        ("mk.co.kr", "매일경제"),
        ("sedaily", "서울경제"),
        ("edaily", "이데일리"),
        ("heraldcorp", "헤럴드경제"),
    ];

    let domain = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or_default();
    if domain.is_empty() {
        return "알 수 없음".to_string();
    }
    OUTLETS
        .iter()
        .find(|(needle, _)| domain.contains(needle))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| {
            let label = domain.trim_start_matches("www.").split('.').next().unwrap_or(domain);
            upcase(label)
        })
}

impl SearchItem {
    /// Convert into a stub, or `None` when the item carries no usable URL.
    pub fn into_stub(self) -> Option<ArticleStub> {
        let url = if self.originallink.trim().is_empty() {
            self.link.trim().to_string()
        } else {
            self.originallink.trim().to_string()
        };
        if url.is_empty() {
            warn!(title = %truncate_for_log(&self.title, 80), "Search item without URL; skipping");
            return None;
        }

        let category = match Category::from_url(&url) {
            Category::All => Category::from_url(&self.link),
            found => found,
        };
        debug!(%url, source = %source_name(&url), "Converted search item");

        Some(ArticleStub {
            title: clean_text(&self.title),
            url,
            body_preview: clean_text(&self.description),
            category,
            publish_date: dates::normalize(&self.pub_date),
        })
    }
}

/// Parse a raw search API payload into stubs.
pub fn parse_response(body: &str) -> Result<Vec<ArticleStub>, ApiError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    debug!(total = response.total, items = response.items.len(), "Parsed search response");
    Ok(response.items.into_iter().filter_map(SearchItem::into_stub).collect())
}

/// HTTP client for the structured search API.
#[derive(Debug, Clone)]
pub struct NaverSearchApi {
    fetcher: Fetcher,
    base_url: String,
    credentials: Option<ApiCredentials>,
}

impl NaverSearchApi {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>, credentials: Option<ApiCredentials>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            credentials,
        }
    }

    fn request_url(&self, keyword: &str, limit: usize, sort: SortMode) -> String {
        format!(
            "{}/v1/search/news.json?query={}&display={}&start=1&sort={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(keyword),
            limit.clamp(1, MAX_DISPLAY),
            sort.api_param()
        )
    }
}

impl SearchApi for NaverSearchApi {
    #[instrument(level = "info", skip_all, fields(%keyword, limit, ?sort))]
    async fn search(&self, keyword: &str, limit: usize, sort: SortMode) -> Result<Vec<ArticleStub>, ApiError> {
        let credentials = self.credentials.as_ref().ok_or(ApiError::MissingCredential)?;
        let url = self.request_url(keyword, limit, sort);
        let body = self
            .fetcher
            .fetch(
                &url,
                &[
                    ("X-Naver-Client-Id", credentials.client_id.as_str()),
                    ("X-Naver-Client-Secret", credentials.client_secret.as_str()),
                ],
            )
            .await?;
        let stubs = parse_response(&body)?;
        info!(count = stubs.len(), "Search API returned stubs");
        Ok(stubs)
    }
}
