//! Data models shared by the acquisition pipeline, the extractor and the
//! recommendation engine.
//!
//! - [`ArticleStub`]: a lightweight article reference produced by acquisition
//! - [`Category`]: the closed set of news sections, backed by a static table
//! - [`FetchRequest`]: which strategy chain a caller wants to run
//! - [`Acquisition`]: stubs plus a status flag telling real data from placeholders
//! - [`SavedArticle`], [`Keyword`], [`Recommendation`]: recommendation inputs and outputs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// URL prefix reserved for fabricated stand-in stubs.
pub const PLACEHOLDER_URL_PREFIX: &str = "https://news.naver.com/test/";

/// A lightweight article reference without full body text.
///
/// The URL is the natural key: two stubs with the same URL are the same
/// article and only the first-seen copy is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStub {
    pub title: String,
    pub url: String,
    /// Short description when the source provides one; empty otherwise.
    pub body_preview: String,
    pub category: Category,
    /// Always `YYYY-MM-DD`.
    pub publish_date: String,
}

impl ArticleStub {
    /// True when this stub was fabricated by the placeholder module.
    pub fn is_placeholder(&self) -> bool {
        self.url.starts_with(PLACEHOLDER_URL_PREFIX)
    }
}

/// Row of the category table.
struct CategoryInfo {
    category: Category,
    section_id: Option<&'static str>,
    display_name: &'static str,
    color: u32,
}

const CATEGORY_TABLE: [CategoryInfo; 7] = [
    CategoryInfo { category: Category::All, section_id: None, display_name: "전체", color: 0xFF6200EE },
    CategoryInfo { category: Category::Politics, section_id: Some("100"), display_name: "정치", color: 0xFF1976D2 },
    CategoryInfo { category: Category::Economy, section_id: Some("101"), display_name: "경제", color: 0xFF388E3C },
    CategoryInfo { category: Category::Society, section_id: Some("102"), display_name: "사회", color: 0xFFD32F2F },
    CategoryInfo { category: Category::Life, section_id: Some("103"), display_name: "생활", color: 0xFFFFA000 },
    CategoryInfo { category: Category::World, section_id: Some("104"), display_name: "세계", color: 0xFF0097A7 },
    CategoryInfo { category: Category::It, section_id: Some("105"), display_name: "IT/과학", color: 0xFF7B1FA2 },
];

/// News sections. Unknown upstream section codes map to [`Category::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    All,
    Politics,
    Economy,
    Society,
    Life,
    World,
    It,
}

impl Category {
    /// Categories fetched when a listing request targets [`Category::All`].
    pub const FANOUT: [Category; 5] = [
        Category::Politics,
        Category::Economy,
        Category::Society,
        Category::Life,
        Category::It,
    ];

    fn info(self) -> &'static CategoryInfo {
        // Table is indexed in declaration order.
        &CATEGORY_TABLE[self as usize]
    }

    /// Upstream section identifier, `None` for [`Category::All`].
    pub fn section_id(self) -> Option<&'static str> {
        self.info().section_id
    }

    /// Korean label shown to readers, e.g. `정치` or `IT/과학`.
    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    /// ARGB display color.
    pub fn color(self) -> u32 {
        self.info().color
    }

    /// Reverse lookup by upstream section identifier.
    pub fn from_section_id(section_id: &str) -> Category {
        CATEGORY_TABLE
            .iter()
            .find(|row| row.section_id == Some(section_id))
            .map(|row| row.category)
            .unwrap_or(Category::All)
    }

    /// Derive a category from section hints embedded in an article URL
    /// (`/section/101` or `sid=101`).
    pub fn from_url(url: &str) -> Category {
        CATEGORY_TABLE
            .iter()
            .filter_map(|row| row.section_id.map(|id| (row.category, id)))
            .find(|(_, id)| {
                url.contains(&format!("/section/{id}")) || url.contains(&format!("sid={id}"))
            })
            .map(|(category, _)| category)
            .unwrap_or(Category::All)
    }

    /// Concrete categories a listing request for `self` expands to.
    pub fn expand(self) -> Vec<Category> {
        match self {
            Category::All => Category::FANOUT.to_vec(),
            other => vec![other],
        }
    }

    /// Lowercase identifier used on the command line and in placeholder URLs.
    pub fn slug(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Politics => "politics",
            Category::Economy => "economy",
            Category::Society => "society",
            Category::Life => "life",
            Category::World => "world",
            Category::It => "it",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        CATEGORY_TABLE
            .iter()
            .map(|row| row.category)
            .find(|c| c.slug() == lowered || c.display_name() == s.trim())
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Search result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Recency,
}

impl SortMode {
    /// `sort` parameter of the structured search API.
    pub fn api_param(self) -> &'static str {
        match self {
            SortMode::Relevance => "sim",
            SortMode::Recency => "date",
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" | "sim" => Ok(SortMode::Relevance),
            "recency" | "date" => Ok(SortMode::Recency),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

/// A logical acquisition request; selects which strategy chain runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Listing {
        category: Category,
    },
    Search {
        keyword: String,
        result_limit: usize,
        sort_mode: SortMode,
    },
}

/// How trustworthy an [`Acquisition`] result is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionStatus {
    /// Every stub came from the upstream source.
    Live,
    /// Some requested categories were substituted with placeholders.
    Partial,
    /// Every stub is a placeholder.
    Placeholder,
    /// Nothing was acquired and placeholder substitution is disabled.
    Empty,
}

/// Result of a listing or search acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquisition {
    pub status: AcquisitionStatus,
    pub stubs: Vec<ArticleStub>,
}

impl Acquisition {
    /// Wrap stubs that all came from the upstream source.
    pub fn live(stubs: Vec<ArticleStub>) -> Self {
        Self {
            status: AcquisitionStatus::Live,
            stubs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}

/// An article previously saved by the user.
///
/// Only the fields the pipeline and recommendation engine look at are
/// modelled; storage concerns live in [`crate::store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArticle {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub is_summarized: bool,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_test: bool,
}

impl SavedArticle {
    pub fn from_stub(stub: &ArticleStub, timestamp: i64) -> Self {
        Self {
            id: 0,
            title: stub.title.clone(),
            url: stub.url.clone(),
            content: stub.body_preview.clone(),
            summary: String::new(),
            timestamp,
            is_summarized: false,
            category: stub.category,
            is_favorite: false,
            is_test: stub.is_placeholder(),
        }
    }
}

/// A candidate keyword and how often it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub frequency: usize,
}

/// Output of the recommendation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub keyword: Keyword,
    /// How many liked titles contain the keyword verbatim.
    pub matching_articles: usize,
    pub reason: String,
}
