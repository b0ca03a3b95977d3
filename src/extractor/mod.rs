//! Heuristic extraction of headlines and article bodies from arbitrary HTML.
//!
//! Each goal has an ordered chain of [`ExtractionSelector`]s, compiled once
//! per process. A chain is tried in order and the first selector that yields
//! at least one valid item wins; results are never merged across selectors,
//! so unrelated regions of the page do not get mixed together. When every
//! selector comes up empty a last-resort selector is applied with the same
//! validity filters.
//!
//! | Goal | Module | Fallback |
//! |------|--------|----------|
//! | Section listing | [`listing`] | every article-path link |
//! | Search results page | [`search`] | every news-looking link |
//! | Article body | [`body`] | all paragraphs joined by newlines |

pub mod body;
pub mod listing;
pub mod search;

use crate::utils::squash_whitespace;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

pub use body::{ArticleBody, BODY_UNAVAILABLE_MESSAGE, extract_body};
pub use listing::extract_listing;
pub use search::extract_search_results;

/// Titles containing any of these phrases are page furniture, not headlines.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "언론사 선정",
    "언론사가 선정한",
    "주요기사 혹은 심충기획",
    "네이버 메인에서 보고 싶은 언론사를 구독하세요",
    "더보기",
    "전체보기",
    "load more",
    "view all",
];

/// Titles must be longer than this many characters.
pub const MIN_TITLE_CHARS: usize = 10;

/// What the caller wants out of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Headlines of a section page.
    Listing,
    /// Result entries of a search results page.
    SearchResults,
    ArticleBody,
}

/// A headline link found on a listing or search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedItem {
    pub title: String,
    /// Absolute URL.
    pub href: String,
    /// Press/outlet name printed next to the headline, if any.
    pub press: Option<String>,
    /// Raw date text printed next to the headline, if any.
    pub date_text: Option<String>,
}

impl ExtractedItem {
    /// Title prefixed with the press name when one was found: `[press] title`.
    pub fn display_title(&self) -> String {
        match self.press.as_deref() {
            Some(press) if !press.is_empty() => format!("[{press}] {}", self.title),
            _ => self.title.clone(),
        }
    }
}

/// Output of [`extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Items(Vec<ExtractedItem>),
    Body(ArticleBody),
}

impl Extraction {
    /// The extracted items; a body extraction has none.
    pub fn into_items(self) -> Vec<ExtractedItem> {
        match self {
            Extraction::Items(items) => items,
            Extraction::Body(_) => Vec::new(),
        }
    }

    /// The extracted body; an item extraction has none.
    pub fn into_body(self) -> ArticleBody {
        match self {
            Extraction::Body(body) => body,
            Extraction::Items(_) => ArticleBody::Unavailable,
        }
    }
}

/// Extract from `html` according to `mode`.
///
/// # Arguments
///
/// * `html` - The raw page markup.
/// * `mode` - Which chain to run: section headlines, search results, or the article body.
/// * `base` - URL relative links are resolved against. Unused for bodies.
/// * `limit` - Maximum number of candidates each selector looks at. Unused for bodies.
///
/// # Returns
///
/// [`Extraction::Items`] for the two link modes, [`Extraction::Body`] for
/// [`ExtractMode::ArticleBody`]. Extraction never fails; an empty item list
/// or [`ArticleBody::Unavailable`] is the "nothing found" answer.
///
/// # Examples
///
/// ```ignore
/// let base = Url::parse("https://news.naver.com")?;
/// let items = extract(&html, ExtractMode::Listing, &base, 10).into_items();
/// let body = extract(&html, ExtractMode::ArticleBody, &base, 0).into_body();
/// ```
pub fn extract(html: &str, mode: ExtractMode, base: &Url, limit: usize) -> Extraction {
    match mode {
        ExtractMode::Listing => Extraction::Items(extract_listing(html, base, limit)),
        ExtractMode::SearchResults => Extraction::Items(extract_search_results(html, base, limit)),
        ExtractMode::ArticleBody => Extraction::Body(extract_body(html)),
    }
}

/// Pulls one item out of a matched element.
pub type FieldExtractor = fn(ElementRef<'_>, &Url) -> Option<ExtractedItem>;

/// One entry of a selector chain: a CSS expression and the function that
/// turns each match into an item.
pub struct ExtractionSelector {
    pub expression: &'static str,
    selector: Selector,
    fields: FieldExtractor,
}

impl ExtractionSelector {
    /// Compile `expression`. Expressions are static, so a parse failure is a
    /// programming error.
    pub fn new(expression: &'static str, fields: FieldExtractor) -> Self {
        Self {
            expression,
            selector: Selector::parse(expression).unwrap(),
            fields,
        }
    }

    /// Apply this selector to `document`, looking at no more than `limit`
    /// matches, and keep the items `filter` accepts. Duplicate hrefs are
    /// dropped, keeping the first.
    pub fn apply(&self, document: &Html, base: &Url, filter: &ItemFilter, limit: usize) -> Vec<ExtractedItem> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for element in document.select(&self.selector).take(limit) {
            let Some(item) = (self.fields)(element, base) else {
                continue;
            };
            if filter.accepts(&item) && seen.insert(item.href.clone()) {
                items.push(item);
            }
        }
        items
    }
}

/// Validity checks applied to every candidate item.
pub struct ItemFilter {
    /// Hrefs must match this to count as an article.
    pub article_path: &'static Regex,
    pub min_title_chars: usize,
}

impl ItemFilter {
    pub fn accepts(&self, item: &ExtractedItem) -> bool {
        self.article_path.is_match(&item.href)
            && item.title.chars().count() > self.min_title_chars
            && !is_boilerplate(&item.title)
    }
}

/// True if `title` contains one of [`BOILERPLATE_PHRASES`] (case-insensitive).
pub fn is_boilerplate(title: &str) -> bool {
    let lowered = title.to_lowercase();
    BOILERPLATE_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Run `chain` in order, stopping at the first selector with a valid item;
/// fall back to `last_resort` when none qualifies.
pub fn run_chain(
    document: &Html,
    chain: &[ExtractionSelector],
    last_resort: &ExtractionSelector,
    filter: &ItemFilter,
    base: &Url,
    limit: usize,
) -> Vec<ExtractedItem> {
    for candidate in chain {
        let items = candidate.apply(document, base, filter, limit);
        debug!(selector = candidate.expression, count = items.len(), "Tried selector");
        if !items.is_empty() {
            return items;
        }
    }
    let items = last_resort.apply(document, base, filter, limit);
    debug!(selector = last_resort.expression, count = items.len(), "Applied last-resort selector");
    items
}

/// Resolve an `href` attribute against `base`, rejecting non-navigational links.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Tags that break a line when rendered; their text never runs into a neighbour's.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "article",
    "section", "blockquote",
];

/// Whitespace-normalised text content of an element.
///
/// Inline markup (`<b>`, `<mark>`, `<span>`) is transparent, so
/// `삼성<b>전자</b>,` reads `삼성전자,`. Block elements and `<br>` act as a
/// single space.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if BLOCK_TAGS.contains(&e.name()) => text.push(' '),
            _ => {}
        }
    }
    squash_whitespace(&text)
}

/// Title and href of an anchor element, nothing else.
pub fn anchor_fields(element: ElementRef<'_>, base: &Url) -> Option<ExtractedItem> {
    let href = resolve_href(base, element.value().attr("href")?)?;
    Some(ExtractedItem {
        title: element_text(element),
        href,
        press: None,
        date_text: None,
    })
}

/// Text of the first element under `scope` matching `selector`, if non-empty.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new("/article/").unwrap());

    fn base() -> Url {
        Url::parse("https://news.naver.com").unwrap()
    }

    #[test]
    fn test_is_boilerplate() {
        assert!(is_boilerplate("정치 뉴스 더보기 클릭하세요"));
        assert!(is_boilerplate("Load More stories"));
        assert!(!is_boilerplate("정부, 새로운 경제 정책 발표 예정"));
    }

    #[test]
    fn test_resolve_href() {
        let base = base();
        assert_eq!(
            resolve_href(&base, "/article/001/0001").as_deref(),
            Some("https://news.naver.com/article/001/0001")
        );
        assert_eq!(
            resolve_href(&base, "https://n.news.naver.com/mnews/article/001/0002").as_deref(),
            Some("https://n.news.naver.com/mnews/article/001/0002")
        );
        assert_eq!(resolve_href(&base, "#top"), None);
        assert_eq!(resolve_href(&base, "javascript:void(0)"), None);
        assert_eq!(resolve_href(&base, "  "), None);
    }

    #[test]
    fn test_item_filter() {
        let filter = ItemFilter {
            article_path: &ARTICLE,
            min_title_chars: MIN_TITLE_CHARS,
        };
        let mut item = ExtractedItem {
            title: "국회, 내년도 예산안 심사 본격 착수".to_string(),
            href: "https://news.naver.com/article/001/1".to_string(),
            press: None,
            date_text: None,
        };
        assert!(filter.accepts(&item));

        item.title = "짧은 제목".to_string();
        assert!(!filter.accepts(&item));

        item.title = "국회, 내년도 예산안 심사 본격 착수".to_string();
        item.href = "https://news.naver.com/section/100".to_string();
        assert!(!filter.accepts(&item));
    }

    #[test]
    fn test_display_title_with_press() {
        let mut item = ExtractedItem {
            title: "제목입니다".to_string(),
            href: "https://news.naver.com/article/1".to_string(),
            press: Some("연합뉴스".to_string()),
            date_text: None,
        };
        assert_eq!(item.display_title(), "[연합뉴스] 제목입니다");
        item.press = None;
        assert_eq!(item.display_title(), "제목입니다");
    }

    #[test]
    fn test_extract_dispatches_on_mode() {
        let html = r#"<a href="/article/001/1">국회, 내년도 예산안 심사 본격 착수</a>"#;
        match extract(html, ExtractMode::Listing, &base(), 10) {
            Extraction::Items(items) => assert_eq!(items.len(), 1),
            other => panic!("unexpected extraction: {other:?}"),
        }
        match extract(html, ExtractMode::ArticleBody, &base(), 10) {
            Extraction::Body(body) => assert_eq!(body, ArticleBody::Unavailable),
            other => panic!("unexpected extraction: {other:?}"),
        }
        assert!(matches!(
            extract(html, ExtractMode::SearchResults, &base(), 10),
            Extraction::Items(_)
        ));
    }

    #[test]
    fn test_extraction_accessors() {
        let items = Extraction::Items(Vec::new());
        assert_eq!(items.clone().into_body(), ArticleBody::Unavailable);
        assert!(items.into_items().is_empty());

        let body = Extraction::Body(ArticleBody::Extracted("본문".to_string()));
        assert!(body.clone().into_items().is_empty());
        assert_eq!(body.into_body().text(), "본문");
    }

    #[test]
    fn test_element_text_inline_markup_is_transparent() {
        let document = Html::parse_fragment(r#"<a>삼성<b>전자</b>, <mark>반도체</mark>  투자   확대</a>"#);
        let selector = Selector::parse("a").unwrap();
        let anchor = document.select(&selector).next().unwrap();
        assert_eq!(element_text(anchor), "삼성전자, 반도체 투자 확대");
    }

    #[test]
    fn test_element_text_block_breaks_become_spaces() {
        let document = Html::parse_fragment(r#"<div>첫 문단이다.<br>둘째 문단이다.<p>셋째</p></div>"#);
        let selector = Selector::parse("div").unwrap();
        let div = document.select(&selector).next().unwrap();
        assert_eq!(element_text(div), "첫 문단이다. 둘째 문단이다. 셋째");
    }
}
