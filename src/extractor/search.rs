//! HTML search results pages.
//!
//! Unlike listing pages, search results are matched at the result-container
//! level; the headline link, press name and date text are then looked up
//! inside each container.

use super::{
    ExtractedItem, ExtractionSelector, ItemFilter, MIN_TITLE_CHARS, element_text, first_text,
    resolve_href, run_chain,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static NEWS_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"naver\.com|news").unwrap());

static DATE_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"시간|분|일|ago|^\d{4}\.\d{2}\.\d{2}").unwrap());

static TITLE_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.news_tit, a.title, a[href*='article'], a[href*='read']").unwrap()
});

static INFO: Lazy<Selector> = Lazy::new(|| Selector::parse("span.info, span.txt_inline").unwrap());

static PRESS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.info.press, a.press, span.press").unwrap());

static CHAIN: Lazy<Vec<ExtractionSelector>> = Lazy::new(|| {
    vec![
        ExtractionSelector::new("div.news_wrap", result_fields),
        ExtractionSelector::new("div.group_news > ul > li", result_fields),
        ExtractionSelector::new("ul.list_news > li", result_fields),
        ExtractionSelector::new("div.news_area", result_fields),
        ExtractionSelector::new("li.bx", result_fields),
        ExtractionSelector::new("div.api_subject_bx", result_fields),
    ]
});

static LAST_RESORT: Lazy<ExtractionSelector> = Lazy::new(|| {
    ExtractionSelector::new(
        "a[href*='article'], a[href*='read'], a[href*='news']",
        super::anchor_fields,
    )
});

static FILTER: Lazy<ItemFilter> = Lazy::new(|| ItemFilter {
    article_path: &NEWS_LINK,
    min_title_chars: MIN_TITLE_CHARS,
});

/// Headline, press and date from one result container.
fn result_fields(container: ElementRef<'_>, base: &Url) -> Option<ExtractedItem> {
    let link = container.select(&TITLE_LINK).next()?;
    let href = resolve_href(base, link.value().attr("href")?)?;
    let date_text = container
        .select(&INFO)
        .map(element_text)
        .find(|text| DATE_HINT.is_match(text));
    Some(ExtractedItem {
        title: element_text(link),
        href,
        press: first_text(container, &PRESS),
        date_text,
    })
}

/// Extract results from a search results page.
///
/// # Arguments
///
/// * `html` - The results page markup.
/// * `base` - URL relative `href`s are resolved against.
/// * `limit` - Maximum number of containers looked at per selector.
///
/// Only links that look like news (a `naver.com` host or `news` anywhere in
/// the URL) are kept.
#[instrument(level = "debug", skip_all, fields(%base, limit))]
pub fn extract_search_results(html: &str, base: &Url, limit: usize) -> Vec<ExtractedItem> {
    let document = Html::parse_document(html);
    let items = run_chain(&document, &CHAIN, &LAST_RESORT, &FILTER, base, limit);
    debug!(count = items.len(), "Extracted search results");
    items
}
