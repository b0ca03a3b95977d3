//! Section listing pages.
//!
//! Headline selectors are tried from most to least specific. The press name
//! and date text are read from the headline's parent block when present.

use super::{
    ExtractedItem, ExtractionSelector, ItemFilter, MIN_TITLE_CHARS, element_text, first_text,
    resolve_href, run_chain,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static ARTICLE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/article/").unwrap());

static PRESS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.sa_text_press, span.sa_text_press").unwrap());

static DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.sa_text_datetime, span.sa_time").unwrap());

static CHAIN: Lazy<Vec<ExtractionSelector>> = Lazy::new(|| {
    vec![
        ExtractionSelector::new("div.sa_text > a.sa_text_title", headline_fields),
        ExtractionSelector::new("ul.sa_list > li > div > a", headline_fields),
        ExtractionSelector::new("ul.sa_list a[href*='/article/']", headline_fields),
        ExtractionSelector::new("a[href*='/article/']", headline_fields),
        ExtractionSelector::new("div.section_latest a.sa_text_title", headline_fields),
        ExtractionSelector::new("div.cluster_text > a", headline_fields),
        ExtractionSelector::new("div.sa_item a.sa_text_title", headline_fields),
        ExtractionSelector::new("li.sa_item a[href*='/article/']", headline_fields),
    ]
});

static LAST_RESORT: Lazy<ExtractionSelector> =
    Lazy::new(|| ExtractionSelector::new("a[href*='/article/']", super::anchor_fields));

static FILTER: Lazy<ItemFilter> = Lazy::new(|| ItemFilter {
    article_path: &ARTICLE_PATH,
    min_title_chars: MIN_TITLE_CHARS,
});

/// Anchor title/href plus press and date from the enclosing block.
fn headline_fields(element: ElementRef<'_>, base: &Url) -> Option<ExtractedItem> {
    let href = resolve_href(base, element.value().attr("href")?)?;
    let parent = element.parent().and_then(ElementRef::wrap);
    Some(ExtractedItem {
        title: element_text(element),
        href,
        press: parent.and_then(|p| first_text(p, &PRESS)),
        date_text: parent.and_then(|p| first_text(p, &DATE)),
    })
}

/// Extract headline links from a section listing page.
///
/// # Arguments
///
/// * `html` - The section page markup.
/// * `base` - URL relative `href`s are resolved against.
/// * `limit` - At most this many matches of each selector are considered,
///   so the result never holds more than `limit` items.
///
/// # Returns
///
/// Items in page order with unique absolute hrefs. Titles are longer than
/// [`MIN_TITLE_CHARS`] and free of boilerplate; press and date text are
/// filled in when the headline block carries them. Empty when nothing on the
/// page qualifies.
///
/// # Examples
///
/// ```ignore
/// let base = Url::parse("https://news.naver.com")?;
/// let items = extract_listing(&html, &base, 10);
/// for item in &items {
///     println!("{} {}", item.display_title(), item.href);
/// }
/// ```
#[instrument(level = "debug", skip_all, fields(%base, limit))]
pub fn extract_listing(html: &str, base: &Url, limit: usize) -> Vec<ExtractedItem> {
    let document = Html::parse_document(html);
    let items = run_chain(&document, &CHAIN, &LAST_RESORT, &FILTER, base, limit);
    debug!(count = items.len(), "Extracted listing items");
    items
}
