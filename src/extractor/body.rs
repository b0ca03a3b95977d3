//! Article body extraction.

use super::element_text;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Extracted text must be longer than this many characters.
pub const MIN_BODY_CHARS: usize = 100;

/// Shown in place of a body that could not be extracted.
pub const BODY_UNAVAILABLE_MESSAGE: &str = "본문을 가져올 수 없습니다. 원문 링크를 확인해주세요.";

const CONTAINER_EXPRESSIONS: [&str; 8] = [
    "#dic_area",
    "#articeBody",
    "article#dic_area",
    "div#articleBodyContents",
    ".article_body",
    "#newsEndContents",
    ".end_body_wrp",
    "div.article_view",
];

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTAINER_EXPRESSIONS
        .iter()
        .map(|expr| Selector::parse(expr).unwrap())
        .collect()
});

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Outcome of body extraction. `Unavailable` is a valid terminal result, not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ArticleBody {
    Extracted(String),
    Unavailable,
}

impl ArticleBody {
    /// Body text, or the sentinel message when unavailable.
    pub fn text(&self) -> &str {
        match self {
            ArticleBody::Extracted(text) => text,
            ArticleBody::Unavailable => BODY_UNAVAILABLE_MESSAGE,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ArticleBody::Extracted(_))
    }
}

fn long_enough(text: &str) -> bool {
    text.chars().count() > MIN_BODY_CHARS
}

/// Extract readable article text from `html`.
///
/// Content containers are tried in order; the first whose text is long
/// enough is returned. Otherwise every paragraph on the page is joined by
/// newlines. If that is also too short the body is unavailable.
///
/// # Returns
///
/// [`ArticleBody::Extracted`] with trimmed text longer than
/// [`MIN_BODY_CHARS`] characters, or [`ArticleBody::Unavailable`].
///
/// # Examples
///
/// ```ignore
/// let body = extract_body(&html);
/// if body.is_available() {
///     println!("{}", body.text());
/// }
/// ```
#[instrument(level = "debug", skip_all)]
pub fn extract_body(html: &str) -> ArticleBody {
    let document = Html::parse_document(html);

    for (expression, selector) in CONTAINER_EXPRESSIONS.iter().zip(CONTAINERS.iter()) {
        let text = document
            .select(selector)
            .map(element_text)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        if long_enough(&text) {
            info!(selector = expression, chars = text.chars().count(), "Extracted body from container");
            return ArticleBody::Extracted(text);
        }
    }

    debug!("No content container qualified; collecting paragraphs");
    let paragraphs = document
        .select(&PARAGRAPH)
        .map(element_text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    if long_enough(&paragraphs) {
        info!(chars = paragraphs.chars().count(), "Extracted body from paragraphs");
        return ArticleBody::Extracted(paragraphs);
    }

    warn!("Article body unavailable");
    ArticleBody::Unavailable
}
