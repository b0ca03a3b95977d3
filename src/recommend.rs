//! Keyword recommendation from favorited articles.
//!
//! Titles of the liked articles are tokenised, stripped of function words,
//! generic newsroom vocabulary and outlet names, and ranked by frequency.
//! The most frequent token becomes the recommended search keyword. Ties go
//! to the token seen first.

use crate::models::{Category, Keyword, Recommendation, SavedArticle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Tokens shorter than this are ignored.
pub const MIN_TOKEN_CHARS: usize = 2;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^가-힣a-zA-Z0-9\s]").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "이", "그", "저", "것", "수", "등", "및", "의", "를", "을", "가", "에", "와", "과", "도",
        "으로", "로", "에서", "부터", "까지", "에게", "한", "할", "하다", "있다", "되다", "하는",
        "있는", "되는", "될", "된", "는", "은", "기자", "뉴스", "오늘", "내일", "어제", "오전",
        "오후", "지난", "다음", "이번", "관련", "통해", "대한", "위한", "따른", "위해", "대해",
        "관한", "같은", "이런", "저런", "위원회", "협회", "본부", "센터", "재단", "연구소",
    ]
    .into_iter()
    .collect()
});

/// Substrings that mark a token as a media outlet name.
const MEDIA_PATTERNS: [&str; 19] = [
    "일보", "신문", "타임즈", "데일리", "뉴스", "저널", "포스트", "헤럴드", "투데이", "매일",
    "중앙", "동아", "조선", "한겨레", "경향", "TV", "방송", "미디어", "신문사",
];

fn is_media_name(token: &str) -> bool {
    MEDIA_PATTERNS.iter().any(|pattern| token.contains(pattern))
}

/// Candidate tokens of `title`, in order of appearance.
pub fn tokenize(title: &str) -> Vec<String> {
    NON_WORD
        .replace_all(title, " ")
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .filter(|token| !is_media_name(token))
        .map(str::to_string)
        .collect()
}

/// Every keyword across `liked` titles, most frequent first; ties keep
/// first-encountered order.
pub fn rank_keywords(liked: &[SavedArticle]) -> Vec<Keyword> {
    let text = liked
        .iter()
        .map(|article| article.title.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<Keyword> = Vec::new();
    for token in tokenize(&text) {
        match index.get(&token) {
            Some(&i) => counts[i].frequency += 1,
            None => {
                index.insert(token.clone(), counts.len());
                counts.push(Keyword {
                    term: token,
                    frequency: 1,
                });
            }
        }
    }

    // stable: equal frequencies stay in insertion order
    counts.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    counts
}

/// The `n` most frequent keywords.
pub fn top_keywords(liked: &[SavedArticle], n: usize) -> Vec<Keyword> {
    let mut ranked = rank_keywords(liked);
    ranked.truncate(n);
    ranked
}

/// Most common category among `liked`; ties go to the category seen first.
pub fn favorite_category(liked: &[SavedArticle]) -> Option<Category> {
    let mut tally: Vec<(Category, usize)> = Vec::new();
    for article in liked {
        match tally.iter_mut().find(|(c, _)| *c == article.category) {
            Some((_, n)) => *n += 1,
            None => tally.push((article.category, 1)),
        }
    }
    tally
        .into_iter()
        .fold(None, |best: Option<(Category, usize)>, (c, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((c, n)),
        })
        .map(|(c, _)| c)
}

/// Human-readable justification for recommending `term`.
pub fn reason_for(term: &str, matching_articles: usize) -> String {
    format!("즐겨찾기한 기사 중 '{term}' 관련 뉴스가 {matching_articles}개 있어 추천드립니다")
}

/// Recommend a search keyword from `liked`.
///
/// # Arguments
///
/// * `liked` - Articles the user favorited. Only titles are read and the
///   slice is never modified.
///
/// # Returns
///
/// The highest-ranked keyword (most frequent, ties broken by first
/// appearance) with the number of liked titles containing it and a reason
/// line, or `None` when no usable token remains after stop-word and
/// media-name filtering.
///
/// # Examples
///
/// ```ignore
/// let liked = store.list_favorites();
/// if let Some(rec) = recommend(&liked) {
///     println!("{} ({})", rec.keyword.term, rec.reason);
/// }
/// ```
#[instrument(level = "info", skip_all, fields(liked = liked.len()))]
pub fn recommend(liked: &[SavedArticle]) -> Option<Recommendation> {
    let keyword = rank_keywords(liked).into_iter().next()?;
    let matching_articles = liked
        .iter()
        .filter(|article| article.title.contains(&keyword.term))
        .count();
    debug!(term = %keyword.term, frequency = keyword.frequency, "Top keyword");

    let reason = reason_for(&keyword.term, matching_articles);
    info!(term = %keyword.term, matching_articles, "Recommended keyword");
    Some(Recommendation {
        keyword,
        matching_articles,
        reason,
    })
}
