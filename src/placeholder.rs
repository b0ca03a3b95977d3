//! Fabricated stand-in stubs.
//!
//! Used only when real acquisition produced nothing and the configuration
//! allows substitution. Every stub made here has a `[test]` title prefix and
//! a URL under [`PLACEHOLDER_URL_PREFIX`], so
//! [`ArticleStub::is_placeholder`] can always tell them apart from real data.

use crate::models::{ArticleStub, Category, PLACEHOLDER_URL_PREFIX};
use chrono::NaiveDate;

const TITLE_PREFIX: &str = "[test]";

fn sample_titles(category: Category) -> &'static [&'static str] {
    match category {
        Category::Politics => &[
            "정부, 새로운 경제 정책 발표 예정",
            "국회, 예산안 논의 본격화",
            "외교부, 주요 국가와 협력 강화 방침",
        ],
        Category::Economy => &[
            "기업, 신규 투자 계획 발표",
            "증시, 외국인 매수세 지속",
            "환율, 글로벌 경제 동향에 민감 반응",
        ],
        Category::Society => &[
            "교육부, 새 학기 준비 지침사항 발표",
            "경찰, 범죄 예방 활동 강화",
            "보건당국, 건강 검진 확대 방침",
        ],
        Category::Life => &[
            "날씨, 주말 따뜻한 날씨 예상",
            "건강 팁, 가을철 환절기 대비법",
            "맛집 탐방, SNS에서 화제의 레스토랑",
        ],
        Category::World => &[
            "미국, 새로운 정책 발표",
            "유럽, 경제 협력 회의 개최",
            "중국, 주요 도시 발전 계획 공개",
        ],
        Category::It => &[
            "AI 기술, 새로운 혁신 돌파구",
            "스마트폰 신제품, 주요 기능 공개",
            "클라우드 서비스, 시장 점유율 확대",
        ],
        Category::All => &["샘플 뉴스 제목"],
    }
}

/// Up to `count` deterministic placeholder stubs for `category`.
pub fn listing_placeholders(category: Category, count: usize, today: NaiveDate) -> Vec<ArticleStub> {
    let date = today.format(crate::dates::DATE_FORMAT).to_string();
    sample_titles(category)
        .iter()
        .take(count)
        .enumerate()
        .map(|(index, title)| ArticleStub {
            title: format!("{TITLE_PREFIX} {title}"),
            url: format!("{PLACEHOLDER_URL_PREFIX}{}/{index}", category.slug()),
            body_preview: String::new(),
            category,
            publish_date: date.clone(),
        })
        .collect()
}

/// Placeholder stubs that embed the search `keyword`.
pub fn search_placeholders(keyword: &str, today: NaiveDate) -> Vec<ArticleStub> {
    let date = today.format(crate::dates::DATE_FORMAT).to_string();
    let keyword = keyword.trim();
    [
        format!("{TITLE_PREFIX} '{keyword}' 검색 테스트 기사 1"),
        format!("{TITLE_PREFIX} '{keyword}' 관련 테스트 기사 2"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, title)| ArticleStub {
        title,
        url: format!("{PLACEHOLDER_URL_PREFIX}search/{}", index + 1),
        body_preview: String::new(),
        category: Category::All,
        publish_date: date.clone(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn test_listing_placeholders_are_marked() {
        let stubs = listing_placeholders(Category::Economy, 5, today());
        assert_eq!(stubs.len(), 3);
        for stub in &stubs {
            assert!(stub.is_placeholder());
            assert!(stub.title.starts_with("[test] "));
            assert_eq!(stub.category, Category::Economy);
            assert_eq!(stub.publish_date, "2025-05-06");
        }
        assert_eq!(stubs[0].url, "https://news.naver.com/test/economy/0");
    }

    #[test]
    fn test_listing_placeholders_respect_count() {
        assert_eq!(listing_placeholders(Category::It, 2, today()).len(), 2);
        assert!(listing_placeholders(Category::It, 0, today()).is_empty());
    }

    #[test]
    fn test_listing_placeholders_deterministic() {
        assert_eq!(
            listing_placeholders(Category::Life, 3, today()),
            listing_placeholders(Category::Life, 3, today())
        );
    }

    #[test]
    fn test_search_placeholders_embed_keyword() {
        let stubs = search_placeholders(" 반도체 ", today());
        assert_eq!(stubs.len(), 2);
        assert!(stubs.iter().all(|s| s.is_placeholder() && s.title.contains("'반도체'")));
        assert_ne!(stubs[0].url, stubs[1].url);
    }
}
