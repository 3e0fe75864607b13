//! 뉴스 기사 수집.
//!
//! - [`NewsFetcher`]: 재시도와 EUC-KR 디코딩을 포함한 HTML 조회
//! - [`NewsPortal`]: 포털별 목록/기사 파서 (네이버, 다음, ZDNet, 더벨 등)
//! - [`ScrapedUrlCache`]: 최근 수집한 URL의 MD5 링 버퍼

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use corp_core::NewsArticle;
use md5::{Digest, Md5};
use scraper::{ElementRef, Html, Selector};

use crate::error::{DataError, Result};

mod feed;
mod naver;
mod portals;

pub use feed::{parse_feed, FeedItem};
pub use naver::{naver_kind, NaverNewsScraper, NAVER_BOARD_URL, NAVER_CATEGORIES, NAVER_PORTAL};
pub use portals::{portal_by_name, section_kind, PortalScraper, PORTAL_NAMES};

/// EUC-KR로 응답하는 언론사.
pub const EUC_KR_MEDIA: &[&str] = &["dt", "wsobi", "munhwa", "dailypharm", "boannews"];

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// URL MD5 hex.
pub fn url_md5(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F | 0x1F300..=0x1F5FF | 0x1F680..=0x1F6FF | 0x1F1E0..=0x1F1FF
    )
}

/// 이모지와 한글/영숫자/공백 이외의 문자를 제거합니다.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_emoji(c))
        .filter(|&c| ('가'..='힣').contains(&c) || c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// 목록 페이지 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub url: String,
    /// 포털 섹션 (네이버 sid1, 다음 breakingnews 경로 등). 없으면 빈 문자열
    pub category: String,
}

impl Board {
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
        }
    }
}

/// 목록에서 얻은 항목.
#[derive(Debug)]
pub enum BoardItem {
    /// 기사 페이지를 따로 조회해야 하는 링크
    Link(String),
    /// 피드에 본문이 포함되어 바로 파싱한 기사
    Feed {
        url: String,
        article: Result<NewsArticle>,
    },
}

impl BoardItem {
    pub fn url(&self) -> &str {
        match self {
            BoardItem::Link(url) => url,
            BoardItem::Feed { url, .. } => url,
        }
    }
}

/// 뉴스 포털 파서.
///
/// 목록 파싱과 기사 파싱은 순수 함수이고, 조회는 세션이 [`NewsFetcher`]로 합니다.
pub trait NewsPortal: Send + Sync {
    /// 세션 로그와 기사에 저장되는 포털 이름.
    fn name(&self) -> &str;

    /// 조회 시 디코딩 판단에 쓰는 언론사 이름.
    fn media(&self) -> Option<&str> {
        Some(self.name())
    }

    fn boards(&self) -> Vec<Board>;

    /// 목록 페이지(HTML 또는 RSS)에서 항목을 순서대로 중복 없이 추출합니다.
    fn parse_board(&self, board: &Board, body: &str) -> Result<Vec<BoardItem>>;

    /// 기사 페이지 파싱. 제목, 본문, 작성일 중 하나라도 없으면 오류입니다.
    fn parse_article(&self, url: &str, html: &str, category: &str) -> Result<NewsArticle>;
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::ParseError(format!("{}: {}", css, e)))
}

/// 요소의 텍스트 또는 속성 값.
#[derive(Debug, Clone)]
pub(crate) struct Field {
    selector: Selector,
    attr: Option<&'static str>,
}

impl Field {
    pub(crate) fn text(css: &str) -> Result<Self> {
        Ok(Self {
            selector: selector(css)?,
            attr: None,
        })
    }

    pub(crate) fn attr(css: &str, attr: &'static str) -> Result<Self> {
        Ok(Self {
            selector: selector(css)?,
            attr: Some(attr),
        })
    }

    /// 첫 번째 일치 요소의 값. 빈 값도 그대로 반환합니다.
    pub(crate) fn raw(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.selector).next()?;
        match self.attr {
            Some(attr) => element.value().attr(attr).map(|v| v.trim().to_string()),
            None => Some(element_text(element)),
        }
    }

    pub(crate) fn value(&self, document: &Html) -> Option<String> {
        self.raw(document).filter(|v| !v.is_empty())
    }
}

/// 여러 후보 중 처음으로 값이 있는 것.
pub(crate) fn first_value(fields: &[Field], document: &Html) -> Option<String> {
    fields.iter().find_map(|f| f.value(document))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// 필수 항목 누락 오류.
pub(crate) fn missing_fields(url: &str, fields: &[(&str, bool)]) -> DataError {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    DataError::ParseError(format!("{:?} 항목이 비어 있습니다: {}", missing, url))
}

/// 재시도를 포함한 HTML 조회기.
#[derive(Clone)]
pub struct NewsFetcher {
    client: reqwest::Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl NewsFetcher {
    pub fn new() -> Result<Self> {
        Self::with_retry(3, Duration::from_secs(2))
    }

    pub fn with_retry(max_attempts: u32, retry_delay: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_delay,
        })
    }

    /// URL을 조회해 디코딩된 본문을 반환합니다.
    ///
    /// 200이 아니거나 전송 오류이면 `retry_delay` 간격으로 재시도하고, 마지막 오류를 반환합니다.
    pub async fn fetch_with_retry(&self, url: &str, media: Option<&str>) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_once(url, media).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(url, media, attempt, error = %e, "뉴스 조회 실패, 재시도");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str, media: Option<&str>) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(DataError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(decode_body(&bytes, media))
    }
}

/// 응답 본문 디코딩. UTF-8이 아니면 EUC-KR로 해석합니다.
pub fn decode_body(bytes: &[u8], media: Option<&str>) -> String {
    let euc_kr_media = media.is_some_and(|m| EUC_KR_MEDIA.contains(&m));
    if !euc_kr_media {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return text.to_string();
        }
    }

    let (text, _, _) = encoding_rs::EUC_KR.decode(bytes);
    text.into_owned()
}

/// 최근 수집한 URL의 MD5 링 버퍼.
#[derive(Debug, Clone)]
pub struct ScrapedUrlCache {
    capacity: usize,
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl Default for ScrapedUrlCache {
    fn default() -> Self {
        Self::with_capacity(10_000)
    }
}

impl ScrapedUrlCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::with_capacity(capacity.min(1024)),
            members: HashSet::new(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.members.contains(&url_md5(url))
    }

    /// URL을 추가하고, 용량을 넘으면 가장 오래된 항목을 버립니다.
    pub fn insert(&mut self, url: &str) {
        let digest = url_md5(url);
        if !self.members.insert(digest.clone()) {
            return;
        }
        self.order.push_back(digest);

        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.members.remove(&old);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_md5() {
        assert_eq!(url_md5(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(url_md5("https://n.news.naver.com/a").len(), 32);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("안녕 😀 world!"), "안녕  world");
        assert_eq!(clean_text("🇰🇷 대한민국 (KOREA)"), " 대한민국 KOREA");
        assert_eq!(clean_text("ㄱㄴ 가나 123"), " 가나 123");
    }

    #[test]
    fn test_decode_body_euc_kr() {
        let (encoded, _, _) = encoding_rs::EUC_KR.encode("한글 기사");
        assert_eq!(decode_body(&encoded, Some("munhwa")), "한글 기사");
        // UTF-8이 아니면 언론사와 무관하게 EUC-KR로 해석
        assert_eq!(decode_body(&encoded, None), "한글 기사");
        assert_eq!(decode_body("utf8 본문".as_bytes(), Some("yna")), "utf8 본문");
    }

    #[test]
    fn test_scraped_url_cache_evicts_oldest() {
        let mut cache = ScrapedUrlCache::with_capacity(2);
        cache.insert("a");
        cache.insert("b");
        cache.insert("a");
        assert_eq!(cache.len(), 2);

        cache.insert("c");
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_field_raw_keeps_empty_value() {
        let document = Html::parse_document(
            r#"<span class="date"> </span><meta property="og:title" content=" 제목 ">"#,
        );
        let date = Field::text("span.date").unwrap();
        assert_eq!(date.raw(&document).as_deref(), Some(""));
        assert_eq!(date.value(&document), None);

        let title = Field::attr(r#"meta[property="og:title"]"#, "content").unwrap();
        assert_eq!(title.value(&document).as_deref(), Some("제목"));
    }

    #[test]
    fn test_missing_fields_message() {
        let err = missing_fields("u", &[("title", true), ("content", false), ("create_date", false)]);
        assert_eq!(
            err.to_string(),
            DataError::ParseError(r#"["content", "create_date"] 항목이 비어 있습니다: u"#.to_string())
                .to_string()
        );
    }
}
