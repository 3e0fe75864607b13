//! 네이버 뉴스 파서.

use std::collections::HashSet;

use corp_core::{datetime, NewsArticle};
use scraper::{Html, Selector};

use super::{
    clean_text, first_value, missing_fields, selector, url_md5, Board, BoardItem, Field,
    NewsPortal,
};
use crate::error::Result;

/// 네이버 뉴스 포털 이름.
pub const NAVER_PORTAL: &str = "naver";

/// 네이버 뉴스 섹션 목록 URL.
pub const NAVER_BOARD_URL: &str = "https://news.naver.com/main/list.naver?mode=LSD&mid=sec&sid1=";

/// 기본 네이버 섹션 (정치, 경제, 사회, 생활/문화, 세계, IT/과학).
pub const NAVER_CATEGORIES: &[&str] = &["100", "101", "102", "103", "104", "105"];

/// 네이버 섹션 코드 → 뉴스 분류.
pub fn naver_kind(category: &str) -> &'static str {
    match category {
        "100" => "politics",
        "101" => "economy",
        "102" => "society",
        "103" => "culture",
        "104" => "world",
        "105" => "it",
        _ => "etc",
    }
}

/// 네이버 뉴스 파서.
pub struct NaverNewsScraper {
    board_base: String,
    categories: Vec<String>,
    link: Selector,
    titles: Vec<Field>,
    contents: Vec<Field>,
    date_attr: Field,
    date_text: Selector,
    media: Field,
    image: Field,
}

impl NaverNewsScraper {
    pub fn new() -> Result<Self> {
        Self::with_board_base(NAVER_BOARD_URL)
    }

    /// 목록 URL 접두사를 바꿔 생성합니다 (`{base}{category}`).
    pub fn with_board_base(board_base: impl Into<String>) -> Result<Self> {
        Ok(Self {
            board_base: board_base.into(),
            categories: NAVER_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            link: selector(r"a.nclicks\(fls\.list\)")?,
            titles: vec![Field::text("#title_area")?, Field::text("h2.media_end_head_headline")?],
            contents: vec![Field::text("#dic_area")?, Field::text("#newsct_article")?],
            date_attr: Field::attr(
                "span.media_end_head_info_datestamp_time[data-date-time]",
                "data-date-time",
            )?,
            date_text: selector("span.t11, .info, .author em")?,
            media: Field::attr("a.media_end_head_top_logo img[alt]", "alt")?,
            image: Field::attr(r#"meta[property="og:image"]"#, "content")?,
        })
    }

    /// 수집할 섹션을 바꿉니다.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn board_url(&self, category: &str) -> String {
        format!("{}{}", self.board_base, category)
    }

    /// 목록 페이지에서 기사 링크를 순서대로 중복 없이 추출합니다.
    pub fn parse_board_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        document
            .select(&self.link)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .filter(|href| seen.insert(href.to_string()))
            .map(str::to_string)
            .collect()
    }
}

impl NewsPortal for NaverNewsScraper {
    fn name(&self) -> &str {
        NAVER_PORTAL
    }

    fn boards(&self) -> Vec<Board> {
        self.categories
            .iter()
            .map(|category| Board::new(self.board_url(category), category.as_str()))
            .collect()
    }

    fn parse_board(&self, _board: &Board, body: &str) -> Result<Vec<BoardItem>> {
        Ok(self
            .parse_board_links(body)
            .into_iter()
            .map(BoardItem::Link)
            .collect())
    }

    fn parse_article(&self, url: &str, html: &str, category: &str) -> Result<NewsArticle> {
        let document = Html::parse_document(html);

        let title = first_value(&self.titles, &document);
        let content = first_value(&self.contents, &document);

        let raw_date = self.date_attr.value(&document).or_else(|| {
            document
                .select(&self.date_text)
                .map(|el| el.text().collect::<String>())
                .find(|t| t.contains("기사입력"))
        });
        let create_date = raw_date.as_deref().and_then(datetime::normalize);

        let (Some(title), Some(content), Some(create_date)) = (&title, &content, create_date)
        else {
            return Err(missing_fields(
                url,
                &[
                    ("title", title.is_some()),
                    ("content", content.is_some()),
                    ("create_date", create_date.is_some()),
                ],
            ));
        };

        Ok(NewsArticle {
            url: url.to_string(),
            url_md5: url_md5(url),
            title: clean_text(title).trim().to_string(),
            content: clean_text(content).trim().to_string(),
            create_date,
            kind: naver_kind(category).to_string(),
            image_url: self.image.value(&document),
            portal: NAVER_PORTAL.to_string(),
            media: self.media.value(&document),
            category: category.to_string(),
        })
    }
}
