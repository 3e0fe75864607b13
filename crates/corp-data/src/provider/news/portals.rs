//! 고정 선택자 기반 포털 파서.
//!
//! 포털마다 목록 형태(HTML 링크 / RSS 링크 / RSS 본문), 기사 선택자, 날짜 파서가 다릅니다.
//! 공통 기본값은 Open Graph 메타 태그(`og:title`, `og:image`, `og:site_name`)와
//! `article:published_time`, `article:section`입니다.

use std::collections::HashSet;

use chrono::{NaiveDateTime, Timelike};
use corp_core::{datetime, NewsArticle};
use scraper::{Html, Selector};

use super::feed::{parse_feed, FeedItem};
use super::naver::NaverNewsScraper;
use super::{
    clean_text, element_text, first_value, missing_fields, selector, url_md5, Board, BoardItem,
    Field, NewsPortal,
};
use crate::error::{DataError, Result};

type DateParser = fn(&str) -> Option<NaiveDateTime>;

/// 수집 가능한 포털 이름.
pub const PORTAL_NAMES: &[&str] = &[
    "naver",
    "daum",
    "zdnet",
    "thebell",
    "startupn",
    "startuptoday",
    "venturesquare",
    "platum",
    "esg_economy",
];

const DAUM_BOARD_URL: &str = "https://news.daum.net/breakingnews/";
const DAUM_CATEGORIES: &[&str] = &["society", "politics", "economic", "foreign", "digital"];

/// 이름으로 포털 파서를 만듭니다.
pub fn portal_by_name(name: &str) -> Result<Box<dyn NewsPortal>> {
    Ok(match name {
        "naver" => Box::new(NaverNewsScraper::new()?),
        "daum" => Box::new(PortalScraper::daum()?),
        "zdnet" => Box::new(PortalScraper::zdnet()?),
        "thebell" => Box::new(PortalScraper::thebell()?),
        "startupn" => Box::new(PortalScraper::startupn()?),
        "startuptoday" => Box::new(PortalScraper::startuptoday()?),
        "venturesquare" => Box::new(PortalScraper::venturesquare()?),
        "platum" => Box::new(PortalScraper::platum()?),
        "esg_economy" => Box::new(PortalScraper::esg_economy()?),
        other => return Err(DataError::NotFound(format!("뉴스 포털: {}", other))),
    })
}

/// 섹션 이름 → 뉴스 분류. 모르는 섹션은 `etc`.
pub fn section_kind(label: &str) -> &'static str {
    match label.trim().to_lowercase().as_str() {
        "politics" | "정치" => "politics",
        "economy" | "economic" | "경제" | "금융" | "산업" => "economy",
        "society" | "사회" => "society",
        "culture" | "문화" | "생활/문화" => "culture",
        "world" | "foreign" | "국제" | "세계" => "world",
        "it" | "digital" | "tech" | "it/과학" | "과학" | "컴퓨팅" | "방송/통신" => "it",
        "startup" | "스타트업" | "창업" => "startup",
        "esg" | "social_and_env" | "환경" => "esg",
        _ => "etc",
    }
}

enum Listing {
    /// HTML 목록. `link`가 없으면 컨테이너 자체가 링크입니다.
    Html {
        container: Selector,
        link: Option<Selector>,
        href_contains: Option<&'static str>,
    },
    /// RSS 링크마다 기사 페이지를 조회
    RssLinks,
    /// RSS `content:encoded`를 본문으로 사용
    RssContent,
}

enum DateSource {
    Field(Field),
    /// URL 쿼리 값 (ZDNet `no=YYYYMMDDhhmmss`)
    UrlQuery(&'static str),
}

/// 고정 선택자 포털 파서.
pub struct PortalScraper {
    name: &'static str,
    boards: Vec<Board>,
    listing: Listing,
    link_base: String,
    title: Vec<Field>,
    content: Vec<Field>,
    date: DateSource,
    parse_date: DateParser,
    media: Vec<Field>,
    fixed_media: Option<&'static str>,
    kind: Vec<Field>,
    image: Field,
    feed_image: Selector,
}

impl PortalScraper {
    fn base(name: &'static str, boards: Vec<Board>, listing: Listing) -> Result<Self> {
        Ok(Self {
            name,
            boards,
            listing,
            link_base: String::new(),
            title: vec![
                Field::attr(r#"meta[property="og:title"]"#, "content")?,
                Field::text("h1")?,
            ],
            content: Vec::new(),
            date: DateSource::Field(Field::attr(
                r#"meta[property="article:published_time"]"#,
                "content",
            )?),
            parse_date: datetime::iso,
            media: vec![Field::attr(r#"meta[property="og:site_name"]"#, "content")?],
            fixed_media: None,
            kind: vec![Field::attr(r#"meta[property="article:section"]"#, "content")?],
            image: Field::attr(r#"meta[property="og:image"]"#, "content")?,
            feed_image: selector("img[src]")?,
        })
    }

    fn html_listing(
        container: &str,
        link: Option<&str>,
        href_contains: Option<&'static str>,
    ) -> Result<Listing> {
        Ok(Listing::Html {
            container: selector(container)?,
            link: link.map(selector).transpose()?,
            href_contains,
        })
    }

    /// 다음 뉴스 (섹션별 속보 목록).
    pub fn daum() -> Result<Self> {
        let boards = DAUM_CATEGORIES
            .iter()
            .map(|c| Board::new(format!("{}{}", DAUM_BOARD_URL, c), *c))
            .collect();
        let mut portal = Self::base("daum", boards, Self::html_listing("a.link_thumb", None, None)?)?;
        portal.content = vec![
            Field::text("div.article_view section")?,
            Field::text("div.article_view")?,
        ];
        portal.date = DateSource::Field(Field::text("span.num_date")?);
        portal.parse_date = datetime::dotted;
        portal.media.insert(0, Field::attr(r#"meta[property="og:article:author"]"#, "content")?);
        portal.kind.clear();
        Ok(portal)
    }

    pub fn zdnet() -> Result<Self> {
        let boards = vec![Board::new("https://zdnet.co.kr/news/?lstcode=0000&page=1", "")];
        let mut portal = Self::base(
            "zdnet",
            boards,
            Self::html_listing("div.newsPost", Some("a[href]"), None)?,
        )?;
        portal.link_base = "https://zdnet.co.kr".to_string();
        portal.content = vec![Field::text("#articleBody")?, Field::text("div.view_cont")?];
        portal.date = DateSource::UrlQuery("no");
        portal.parse_date = datetime::compact;
        Ok(portal)
    }

    /// 더벨 무료 기사.
    pub fn thebell() -> Result<Self> {
        let boards = vec![Board::new(
            "https://www.thebell.co.kr/free/content/Article.asp?svccode=00",
            "",
        )];
        let mut portal = Self::base(
            "thebell",
            boards,
            Self::html_listing(".newsList > .listBox a[href]", None, Some("ArticleView.asp"))?,
        )?;
        portal.link_base = "https://www.thebell.co.kr/free/content/".to_string();
        portal.content = vec![Field::text("#article_main")?, Field::text("div.viewSection")?];
        portal.date = DateSource::Field(Field::text(".userBox .date")?);
        portal.parse_date = thebell_date;
        portal.fixed_media = Some("thebell");
        Ok(portal)
    }

    pub fn startupn() -> Result<Self> {
        let boards = vec![Board::new(
            "https://www.startupn.kr/news/articleList.html?sc_section_code=S1N2&view_type=sm",
            "",
        )];
        let mut portal = Self::base(
            "startupn",
            boards,
            Self::html_listing(".thumb[href]", None, Some("/news/articleView"))?,
        )?;
        portal.link_base = "https://www.startupn.kr".to_string();
        portal.content = vec![Field::text("#article-view-content-div")?];
        Ok(portal)
    }

    pub fn startuptoday() -> Result<Self> {
        let boards = vec![Board::new(
            "https://www.startuptoday.kr/news/articleList.html?sc_section_code=S1N45&view_type=sm",
            "",
        )];
        let mut portal = Self::base(
            "startuptoday",
            boards,
            Self::html_listing(".thumb[href]", None, Some("/news/articleView"))?,
        )?;
        portal.link_base = "https://startuptoday.co.kr".to_string();
        portal.content = vec![Field::text("#article-view-content-div")?];
        Ok(portal)
    }

    pub fn venturesquare() -> Result<Self> {
        let boards = vec![Board::new(
            "https://www.venturesquare.net/category/news-contents/feed",
            "",
        )];
        let mut portal = Self::base("venturesquare", boards, Listing::RssLinks)?;
        portal.content = vec![Field::text("div.entry-content")?];
        portal.fixed_media = Some("venturesquare");
        Ok(portal)
    }

    /// 플래텀. 피드 본문을 그대로 사용하므로 기사 페이지를 조회하지 않습니다.
    pub fn platum() -> Result<Self> {
        let boards = vec![Board::new("https://platum.kr/feed", "")];
        let mut portal = Self::base("platum", boards, Listing::RssContent)?;
        portal.content = vec![Field::text("div.entry-content")?];
        portal.parse_date = datetime::rfc2822;
        portal.fixed_media = Some("platum");
        Ok(portal)
    }

    /// ESG경제 (경제, 사회·환경 피드).
    pub fn esg_economy() -> Result<Self> {
        let boards = vec![
            Board::new("https://www.esgeconomy.com/rss/S1N1.xml", "economy"),
            Board::new("https://www.esgeconomy.com/rss/S1N2.xml", "social_and_env"),
        ];
        let mut portal = Self::base("esg_economy", boards, Listing::RssLinks)?;
        portal.content = vec![Field::text("#article-view-content-div")?];
        Ok(portal)
    }

    /// 목록 URL과 링크 기준 주소의 `scheme://host`를 바꿉니다.
    pub fn with_origin(mut self, origin: &str) -> Self {
        for board in &mut self.boards {
            board.url = swap_origin(&board.url, origin);
        }
        if !self.link_base.is_empty() {
            self.link_base = swap_origin(&self.link_base, origin);
        }
        self
    }

    fn resolve(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") || self.link_base.is_empty() {
            return href.to_string();
        }
        if href.starts_with('/') {
            return format!("{}{}", origin_of(&self.link_base), href);
        }
        format!("{}{}", self.link_base, href)
    }

    fn html_links(
        &self,
        body: &str,
        container: &Selector,
        link: Option<&Selector>,
        href_contains: Option<&str>,
    ) -> Vec<String> {
        let document = Html::parse_document(body);

        document
            .select(container)
            .filter_map(|el| match link {
                Some(link) => el.select(link).next(),
                None => Some(el),
            })
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .filter(|href| href_contains.map_or(true, |needle| href.contains(needle)))
            .map(|href| self.resolve(href))
            .collect()
    }

    fn raw_date(&self, url: &str, document: &Html) -> Option<String> {
        match &self.date {
            DateSource::Field(field) => field.raw(document),
            DateSource::UrlQuery(key) => reqwest::Url::parse(url)
                .ok()?
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned()),
        }
    }

    fn media_of(&self, document: &Html) -> Option<String> {
        first_value(&self.media, document).or_else(|| self.fixed_media.map(str::to_string))
    }

    /// 피드 항목을 기사로 변환합니다.
    fn feed_article(&self, item: &FeedItem, category: &str) -> Result<NewsArticle> {
        let html = item
            .content
            .as_deref()
            .or(item.description.as_deref())
            .unwrap_or_default();
        let fragment = Html::parse_fragment(html);
        let content = Some(element_text(fragment.root_element())).filter(|c| !c.is_empty());
        let title = Some(item.title.clone()).filter(|t| !t.is_empty());
        let create_date = (self.parse_date)(&item.pub_date);

        let (Some(title), Some(content), Some(create_date)) = (&title, &content, create_date)
        else {
            return Err(missing_fields(
                &item.link,
                &[
                    ("title", title.is_some()),
                    ("content", content.is_some()),
                    ("create_date", create_date.is_some()),
                ],
            ));
        };

        let label = item.categories.first().map_or(category, String::as_str);
        let image_url = fragment
            .select(&self.feed_image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        Ok(NewsArticle {
            url: item.link.clone(),
            url_md5: url_md5(&item.link),
            title: clean_text(title).trim().to_string(),
            content: clean_text(content).trim().to_string(),
            create_date,
            kind: section_kind(label).to_string(),
            image_url,
            portal: self.name.to_string(),
            media: self.fixed_media.map(str::to_string),
            category: category.to_string(),
        })
    }
}

impl NewsPortal for PortalScraper {
    fn name(&self) -> &str {
        self.name
    }

    fn boards(&self) -> Vec<Board> {
        self.boards.clone()
    }

    fn parse_board(&self, board: &Board, body: &str) -> Result<Vec<BoardItem>> {
        let mut seen = HashSet::new();

        let items: Vec<BoardItem> = match &self.listing {
            Listing::Html {
                container,
                link,
                href_contains,
            } => self
                .html_links(body, container, link.as_ref(), *href_contains)
                .into_iter()
                .map(BoardItem::Link)
                .collect(),
            Listing::RssLinks => parse_feed(body)?
                .into_iter()
                .map(|item| BoardItem::Link(item.link))
                .collect(),
            Listing::RssContent => parse_feed(body)?
                .into_iter()
                .map(|item| BoardItem::Feed {
                    url: item.link.clone(),
                    article: self.feed_article(&item, &board.category),
                })
                .collect(),
        };

        Ok(items
            .into_iter()
            .filter(|item| seen.insert(item.url().to_string()))
            .collect())
    }

    fn parse_article(&self, url: &str, html: &str, category: &str) -> Result<NewsArticle> {
        let document = Html::parse_document(html);

        let title = first_value(&self.title, &document);
        let content = first_value(&self.content, &document);
        let create_date = self
            .raw_date(url, &document)
            .and_then(|raw| (self.parse_date)(&raw));

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

        let label = first_value(&self.kind, &document).unwrap_or_else(|| category.to_string());

        Ok(NewsArticle {
            url: url.to_string(),
            url_md5: url_md5(url),
            title: clean_text(title).trim().to_string(),
            content: clean_text(content).trim().to_string(),
            create_date,
            kind: section_kind(&label).to_string(),
            image_url: self.image.value(&document),
            portal: self.name.to_string(),
            media: self.media_of(&document),
            category: category.to_string(),
        })
    }
}

/// 더벨 날짜: `공개 2024-05-01 10:20:30`. 빈 값이면 현재 시각.
fn thebell_date(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.replace("공개", "");
    if value.trim().is_empty() {
        return datetime::kst_now().naive_local().with_nanosecond(0);
    }
    datetime::standard(&value)
}

fn origin_end(url: &str) -> usize {
    let host_start = url.find("://").map_or(0, |i| i + 3);
    url[host_start..]
        .find('/')
        .map_or(url.len(), |i| host_start + i)
}

fn origin_of(url: &str) -> &str {
    &url[..origin_end(url)]
}

fn swap_origin(url: &str, origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), &url[origin_end(url)..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(dt: &NaiveDateTime) -> String {
        datetime::format_standard(dt)
    }

    fn links(items: &[BoardItem]) -> Vec<&str> {
        items.iter().map(BoardItem::url).collect()
    }

    #[test]
    fn test_portal_by_name() {
        for name in PORTAL_NAMES {
            let portal = portal_by_name(name).unwrap();
            assert_eq!(portal.name(), *name);
            assert_eq!(portal.media(), Some(*name));
            assert!(!portal.boards().is_empty());
        }
        assert!(matches!(portal_by_name("cnn"), Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_section_kind() {
        assert_eq!(section_kind("economic"), "economy");
        assert_eq!(section_kind(" 경제 "), "economy");
        assert_eq!(section_kind("digital"), "it");
        assert_eq!(section_kind("foreign"), "world");
        assert_eq!(section_kind("Startup"), "startup");
        assert_eq!(section_kind("social_and_env"), "esg");
        assert_eq!(section_kind(""), "etc");
    }

    #[test]
    fn test_swap_origin() {
        assert_eq!(
            swap_origin("https://zdnet.co.kr/news/?page=1", "http://127.0.0.1:1234"),
            "http://127.0.0.1:1234/news/?page=1"
        );
        assert_eq!(swap_origin("https://zdnet.co.kr", "http://h/"), "http://h");
        assert_eq!(origin_of("https://www.thebell.co.kr/free/content/"), "https://www.thebell.co.kr");
    }

    #[test]
    fn test_daum() {
        let daum = PortalScraper::daum().unwrap();
        let boards = daum.boards();
        assert_eq!(boards.len(), 5);
        assert_eq!(boards[2].url, "https://news.daum.net/breakingnews/economic");

        let board = r#"<ul>
            <li><a class="link_thumb" href="https://v.daum.net/v/1">1</a></li>
            <li><a class="link_thumb" href="https://v.daum.net/v/1">1</a></li>
            <li><a class="link_txt" href="https://v.daum.net/v/x">x</a></li>
            <li><a class="link_thumb" href="https://v.daum.net/v/2">2</a></li>
        </ul>"#;
        let items = daum.parse_board(&boards[2], board).unwrap();
        assert_eq!(links(&items), vec!["https://v.daum.net/v/1", "https://v.daum.net/v/2"]);

        let html = r#"<html><head>
            <meta property="og:title" content="금리 동결 😀">
            <meta property="og:image" content="https://img.daum.net/a.jpg">
            <meta property="og:article:author" content="연합뉴스">
            <meta property="og:site_name" content="다음뉴스">
            </head><body>
            <span class="num_date">2024. 5. 1. 14:30</span>
            <div class="article_view"><section><p>한국은행이 기준금리를 동결했다.</p></section></div>
            </body></html>"#;
        let article = daum.parse_article("https://v.daum.net/v/1", html, "economic").unwrap();
        assert_eq!(article.title, "금리 동결");
        assert_eq!(article.content, "한국은행이 기준금리를 동결했다");
        assert_eq!(fmt(&article.create_date), "2024-05-01 14:30:00");
        assert_eq!(article.media.as_deref(), Some("연합뉴스"));
        assert_eq!(article.image_url.as_deref(), Some("https://img.daum.net/a.jpg"));
        assert_eq!(article.kind, "economy");
        assert_eq!(article.portal, "daum");
        assert_eq!(article.category, "economic");
    }

    #[test]
    fn test_zdnet_links_and_date_from_url() {
        let zdnet = PortalScraper::zdnet().unwrap();
        let board = r#"<div class="newsPost">
                <a href="/view/?no=20240501102030">기사</a>
                <a href="/reporter/1">기자</a>
            </div>
            <div class="newsPost"><a href="/view/?no=20240501090000">기사2</a></div>"#;
        let items = zdnet.parse_board(&zdnet.boards()[0], board).unwrap();
        assert_eq!(
            links(&items),
            vec![
                "https://zdnet.co.kr/view/?no=20240501102030",
                "https://zdnet.co.kr/view/?no=20240501090000"
            ]
        );

        let html = r#"<head>
            <meta property="og:title" content="AI 반도체 경쟁">
            <meta property="og:site_name" content="지디넷코리아">
            <meta property="article:section" content="컴퓨팅">
            </head><body><div id="articleBody">엔비디아가 신제품을 공개했다.</div></body>"#;
        let article = zdnet
            .parse_article("https://zdnet.co.kr/view/?no=20240501102030", html, "")
            .unwrap();
        assert_eq!(fmt(&article.create_date), "2024-05-01 10:20:30");
        assert_eq!(article.kind, "it");
        assert_eq!(article.media.as_deref(), Some("지디넷코리아"));

        assert!(matches!(
            zdnet.parse_article("https://zdnet.co.kr/view/?id=1", html, ""),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_thebell() {
        let thebell = PortalScraper::thebell().unwrap();
        let board = r#"<div class="newsList"><div class="listBox">
            <a href="ArticleView.asp?key=1&svccode=00">기사</a>
            <a href="/free/content/ArticleView.asp?key=2">기사2</a>
            <a href="Article.asp?page=2">다음</a>
        </div></div>"#;
        let items = thebell.parse_board(&thebell.boards()[0], board).unwrap();
        assert_eq!(
            links(&items),
            vec![
                "https://www.thebell.co.kr/free/content/ArticleView.asp?key=1&svccode=00",
                "https://www.thebell.co.kr/free/content/ArticleView.asp?key=2"
            ]
        );

        let html = |date: &str| {
            format!(
                r#"<head><meta property="og:title" content="IPO 시장 점검"></head>
                <body><div class="userBox"><span class="date">{}</span></div>
                <div id="article_main">공모 시장이 회복세다.</div></body>"#,
                date
            )
        };
        let article = thebell.parse_article("u", &html("공개 2024-05-01 10:20:30"), "").unwrap();
        assert_eq!(fmt(&article.create_date), "2024-05-01 10:20:30");
        assert_eq!(article.media.as_deref(), Some("thebell"));
        assert_eq!(article.kind, "etc");

        // 날짜 칸이 비어 있으면 수집 시각
        let before = datetime::kst_now().naive_local().with_nanosecond(0).unwrap();
        let article = thebell.parse_article("u", &html(" "), "").unwrap();
        assert!(article.create_date >= before);

        assert!(thebell.parse_article("u", &html("2024.05.01"), "").is_err());
    }

    #[test]
    fn test_startup_media_portals() {
        let html = r#"<head>
            <meta property="og:title" content="시리즈A 유치">
            <meta property="og:site_name" content="스타트업엔">
            <meta property="article:section" content="스타트업">
            <meta property="article:published_time" content="2024-05-01T10:20:30+09:00">
            </head><body><div id="article-view-content-div">투자를 유치했다.</div></body>"#;
        let board = r#"<a class="thumb" href="/news/articleView.html?idxno=1"><img></a>
            <a class="thumb" href="/news/articleList.html?page=2"><img></a>"#;

        let startupn = PortalScraper::startupn().unwrap();
        let items = startupn.parse_board(&startupn.boards()[0], board).unwrap();
        assert_eq!(
            links(&items),
            vec!["https://www.startupn.kr/news/articleView.html?idxno=1"]
        );
        let article = startupn.parse_article("u", html, "").unwrap();
        assert_eq!(fmt(&article.create_date), "2024-05-01 10:20:30");
        assert_eq!(article.kind, "startup");

        let startuptoday = PortalScraper::startuptoday().unwrap();
        let items = startuptoday.parse_board(&startuptoday.boards()[0], board).unwrap();
        assert_eq!(
            links(&items),
            vec!["https://startuptoday.co.kr/news/articleView.html?idxno=1"]
        );
        assert_eq!(startuptoday.parse_article("u", html, "").unwrap().portal, "startuptoday");
    }

    #[test]
    fn test_rss_link_portals() {
        let feed = r#"<rss><channel>
            <item><title>a</title><link>https://www.esgeconomy.com/news/articleView.html?idxno=1</link></item>
            <item><title>b</title><link>https://www.esgeconomy.com/news/articleView.html?idxno=2</link></item>
        </channel></rss>"#;
        let esg = PortalScraper::esg_economy().unwrap();
        let boards = esg.boards();
        assert_eq!(boards[1].category, "social_and_env");
        let items = esg.parse_board(&boards[1], feed).unwrap();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], BoardItem::Link(_)));

        let html = r#"<head><meta property="og:title" content="탄소중립">
            <meta property="article:published_time" content="2024-05-01T10:20:30Z"></head>
            <body><div id="article-view-content-div">배출권 거래제 개편</div></body>"#;
        let article = esg.parse_article("u", html, "social_and_env").unwrap();
        assert_eq!(article.kind, "esg");

        let vs = PortalScraper::venturesquare().unwrap();
        let html = r#"<head><meta property="og:title" content="투자 소식">
            <meta property="article:published_time" content="2024-05-01T10:20:30-05:00"></head>
            <body><div class="entry-content"><p>시드 투자</p></div></body>"#;
        let article = vs.parse_article("u", html, "").unwrap();
        assert_eq!(fmt(&article.create_date), "2024-05-01 10:20:30");
        assert_eq!(article.media.as_deref(), Some("venturesquare"));
    }

    #[test]
    fn test_platum_uses_feed_content() {
        let feed = r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel>
            <item>
              <title>핀테크 투자 유치</title>
              <link>https://platum.kr/archives/1</link>
              <pubDate>Wed, 01 May 2024 10:20:30 +0900</pubDate>
              <category><![CDATA[Startup]]></category>
              <content:encoded><![CDATA[<p>핀테크 기업이 투자를 받았다.</p><img src="https://platum.kr/a.png">]]></content:encoded>
            </item>
            <item>
              <title>날짜 없음</title>
              <link>https://platum.kr/archives/2</link>
              <content:encoded><![CDATA[<p>본문</p>]]></content:encoded>
            </item>
        </channel></rss>"#;
        let platum = PortalScraper::platum().unwrap();
        let items = platum.parse_board(&platum.boards()[0], feed).unwrap();
        assert_eq!(items.len(), 2);

        let BoardItem::Feed { article: Ok(article), .. } = &items[0] else {
            panic!("feed article expected: {:?}", items[0]);
        };
        assert_eq!(article.title, "핀테크 투자 유치");
        assert_eq!(article.content, "핀테크 기업이 투자를 받았다");
        assert_eq!(fmt(&article.create_date), "2024-05-01 10:20:30");
        assert_eq!(article.kind, "startup");
        assert_eq!(article.media.as_deref(), Some("platum"));
        assert_eq!(article.image_url.as_deref(), Some("https://platum.kr/a.png"));

        assert!(matches!(
            &items[1],
            BoardItem::Feed { article: Err(DataError::ParseError(_)), .. }
        ));
    }

    #[test]
    fn test_with_origin() {
        let zdnet = PortalScraper::zdnet().unwrap().with_origin("http://127.0.0.1:9");
        assert_eq!(zdnet.boards()[0].url, "http://127.0.0.1:9/news/?lstcode=0000&page=1");
        assert_eq!(zdnet.resolve("/view/?no=1"), "http://127.0.0.1:9/view/?no=1");

        let thebell = PortalScraper::thebell().unwrap().with_origin("http://h");
        assert_eq!(thebell.resolve("ArticleView.asp?key=1"), "http://h/free/content/ArticleView.asp?key=1");
    }
}
