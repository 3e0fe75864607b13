//! RSS 2.0 피드 파싱.

use serde::Deserialize;

use crate::error::Result;

/// 피드 항목 하나.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
    #[serde(rename = "category", default)]
    pub categories: Vec<String>,
    /// `content:encoded` 본문 HTML
    #[serde(rename = "content:encoded", alias = "encoded", default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

/// 피드의 `<item>`을 순서대로 반환합니다. 링크가 빈 항목은 버립니다.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let rss: Rss = quick_xml::de::from_str(xml.trim_start_matches('\u{feff}'))?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .map(|mut item| {
            item.title = item.title.trim().to_string();
            item.link = item.link.trim().to_string();
            item.pub_date = item.pub_date.trim().to_string();
            item
        })
        .filter(|item| !item.link.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataError;

    #[test]
    fn test_parse_feed() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
          <channel>
            <title>플래텀</title>
            <link>https://platum.kr</link>
            <item>
              <title> 스타트업 투자 동향 </title>
              <link>https://platum.kr/archives/1</link>
              <pubDate>Wed, 01 May 2024 10:20:30 +0900</pubDate>
              <category><![CDATA[Startup]]></category>
              <category><![CDATA[투자]]></category>
              <description><![CDATA[요약]]></description>
              <content:encoded><![CDATA[<p>본문 <img src="https://platum.kr/a.png"></p>]]></content:encoded>
            </item>
            <item>
              <title>링크 없음</title>
              <link> </link>
            </item>
          </channel>
        </rss>"#;

        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "스타트업 투자 동향");
        assert_eq!(items[0].link, "https://platum.kr/archives/1");
        assert_eq!(items[0].pub_date, "Wed, 01 May 2024 10:20:30 +0900");
        assert_eq!(items[0].categories, vec!["Startup", "투자"]);
        assert!(items[0].content.as_deref().unwrap().contains("<img"));
    }

    #[test]
    fn test_parse_empty_channel() {
        let xml = "<rss><channel><title>빈 피드</title></channel></rss>";
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_not_rss() {
        assert!(matches!(parse_feed("<html>"), Err(DataError::ParseError(_))));
    }
}
