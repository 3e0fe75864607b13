//! Postgres 저장소 테스트.
//!
//! 실제 DB가 필요합니다: `DATABASE_URL=... cargo test -p corp-data --test storage -- --ignored`

use chrono::NaiveDateTime;
use corp_core::{NewsArticle, ScrapSessionLog};
use corp_data::provider::url_md5;
use corp_data::storage::{CollectionsRepository, MIGRATOR};
use sqlx::PgPool;

async fn repository() -> CollectionsRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    let pool = PgPool::connect(&url).await.unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    CollectionsRepository::new(pool)
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[tokio::test]
#[ignore]
async fn test_news_article_dedup() {
    let repo = repository().await;
    let url = format!("https://n.news.naver.com/article/test/{}", std::process::id());
    let article = NewsArticle {
        url: url.clone(),
        url_md5: url_md5(&url),
        title: "테스트 기사".to_string(),
        content: "본문".to_string(),
        create_date: at("2024-05-01 14:30:00"),
        kind: "economy".to_string(),
        image_url: None,
        portal: "naver".to_string(),
        media: Some("연합뉴스".to_string()),
        category: "101".to_string(),
    };

    repo.insert_news_articles(&[article.clone()]).await.unwrap();
    assert!(repo.news_url_exists(&article.url_md5).await.unwrap());

    let again = repo.insert_news_articles(&[article]).await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
#[ignore]
async fn test_daily_news_statistics() {
    let repo = repository().await;
    let portal = format!("test-{}", std::process::id());

    for (success, fail) in [(3, 1), (2, 0)] {
        let mut log = ScrapSessionLog::start(&portal, at("2001-02-03 10:00:00"));
        log.record_success(success);
        for _ in 0..fail {
            log.record_fail();
        }
        log.finish(at("2001-02-03 10:05:00"));
        repo.insert_session_log(&log).await.unwrap();
    }

    let date = at("2001-02-03 00:00:00").date();
    let stats = repo.daily_news_statistics(date).await.unwrap();
    let ours = stats.iter().find(|s| s.portal == portal).unwrap();
    assert_eq!(ours.success, 5);
    assert_eq!(ours.fail, 1);
}
