//! Synology Chat 전송기 통합 테스트 (mockito).

use corp_notification::{
    Notification, NotificationError, NotificationEvent, NotificationSender, SynologyConfig,
    SynologySender,
};
use mockito::Matcher;

fn started() -> Notification {
    Notification::new(NotificationEvent::ScrapeStarted {
        job: "벤처기업 상세정보".to_string(),
        started_at: "2024-05-01 09:00:00".to_string(),
    })
}

fn sender(server: &mockito::ServerGuard) -> SynologySender {
    let config = SynologyConfig::new(format!("{}/webapi/entry.cgi", server.url()), "prod-token".into())
        .with_dev_token("dev-token");
    SynologySender::new(config).unwrap()
}

#[tokio::test]
async fn test_send_posts_payload_form() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webapi/entry.cgi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api".into(), "SYNO.Chat.External".into()),
            Matcher::UrlEncoded("method".into(), "incoming".into()),
            Matcher::UrlEncoded("version".into(), "2".into()),
            Matcher::UrlEncoded("token".into(), "prod-token".into()),
        ]))
        .match_body(Matcher::UrlEncoded(
            "payload".into(),
            r#"{"text":"벤처기업 상세정보 스크래핑을 시작합니다. (2024-05-01 09:00:00)"}"#.into(),
        ))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    sender(&server).send(&started()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_report_uses_dev_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webapi/entry.cgi")
        .match_query(Matcher::UrlEncoded("token".into(), "dev-token".into()))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let error = Notification::new(NotificationEvent::NewsError {
        portal: "naver".to_string(),
        message: "timeout".to_string(),
        occurred_at: "2024-05-01 10:00:00".to_string(),
    });
    sender(&server).send(&error).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/webapi/entry.cgi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": false, "error": {"code": 404}}"#)
        .create_async()
        .await;

    let err = sender(&server).send(&started()).await.unwrap_err();
    assert!(matches!(err, NotificationError::SendFailed(_)));
}

#[tokio::test]
async fn test_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/webapi/entry.cgi")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let err = sender(&server).send(&started()).await.unwrap_err();
    assert!(matches!(err, NotificationError::RateLimited(60)));
}

#[tokio::test]
async fn test_disabled_sender_skips_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webapi/entry.cgi")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = SynologyConfig::new(format!("{}/webapi/entry.cgi", server.url()), "prod-token".into());
    config.enabled = false;
    let sender = SynologySender::new(config).unwrap();

    assert!(!sender.is_enabled());
    sender.send(&started()).await.unwrap();
    mock.assert_async().await;
}
