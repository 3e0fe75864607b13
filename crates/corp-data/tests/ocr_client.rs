//! OCR 서버 클라이언트 통합 테스트.

use corp_data::provider::{is_valid_captcha_key, OcrClient};
use corp_data::DataError;
use mockito::Matcher;

#[tokio::test]
async fn test_recognize_captcha() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/trocr")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"status": 200, "text": " 48 2913 "}"#)
        .create_async()
        .await;

    let client = OcrClient::with_endpoint(format!("{}/api/v1/trocr", server.url())).unwrap();
    let key = client.recognize(vec![0x89, b'P', b'N', b'G']).await.unwrap();

    assert_eq!(key, "482913");
    assert!(is_valid_captcha_key(&key));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_recognize_failure_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/trocr")
        .with_status(200)
        .with_body(r#"{"status": 500}"#)
        .create_async()
        .await;

    let client = OcrClient::with_endpoint(format!("{}/api/v1/trocr", server.url())).unwrap();
    let err = client.recognize(vec![1, 2, 3]).await.unwrap_err();
    assert!(matches!(err, DataError::Api { status, .. } if status == "500"));
}
