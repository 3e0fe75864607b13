//! 벤처확인 사이트 캡차 이미지 → OCR 서버 연동 테스트.

use std::sync::Arc;
use std::time::Duration;

use corp_collector::{CaptchaSolver, HttpCaptchaSource};
use corp_data::provider::{OcrClient, VentureClient};

async fn solver(server: &mockito::ServerGuard, attempts: u32) -> CaptchaSolver {
    let venture = VentureClient::with_base_url(server.url()).unwrap();
    let ocr = OcrClient::with_endpoint(format!("{}/api/v1/trocr", server.url())).unwrap();
    CaptchaSolver::new(
        Arc::new(HttpCaptchaSource::new(venture)),
        Arc::new(ocr),
        attempts,
        Duration::from_millis(10),
    )
}

#[tokio::test]
async fn test_solve_with_ocr_server() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/captchaImg.do")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([0x89, b'P', b'N', b'G'])
        .expect(1)
        .create_async()
        .await;
    let ocr = server
        .mock("POST", "/api/v1/trocr")
        .with_status(200)
        .with_body(r#"{"status": 200, "text": "48 29 13"}"#)
        .expect(1)
        .create_async()
        .await;

    let key = solver(&server, 3).await.solve().await;

    assert_eq!(key.as_deref(), Some("482913"));
    image.assert_async().await;
    ocr.assert_async().await;
}

#[tokio::test]
async fn test_solve_gives_up_on_invalid_keys() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/captchaImg.do")
        .with_status(200)
        .with_body([1, 2, 3])
        .expect(3)
        .create_async()
        .await;
    let ocr = server
        .mock("POST", "/api/v1/trocr")
        .with_status(200)
        .with_body(r#"{"status": 200, "text": "48a913"}"#)
        .expect(3)
        .create_async()
        .await;

    let key = solver(&server, 3).await.solve().await;

    assert_eq!(key, None);
    image.assert_async().await;
    ocr.assert_async().await;
}

#[tokio::test]
async fn test_solve_image_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/captchaImg.do")
        .with_status(502)
        .expect(2)
        .create_async()
        .await;
    let ocr = server
        .mock("POST", "/api/v1/trocr")
        .expect(0)
        .create_async()
        .await;

    let key = solver(&server, 2).await.solve().await;

    assert_eq!(key, None);
    ocr.assert_async().await;
}
