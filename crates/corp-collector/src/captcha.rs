//! 캡차 키 확보 루프.
//!
//! 벤처확인 사이트는 상세 페이지마다 현재 세션의 캡차 숫자 6자리를 요구합니다.
//! 이미지를 받아 OCR 서버로 보내고, 형식이 맞는 키가 나올 때까지 재시도합니다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use corp_data::provider::{is_valid_captcha_key, OcrClient, VentureClient};
use corp_data::Result as DataResult;

/// 캡차 이미지 제공자.
#[async_trait]
pub trait CaptchaSource: Send + Sync {
    async fn fetch_image(&self) -> DataResult<Vec<u8>>;
}

/// 캡차 이미지 인식기.
#[async_trait]
pub trait CaptchaReader: Send + Sync {
    async fn read(&self, image: Vec<u8>) -> DataResult<String>;
}

/// 벤처확인 사이트 세션의 캡차 이미지.
///
/// 키는 세션(쿠키)에 묶이므로 상세 조회에 쓰는 클라이언트와 같은 인스턴스여야 합니다.
#[derive(Clone)]
pub struct HttpCaptchaSource {
    client: VentureClient,
}

impl HttpCaptchaSource {
    pub fn new(client: VentureClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptchaSource for HttpCaptchaSource {
    async fn fetch_image(&self) -> DataResult<Vec<u8>> {
        self.client.fetch_captcha_image().await
    }
}

#[async_trait]
impl CaptchaReader for OcrClient {
    async fn read(&self, image: Vec<u8>) -> DataResult<String> {
        self.recognize(image).await
    }
}

/// 캡차 키 확보기.
pub struct CaptchaSolver {
    source: Arc<dyn CaptchaSource>,
    ocr: Arc<dyn CaptchaReader>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl CaptchaSolver {
    pub fn new(
        source: Arc<dyn CaptchaSource>,
        ocr: Arc<dyn CaptchaReader>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            source,
            ocr,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// 숫자 6자리 키를 얻을 때까지 최대 `max_attempts`회 시도합니다.
    ///
    /// 모두 실패하면 `None`입니다.
    pub async fn solve(&self) -> Option<String> {
        for attempt in 1..=self.max_attempts {
            match self.try_once().await {
                Ok(key) if is_valid_captcha_key(&key) => {
                    tracing::debug!(attempt, "캡차 키 확보");
                    return Some(key);
                }
                Ok(key) => {
                    tracing::warn!(attempt, key = %key, "캡차 인식 결과 형식 오류");
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "캡차 인식 실패");
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        tracing::error!(attempts = self.max_attempts, "캡차 키를 얻지 못했습니다");
        None
    }

    async fn try_once(&self) -> DataResult<String> {
        let image = self.source.fetch_image().await?;
        self.ocr.read(image).await
    }
}
