//! OCR 서버 클라이언트.
//!
//! 캡차 이미지를 외부 TrOCR 서버(`/api/v1/trocr`)로 보내 문자열을 인식합니다.
//! 서버는 `{"status": 200, "text": "123456"}` 형식으로 응답합니다.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{DataError, Result};

/// 캡차 키 길이.
pub const CAPTCHA_KEY_LEN: usize = 6;

/// 캡차 키가 숫자 6자리인지 확인합니다.
pub fn is_valid_captcha_key(text: &str) -> bool {
    text.len() == CAPTCHA_KEY_LEN && text.bytes().all(|b| b.is_ascii_digit())
}

/// OCR 서버 클라이언트.
#[derive(Clone)]
pub struct OcrClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OcrClient {
    /// `http://{host}:{port}/api/v1/trocr`로 요청하는 클라이언트를 생성합니다.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_endpoint(format!("http://{}:{}/api/v1/trocr", host, port))
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 이미지를 인식해 공백을 제거한 문자열을 반환합니다.
    ///
    /// 형식 검증은 호출 측에서 [`is_valid_captcha_key`]로 합니다.
    pub async fn recognize(&self, image: Vec<u8>) -> Result<String> {
        #[derive(Deserialize)]
        struct RawOcr {
            status: u16,
            #[serde(default)]
            text: Option<String>,
        }

        let part = Part::bytes(image)
            .file_name("captcha.png")
            .mime_str("image/png")?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::HttpStatus {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let raw: RawOcr = response.json().await?;
        if raw.status != 200 {
            return Err(DataError::Api {
                status: raw.status.to_string(),
                message: "OCR 인식 실패".to_string(),
            });
        }

        let text = raw
            .text
            .ok_or_else(|| DataError::InvalidData("OCR 응답에 text가 없습니다".to_string()))?;

        let key: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        tracing::debug!(key = %key, "캡차 인식 결과");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_captcha_key() {
        assert!(is_valid_captcha_key("012345"));
        assert!(!is_valid_captcha_key("12345"));
        assert!(!is_valid_captcha_key("1234567"));
        assert!(!is_valid_captcha_key("12a456"));
        assert!(!is_valid_captcha_key("١٢٣٤٥٦"));
    }

    #[test]
    fn test_endpoint_format() {
        let client = OcrClient::new("ocr.internal", 8080).unwrap();
        assert_eq!(client.endpoint(), "http://ocr.internal:8080/api/v1/trocr");
    }
}
