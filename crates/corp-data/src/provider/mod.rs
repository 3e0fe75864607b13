//! 외부 데이터 소스 Provider 모듈.
//!
//! ## DART OpenAPI
//! - `DartClient`: 기업개황, 단일회사 전체 재무제표, 공시목록, 고유번호 파일
//! - 응답 `status` 코드를 `DartStatus`로 분류 (정상/데이터 없음/한도 초과/기타)
//!
//! ## OCR 서버
//! - `OcrClient`: 캡차 이미지를 TrOCR 서버로 보내 6자리 숫자 키를 인식
//!
//! ## 벤처확인종합관리시스템
//! - `VentureClient`: 벤처기업 목록, 캡차 이미지, 상세 페이지 (쿠키 세션 유지)
//! - `parse_detail`: 상세 페이지를 기본정보/재무/투자/확인서 레코드로 변환
//!
//! ## 뉴스
//! - `NewsFetcher`: 재시도와 EUC-KR 디코딩을 포함한 조회 (언론사 이름으로 인코딩 판단)
//! - `NewsPortal`: 포털별 목록/기사 파서 트레이트
//! - `NaverNewsScraper`: 네이버 뉴스 목록/기사 파싱
//! - `PortalScraper`: 다음, ZDNet, 더벨, 스타트업엔, 스타트업투데이, 벤처스퀘어, 플래텀, ESG경제

pub mod dart;
pub mod news;
pub mod ocr;
pub mod venture;

pub use dart::{
    parse_corp_code_archive, parse_corp_code_xml, DartClient, DartResponse, DartStatus,
    NoticePage, NoticeQuery, DART_API_BASE_URL, QUOTA_STATUS_CODES,
};
pub use news::{
    clean_text, decode_body, parse_feed, portal_by_name, section_kind, url_md5, Board, BoardItem,
    FeedItem, NaverNewsScraper, NewsFetcher, NewsPortal, PortalScraper, ScrapedUrlCache,
    NAVER_CATEGORIES, NAVER_PORTAL, PORTAL_NAMES,
};
pub use ocr::{is_valid_captcha_key, OcrClient, CAPTCHA_KEY_LEN};
pub use venture::{parse_detail, preprocess_digit_value, VentureClient, VentureList};
