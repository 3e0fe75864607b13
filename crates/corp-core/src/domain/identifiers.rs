//! 사업자등록번호, 법인등록번호 정규화.

/// 구분자(`-`)와 공백을 제거합니다.
///
/// 벤처확인 사이트는 `123-45-67890`, companies DB는 `1234567890` 형식을 사용하므로
/// 두 소스를 조인하기 전에 항상 이 함수를 거칩니다.
pub fn normalize_registration_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// 10자리 사업자등록번호 형식인지 확인합니다.
pub fn is_business_number(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}
