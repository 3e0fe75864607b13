//! 날짜 문자열 정규화.
//!
//! 뉴스 포털과 공시 API는 제각각의 날짜 표기를 사용합니다. 각 파서는 하나의 표기만
//! 처리하는 순수 함수이며, 형식이 맞지 않으면 `None`을 반환합니다.
//! [`normalize`]는 모든 파서를 정해진 순서로 시도합니다.
//!
//! 저장 시에는 [`format_standard`]로 `YYYY-MM-DD HH:MM:SS` 문자열을 만듭니다.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Asia::Seoul;
use chrono_tz::Tz;
use regex::Regex;

/// 정규화된 날짜 문자열 형식.
pub const STANDARD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_with(input: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), format).ok()
}

/// `2024-05-01 10:20:30`
pub fn standard(input: &str) -> Option<NaiveDateTime> {
    parse_with(input, STANDARD_FORMAT)
}

/// `2024-05-01 10:20`
pub fn without_seconds(input: &str) -> Option<NaiveDateTime> {
    parse_with(input, "%Y-%m-%d %H:%M")
}

/// `2024년05월01일 10:20`
///
/// 포털마다 공백 위치가 달라서 공백을 모두 제거한 뒤 파싱합니다.
pub fn korean(input: &str) -> Option<NaiveDateTime> {
    let compacted: String = input.split_whitespace().collect();
    NaiveDateTime::parse_from_str(&compacted, "%Y년%m월%d일%H:%M").ok()
}

/// `20240501102030`
pub fn compact(input: &str) -> Option<NaiveDateTime> {
    parse_with(input, "%Y%m%d%H%M%S")
}

/// `20240501T102030`
pub fn compact_with_separator(input: &str) -> Option<NaiveDateTime> {
    parse_with(input, "%Y%m%dT%H%M%S")
}

/// `2024.05.01 10:20`
pub fn period(input: &str) -> Option<NaiveDateTime> {
    parse_with(input, "%Y.%m.%d %H:%M")
}

/// `2024.05.01` (자정으로 간주)
pub fn date_period(input: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(input.trim(), "%Y.%m.%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `2024. 5. 1. 14:30` (다음 뉴스)
///
/// 공백을 모두 제거한 뒤 파싱하므로 한 자리 월/일도 허용합니다.
pub fn dotted(input: &str) -> Option<NaiveDateTime> {
    let compacted: String = input.split_whitespace().collect();
    NaiveDateTime::parse_from_str(&compacted, "%Y.%m.%d.%H:%M").ok()
}

fn iso_offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)(?:[Zz]|[+-]\d{2}:?\d{2})$")
            .expect("valid iso offset regex")
    })
}

/// ISO 8601. 시각 뒤의 `Z`/`±HH:MM`/`±HHMM` 오프셋은 버리고 벽시계 시각만 사용합니다.
/// 소수 초는 저장 형식에 맞춰 버립니다.
pub fn iso(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    let without_offset = iso_offset_regex()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str());

    parse_with(without_offset, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|| parse_with(without_offset, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|| parse_with(without_offset, "%Y-%m-%dT%H:%M"))
        .or_else(|| {
            NaiveDate::parse_from_str(without_offset, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .and_then(|dt| dt.with_nanosecond(0))
}

/// RFC 2822 (`Tue, 01 Oct 2024 10:20:30 +0900`). 원문의 현지 시각을 유지합니다.
pub fn rfc2822(input: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc2822(input.trim())
        .ok()
        .map(|dt| dt.naive_local())
}

/// `Tue, 01 Oct 2024 10:20:30 GMT`
pub fn gmt(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_suffix("GMT")
        .or_else(|| trimmed.strip_suffix("UTC"))?;
    parse_with(body, "%a, %d %b %Y %H:%M:%S")
}

fn english_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+):(\d+) (a\.m\.|p\.m\.) ET (\w+)\. (\d+), (\d+)")
            .expect("valid english date regex")
    })
}

fn month_from_abbr(abbr: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = abbr.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
}

/// `9:05 p.m. ET Oct. 1, 2024`
pub fn english(input: &str) -> Option<NaiveDateTime> {
    let caps = english_regex().captures(input)?;

    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    match &caps[3] {
        "p.m." if hour != 12 => hour += 12,
        "a.m." if hour == 12 => hour = 0,
        _ => {}
    }
    let month = month_from_abbr(&caps[4])?;
    let day: u32 = caps[5].parse().ok()?;
    let year: i32 = caps[6].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

fn naver_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"기사입력 (\d{4}\.\d{2}\.\d{2}\.) (오전|오후) (\d{2}):(\d{2})")
            .expect("valid naver date regex")
    })
}

/// `기사입력 2024.05.01. 오후 03:20`
pub fn naver(input: &str) -> Option<NaiveDateTime> {
    let caps = naver_regex().captures(input)?;

    let date = NaiveDate::parse_from_str(caps[1].trim_end_matches('.'), "%Y.%m.%d").ok()?;
    let mut hour: u32 = caps[3].parse().ok()?;
    let minute: u32 = caps[4].parse().ok()?;
    if &caps[2] == "오후" && hour < 12 {
        hour += 12;
    }

    date.and_hms_opt(hour, minute, 0)
}

type Parser = fn(&str) -> Option<NaiveDateTime>;

const PARSERS: [Parser; 13] = [
    standard,
    without_seconds,
    korean,
    compact,
    compact_with_separator,
    period,
    date_period,
    iso,
    rfc2822,
    gmt,
    english,
    naver,
    dotted,
];

/// 알려진 모든 형식을 순서대로 시도합니다.
pub fn normalize(input: &str) -> Option<NaiveDateTime> {
    if input.trim().is_empty() {
        return None;
    }
    PARSERS.iter().find_map(|parse| parse(input))
}

/// 표준 문자열로 변환합니다.
pub fn format_standard(dt: &NaiveDateTime) -> String {
    dt.format(STANDARD_FORMAT).to_string()
}

/// 현재 한국 시각.
pub fn kst_now() -> DateTime<Tz> {
    chrono::Utc::now().with_timezone(&Seoul)
}

/// 다음 KST 자정까지 남은 시간 (1초 여유 포함).
pub fn until_next_midnight(now: DateTime<Tz>) -> Duration {
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| Seoul.from_local_datetime(&naive).single());

    match next_midnight {
        Some(midnight) => (midnight - now) + Duration::seconds(1),
        // 날짜 범위 끝. 실제로는 도달하지 않음
        None => Duration::seconds(i64::from(86_400 - now.num_seconds_from_midnight()) + 1),
    }
}

/// `YYYYMMDD` 형식의 날짜 문자열 (DART `end_de` 등).
pub fn yyyymmdd(now: DateTime<Tz>) -> String {
    now.format("%Y%m%d").to_string()
}
