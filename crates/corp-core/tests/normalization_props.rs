//! 날짜/식별자 정규화 속성 테스트.

use chrono::{NaiveDate, NaiveDateTime};
use corp_core::datetime::{self, format_standard, normalize};
use corp_core::normalize_registration_number;
use proptest::prelude::*;

fn any_datetime() -> impl Strategy<Value = NaiveDateTime> {
    (1990i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, m, d, h, mi, s)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap()
        },
    )
}

proptest! {
    #[test]
    fn standard_output_is_a_fixed_point(dt in any_datetime()) {
        let text = format_standard(&dt);
        prop_assert_eq!(normalize(&text), Some(dt));
    }

    #[test]
    fn compact_and_standard_agree(dt in any_datetime()) {
        let compact = dt.format("%Y%m%d%H%M%S").to_string();
        prop_assert_eq!(datetime::compact(&compact), Some(dt));
    }

    #[test]
    fn iso_keeps_wall_clock_for_any_offset(
        dt in any_datetime(),
        sign in prop::sample::select(vec!['+', '-']),
        hours in 0u32..15,
        colon in any::<bool>(),
    ) {
        let sep = if colon { ":" } else { "" };
        let text = format!("{}{}{:02}{}00", dt.format("%Y-%m-%dT%H:%M:%S"), sign, hours, sep);
        prop_assert_eq!(datetime::iso(&text), Some(dt));
    }

    #[test]
    fn naver_afternoon_is_always_pm(dt in any_datetime()) {
        let text = format!("기사입력 {}. 오후 {}", dt.format("%Y.%m.%d"), dt.format("%I:%M"));
        let parsed = datetime::naver(&text).unwrap();
        prop_assert!(chrono::Timelike::hour(&parsed) >= 12);
    }

    #[test]
    fn registration_number_has_no_separators(raw in "[0-9 -]{0,20}") {
        let normalized = normalize_registration_number(&raw);
        prop_assert!(normalized.bytes().all(|b| b.is_ascii_digit()));
    }
}
