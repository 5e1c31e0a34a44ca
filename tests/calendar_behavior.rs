//! Behavior tests for business-day resolution.
//!
//! These tests describe which day's export a run checks, as an operator
//! would observe it through the resolved date and epoch token.

use candlecheck_core::FileTokenFormat;
use candlecheck_tests::{
    date, resolve_check_date, utc, BusinessDayRequest, CalendarError, GateConfig, WeekendDays,
};
use chrono::{Datelike, Weekday};

// =============================================================================
// Weekday runs
// =============================================================================

#[test]
fn when_run_on_a_tuesday_the_monday_export_is_checked() {
    // Given: Tuesday morning in UTC with a Sat/Sun weekend
    let request = BusinessDayRequest::new(utc(2024, 3, 12, 6), chrono_tz::UTC);

    // When: The check date is resolved
    let day = resolve_check_date(&request).expect("resolves");

    // Then: Monday's local midnight is the token
    assert_eq!(day.date, date(2024, 3, 11));
    assert_eq!(day.epoch_millis, 1_710_115_200_000);
    assert!(!day.overridden);
}

#[test]
fn when_run_on_a_monday_the_weekend_is_skipped_back_to_friday() {
    // Given: Monday in New York
    let request = BusinessDayRequest::new(utc(2024, 3, 11, 15), chrono_tz::America::New_York);

    // When: The check date is resolved
    let day = resolve_check_date(&request).expect("resolves");

    // Then: Friday 2024-03-08 at New York midnight (EST, UTC-5)
    assert_eq!(day.date, date(2024, 3, 8));
    assert_eq!(day.epoch_millis, 1_709_874_000_000);
}

#[test]
fn when_utc_and_zone_dates_differ_the_zone_date_wins() {
    // Given: 20:00 UTC Monday is already Tuesday 05:00 in Tokyo
    let request = BusinessDayRequest::new(utc(2024, 3, 11, 20), chrono_tz::Asia::Tokyo);

    // When: The check date is resolved
    let day = resolve_check_date(&request).expect("resolves");

    // Then: Yesterday is Monday in Tokyo
    assert_eq!(day.date, date(2024, 3, 11));
}

// =============================================================================
// Custom weekends
// =============================================================================

#[test]
fn when_weekend_is_friday_and_saturday_a_sunday_run_checks_thursday() {
    // Given: A Middle-East style weekend
    let weekend = WeekendDays::parse("fri,SAT");
    let request =
        BusinessDayRequest::new(utc(2024, 3, 10, 8), chrono_tz::Asia::Dubai).with_weekend(weekend);

    // When: The check date is resolved on Sunday
    let day = resolve_check_date(&request).expect("resolves");

    // Then: Thursday is checked
    assert_eq!(day.date, date(2024, 3, 7));
}

#[test]
fn when_every_day_is_a_weekend_no_business_day_is_found() {
    // Given: All seven days configured as weekend
    let weekend = WeekendDays::parse("Mon,Tue,Wed,Thu,Fri,Sat,Sun");
    let request = BusinessDayRequest::new(utc(2024, 3, 12, 6), chrono_tz::UTC).with_weekend(weekend);

    // When: The check date is resolved
    let err = resolve_check_date(&request).expect_err("cannot resolve");

    // Then: Resolution fails instead of looping
    assert!(matches!(err, CalendarError::NoBusinessDay { lookback: 6, .. }));
}

#[test]
fn when_weekend_is_unset_saturday_and_sunday_apply() {
    // Given: An empty weekend setting in configuration
    let config = GateConfig::from_lookup(|key| match key {
        "CANDLECHECK_LOCAL_STORE_DIR" => Some(String::from("/data")),
        "CANDLECHECK_WEEKEND" => Some(String::from("   ")),
        _ => None,
    })
    .expect("config");

    // When: A Monday run resolves its date
    let day = resolve_check_date(&config.business_day_request(utc(2024, 3, 11, 9))).expect("resolves");

    // Then: Friday is checked
    assert_eq!(config.weekend, WeekendDays::default());
    assert_eq!(day.date, date(2024, 3, 8));
}

// =============================================================================
// Overrides
// =============================================================================

#[test]
fn when_an_override_falls_on_a_weekend_it_is_used_verbatim() {
    // Given: An explicit Saturday
    let request =
        BusinessDayRequest::new(utc(2024, 3, 12, 6), chrono_tz::UTC).with_override("09.03.2024");

    // When: The check date is resolved
    let day = resolve_check_date(&request).expect("resolves");

    // Then: No weekend adjustment applies
    assert_eq!(day.date, date(2024, 3, 9));
    assert!(day.overridden);
}

#[test]
fn when_an_override_is_not_dd_mm_yyyy_the_run_is_rejected() {
    // Given: An ISO-formatted override
    let request =
        BusinessDayRequest::new(utc(2024, 3, 12, 6), chrono_tz::UTC).with_override("2024-03-09");

    // When: The check date is resolved
    let err = resolve_check_date(&request).expect_err("invalid format");

    // Then: The offending value is reported
    assert_eq!(
        err,
        CalendarError::InvalidDateFormat {
            value: String::from("2024-03-09")
        }
    );
}

#[test]
fn when_a_date_token_format_is_configured_the_key_uses_the_calendar_date() {
    // Given: A date-based file token and a folder
    let config = GateConfig::from_lookup(|key| match key {
        "CANDLECHECK_LOCAL_STORE_DIR" => Some(String::from("/data")),
        "CANDLECHECK_FOLDER" => Some(String::from("candles/BANKNIFTY/")),
        "CANDLECHECK_FILE_TOKEN" => Some(String::from("date:%Y%m%d")),
        _ => None,
    })
    .expect("config");

    // When: The key for a Monday run is derived
    let day = resolve_check_date(&config.business_day_request(utc(2024, 3, 11, 9))).expect("resolves");
    let token = config.file_token(&day);

    // Then: Friday's date appears in the key
    assert_eq!(config.file_token, FileTokenFormat::Date(String::from("%Y%m%d")));
    assert_eq!(config.artifact_key(&token), "candles/BANKNIFTY/20240308.csv");
}

// =============================================================================
// Every weekend set
// =============================================================================

#[test]
fn for_every_weekend_set_the_resolved_day_is_a_business_day() {
    // Given: All 128 weekend sets and a run on each day of one week
    let week = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let mut resolved = 0;

    for mask in 0_u8..128 {
        let weekend = WeekendDays::new(
            week.into_iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, day)| day),
        );

        // Monday 2024-03-11 through Sunday 2024-03-17
        for offset in 0..7 {
            let now = utc(2024, 3, 11 + offset, 12);
            let today = date(2024, 3, 11 + offset);

            // When: The check date is resolved
            let result = resolve_check_date(
                &BusinessDayRequest::new(now, chrono_tz::UTC).with_weekend(weekend),
            );

            // Then: Either a non-weekend day before today, or a full-week weekend
            match result {
                Ok(day) => {
                    assert!(!weekend.contains(day.date.weekday()), "{weekend} resolved to {}", day.date);
                    assert!(day.date < today);
                    let mut skipped = day.date.succ_opt().expect("next day");
                    while skipped < today {
                        assert!(weekend.contains(skipped.weekday()), "{weekend} skipped business day {skipped}");
                        skipped = skipped.succ_opt().expect("next day");
                    }
                    resolved += 1;
                }
                Err(CalendarError::NoBusinessDay { .. }) => {
                    assert!(weekend.is_full(), "{weekend} failed to resolve from {today}");
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    assert_eq!(resolved, 127 * 7);
}
