//! Business-day resolution.
//!
//! Decides which day's export a run must check. Without an override the
//! answer is the most recent business day strictly before "today" in the
//! configured zone. Weekend days are skipped one at a time, so irregular
//! weekend sets (Friday only, three-day weekends) need no special casing.
//!
//! ```rust
//! use candlecheck_core::calendar::{resolve_check_date, BusinessDayRequest};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! // Monday 2024-03-11: yesterday is Sunday, so Friday's export is checked.
//! let now = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
//! let day = resolve_check_date(&BusinessDayRequest::new(now, chrono_tz::UTC)).unwrap();
//! assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
//! ```

use std::fmt::Write;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::{CalendarError, WeekendDays};

/// Upper bound on weekend steps taken beyond "yesterday".
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 6;

const CHECK_DATE_FORMAT: &str = "%d.%m.%Y";

/// Inputs for a single business-day resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDayRequest {
    pub now: DateTime<Utc>,
    pub zone: Tz,
    pub weekend: WeekendDays,
    /// `DD.MM.YYYY`; when present it wins and no weekend adjustment applies.
    pub explicit_override: Option<String>,
    pub max_lookback: u32,
}

impl BusinessDayRequest {
    pub fn new(now: DateTime<Utc>, zone: Tz) -> Self {
        Self {
            now,
            zone,
            weekend: WeekendDays::default(),
            explicit_override: None,
            max_lookback: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }

    pub fn with_weekend(mut self, weekend: WeekendDays) -> Self {
        self.weekend = weekend;
        self
    }

    pub fn with_override(mut self, value: impl Into<String>) -> Self {
        self.explicit_override = Some(value.into());
        self
    }

    pub fn with_max_lookback(mut self, max_lookback: u32) -> Self {
        self.max_lookback = max_lookback;
        self
    }
}

/// The day a run checks, with its local midnight as UTC epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    pub epoch_millis: i64,
    pub overridden: bool,
}

/// How the resolved day is rendered into the artifact file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileTokenFormat {
    /// Local midnight as milliseconds since the UTC epoch.
    #[default]
    EpochMillis,
    /// The calendar date rendered with a chrono strftime pattern.
    Date(String),
}

impl FileTokenFormat {
    /// Accepts `epoch-millis` or `date:<pattern>`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("epoch-millis") {
            return Some(Self::EpochMillis);
        }

        let pattern = value.strip_prefix("date:")?;
        let sample = NaiveDate::from_ymd_opt(2024, 1, 1)?;
        let mut rendered = String::new();
        if pattern.is_empty() || write!(rendered, "{}", sample.format(pattern)).is_err() {
            return None;
        }
        Some(Self::Date(pattern.to_owned()))
    }

    pub fn render(&self, day: &ResolvedDay) -> String {
        match self {
            Self::EpochMillis => day.epoch_millis.to_string(),
            Self::Date(pattern) => {
                let mut rendered = String::new();
                match write!(rendered, "{}", day.date.format(pattern)) {
                    Ok(()) => rendered,
                    Err(_) => {
                        tracing::warn!(pattern = %pattern, "file token pattern is not renderable; using ISO date");
                        day.date.to_string()
                    }
                }
            }
        }
    }
}

/// Resolve the day whose export must be checked.
pub fn resolve_check_date(request: &BusinessDayRequest) -> Result<ResolvedDay, CalendarError> {
    if let Some(raw) = request
        .explicit_override
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        let date = parse_check_date(raw)?;
        tracing::info!(%date, "using explicit checking date");
        return Ok(ResolvedDay {
            date,
            epoch_millis: local_midnight(date, request.zone).timestamp_millis(),
            overridden: true,
        });
    }

    let today = request.now.with_timezone(&request.zone).date_naive();
    let yesterday = previous_day(today, request.max_lookback)?;
    tracing::debug!(%today, zone = %request.zone, weekend = %request.weekend, "resolving business day");
    if request.weekend.is_full() {
        return Err(CalendarError::NoBusinessDay {
            from: yesterday,
            lookback: request.max_lookback,
        });
    }

    let mut candidate = yesterday;
    let mut steps = 0;
    while request.weekend.contains(candidate.weekday()) {
        if steps >= request.max_lookback {
            return Err(CalendarError::NoBusinessDay {
                from: yesterday,
                lookback: request.max_lookback,
            });
        }
        candidate = previous_day(candidate, request.max_lookback)?;
        steps += 1;
    }

    let midnight = local_midnight(candidate, request.zone);
    tracing::info!(date = %candidate, skipped = steps, "resolved business day");
    Ok(ResolvedDay {
        date: candidate,
        epoch_millis: midnight.timestamp_millis(),
        overridden: false,
    })
}

/// Parse a `DD.MM.YYYY` date.
pub fn parse_check_date(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value, CHECK_DATE_FORMAT).map_err(|_| {
        CalendarError::InvalidDateFormat {
            value: value.to_owned(),
        }
    })
}

/// Start of `date` in `zone`. When midnight falls into a DST gap the first
/// valid local time after it is used.
pub fn local_midnight(date: NaiveDate, zone: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    zone.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            (1..=96).find_map(|quarter| {
                zone.from_local_datetime(&(midnight + Duration::minutes(15 * quarter)))
                    .earliest()
            })
        })
        .unwrap_or_else(|| zone.from_utc_datetime(&midnight))
}

fn previous_day(date: NaiveDate, lookback: u32) -> Result<NaiveDate, CalendarError> {
    date.pred_opt().ok_or(CalendarError::NoBusinessDay {
        from: date,
        lookback,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid instant")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn midweek_run_checks_yesterday() {
        let request = BusinessDayRequest::new(utc(2024, 3, 13, 9), chrono_tz::UTC);
        let day = resolve_check_date(&request).expect("must resolve");
        assert_eq!(day.date, date(2024, 3, 12));
        assert!(!day.overridden);
    }

    #[test]
    fn epoch_millis_is_local_midnight_in_zone() {
        // 2024-03-12 00:00 in Kolkata is 2024-03-11T18:30:00Z.
        let request = BusinessDayRequest::new(utc(2024, 3, 13, 9), chrono_tz::Asia::Kolkata);
        let day = resolve_check_date(&request).expect("must resolve");
        assert_eq!(day.epoch_millis, 1_710_181_800_000);
    }

    #[test]
    fn today_is_taken_in_configured_zone() {
        // 20:00 UTC Tuesday is already Wednesday in Tokyo, so Tuesday is checked.
        let request = BusinessDayRequest::new(utc(2024, 3, 12, 20), chrono_tz::Asia::Tokyo);
        let day = resolve_check_date(&request).expect("must resolve");
        assert_eq!(day.date, date(2024, 3, 12));
    }

    #[test]
    fn friday_only_weekend_skips_a_single_day() {
        // Saturday run: yesterday is Friday, which is the weekend.
        let request = BusinessDayRequest::new(utc(2024, 3, 16, 6), chrono_tz::UTC)
            .with_weekend(WeekendDays::new([Weekday::Fri]));
        let day = resolve_check_date(&request).expect("must resolve");
        assert_eq!(day.date, date(2024, 3, 14));
    }

    #[test]
    fn full_week_weekend_fails_within_bound() {
        let request = BusinessDayRequest::new(utc(2024, 3, 13, 9), chrono_tz::UTC)
            .with_weekend(WeekendDays::parse("Mon,Tue,Wed,Thu,Fri,Sat,Sun"));
        let err = resolve_check_date(&request).expect_err("must fail");
        assert_eq!(
            err,
            CalendarError::NoBusinessDay {
                from: date(2024, 3, 12),
                lookback: DEFAULT_MAX_LOOKBACK_DAYS,
            }
        );
    }

    #[test]
    fn six_day_weekend_still_resolves_with_default_bound() {
        // Only Monday is a business day. A Monday run walks back a full week.
        let request = BusinessDayRequest::new(utc(2024, 3, 11, 9), chrono_tz::UTC)
            .with_weekend(WeekendDays::parse("Tue,Wed,Thu,Fri,Sat,Sun"));
        let day = resolve_check_date(&request).expect("must resolve");
        assert_eq!(day.date, date(2024, 3, 4));
    }

    #[test]
    fn tighter_bound_gives_up_earlier() {
        let request = BusinessDayRequest::new(utc(2024, 3, 11, 9), chrono_tz::UTC)
            .with_max_lookback(1);
        assert!(matches!(
            resolve_check_date(&request),
            Err(CalendarError::NoBusinessDay { lookback: 1, .. })
        ));
    }

    #[test]
    fn blank_override_is_ignored() {
        let request =
            BusinessDayRequest::new(utc(2024, 3, 13, 9), chrono_tz::UTC).with_override("   ");
        let day = resolve_check_date(&request).expect("must resolve");
        assert_eq!(day.date, date(2024, 3, 12));
    }

    #[test]
    fn malformed_override_is_rejected() {
        let request =
            BusinessDayRequest::new(utc(2024, 3, 13, 9), chrono_tz::UTC).with_override("2024-03-15");
        let err = resolve_check_date(&request).expect_err("must fail");
        assert!(matches!(err, CalendarError::InvalidDateFormat { .. }));
    }

    #[test]
    fn midnight_in_dst_gap_moves_to_first_valid_instant() {
        // Santiago skipped 00:00-01:00 on 2022-09-11.
        let zone = chrono_tz::America::Santiago;
        let start = local_midnight(date(2022, 9, 11), zone);
        assert_eq!(start.date_naive(), date(2022, 9, 11));
        assert_eq!(start.time(), NaiveTime::from_hms_opt(1, 0, 0).expect("valid time"));
    }

    #[test]
    fn token_formats_render_millis_or_date() {
        let day = ResolvedDay {
            date: date(2024, 3, 8),
            epoch_millis: 1_709_856_000_000,
            overridden: false,
        };
        assert_eq!(FileTokenFormat::EpochMillis.render(&day), "1709856000000");

        let format = FileTokenFormat::parse("date:%d.%m.%Y").expect("pattern should parse");
        assert_eq!(format.render(&day), "08.03.2024");
    }

    #[test]
    fn token_format_rejects_unknown_values() {
        assert_eq!(FileTokenFormat::parse("EPOCH-MILLIS"), Some(FileTokenFormat::EpochMillis));
        assert_eq!(FileTokenFormat::parse("date:"), None);
        assert_eq!(FileTokenFormat::parse("iso"), None);
    }
}
