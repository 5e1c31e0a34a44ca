use std::fmt::{Display, Formatter};

use chrono::Weekday;
use serde::{Serialize, Serializer};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays that never count as business days.
///
/// Iteration is always Monday-first regardless of insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekendDays(u8);

impl WeekendDays {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut set = Self::empty();
        for day in days {
            set.insert(day);
        }
        set
    }

    /// Parse a comma-separated list of 3-letter abbreviations ("Sat, Sun").
    ///
    /// Matching is case-insensitive and unknown tokens are dropped. A blank
    /// input yields the default Saturday/Sunday weekend.
    pub fn parse(input: &str) -> Self {
        if input.trim().is_empty() {
            return Self::default();
        }

        let tokens: Vec<&str> = input.split(',').map(str::trim).collect();
        Self::new(
            WEEK.into_iter()
                .filter(|day| tokens.iter().any(|token| abbreviation_matches(*day, token))),
        )
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= bit(day);
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Every day of the week is a weekend day; no business day can exist.
    pub const fn is_full(self) -> bool {
        self.len() == WEEK.len()
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }
}

impl Default for WeekendDays {
    fn default() -> Self {
        Self::new([Weekday::Sat, Weekday::Sun])
    }
}

impl Display for WeekendDays {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|day| day.to_string()).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for WeekendDays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|day| day.to_string()))
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

fn abbreviation_matches(day: Weekday, token: &str) -> bool {
    token.len() == 3 && day.to_string().eq_ignore_ascii_case(token)
}
