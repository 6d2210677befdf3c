use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FilterError, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    Today,
    Tomorrow,
    ThisWeek,
    ThisMonth,
    ThisYear,
    SpecificDay,
}

impl FilterMode {
    pub const ALL: [FilterMode; 6] = [
        FilterMode::Today,
        FilterMode::Tomorrow,
        FilterMode::ThisWeek,
        FilterMode::ThisMonth,
        FilterMode::ThisYear,
        FilterMode::SpecificDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Today => "today",
            FilterMode::Tomorrow => "tomorrow",
            FilterMode::ThisWeek => "thisWeek",
            FilterMode::ThisMonth => "thisMonth",
            FilterMode::ThisYear => "thisYear",
            FilterMode::SpecificDay => "specificDay",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilterMode::Today => "Today",
            FilterMode::Tomorrow => "Tomorrow",
            FilterMode::ThisWeek => "This Week",
            FilterMode::ThisMonth => "This Month",
            FilterMode::ThisYear => "This Year",
            FilterMode::SpecificDay => "Specific Day",
        }
    }

    /// The inclusive calendar range this mode selects around `today`.
    ///
    /// `explicit` is only read for [`FilterMode::SpecificDay`], where it is
    /// required.
    pub fn range(
        &self,
        today: NaiveDate,
        explicit: Option<NaiveDate>,
    ) -> Result<DateRange, FilterError> {
        let overflow = || FilterError::OutOfRange(today);
        match self {
            FilterMode::Today => Ok(DateRange::day(today)),
            FilterMode::Tomorrow => today.succ_opt().map(DateRange::day).ok_or_else(overflow),
            FilterMode::ThisWeek => {
                let offset = today.weekday().num_days_from_sunday();
                let start = today
                    .checked_sub_days(Days::new(offset.into()))
                    .ok_or_else(overflow)?;
                let end = start.checked_add_days(Days::new(6)).ok_or_else(overflow)?;
                Ok(DateRange::new(start, end))
            }
            FilterMode::ThisMonth => {
                let start = today.with_day(1).ok_or_else(overflow)?;
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                };
                let end = next_month
                    .and_then(|d| d.pred_opt())
                    .ok_or_else(overflow)?;
                Ok(DateRange::new(start, end))
            }
            FilterMode::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or_else(overflow)?;
                let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).ok_or_else(overflow)?;
                Ok(DateRange::new(start, end))
            }
            FilterMode::SpecificDay => explicit
                .map(DateRange::day)
                .ok_or(FilterError::MissingSpecificDate),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = ParseError;

    /// Accepts the camelCase names as well as kebab and snake spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        FilterMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().to_ascii_lowercase() == key)
            .ok_or_else(|| ParseError::FilterMode(s.to_string()))
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.format("%Y-%m-%d"))
        } else {
            write!(
                f,
                "{} .. {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}
