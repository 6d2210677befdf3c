use thiserror::Error;

/// Errors raised by the date-range classifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("the specificDay filter needs an explicit date")]
    MissingSpecificDate,

    #[error("date range overflows the calendar around {0}")]
    OutOfRange(chrono::NaiveDate),
}

/// Errors from turning user-facing names into filter settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown filter mode '{0}' (expected today, tomorrow, thisWeek, thisMonth, thisYear or specificDay)")]
    FilterMode(String),

    #[error("unknown category '{0}' (expected pending, in_progress, completed or overdue)")]
    Bucket(String),

    #[error("unknown date field '{0}' (expected due or created)")]
    DateField(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    Date(String),
}
