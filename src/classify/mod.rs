//! Client-side date-range filtering and status bucketing for tasks and tickets.
//!
//! Everything here is a pure function over a caller-supplied slice. Each
//! operation has a `*_at` variant taking an explicit reference instant; the
//! plain variant uses the local wall clock.

pub mod bucket;
pub mod range;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::error::FilterError;
use crate::model::{DateField, Tracked};

pub use bucket::{
    categorize, categorize_at, is_overdue, select_category, select_category_at, Bucket,
    BucketCounts,
};
pub use range::{DateRange, FilterMode};

/// Items whose `field` falls inside the range `mode` selects, relative to now.
pub fn filter_by_range<T: Tracked>(
    items: &[T],
    field: DateField,
    mode: FilterMode,
    explicit: Option<NaiveDate>,
) -> Result<Vec<&T>, FilterError> {
    filter_by_range_at(items, field, mode, &Local::now(), explicit)
}

/// Like [`filter_by_range`], with calendar days taken in `reference`'s zone.
///
/// Items whose date is missing or unreadable are dropped. Input order is
/// preserved.
pub fn filter_by_range_at<'a, T, Tz>(
    items: &'a [T],
    field: DateField,
    mode: FilterMode,
    reference: &DateTime<Tz>,
    explicit: Option<NaiveDate>,
) -> Result<Vec<&'a T>, FilterError>
where
    T: Tracked,
    Tz: TimeZone,
{
    let range = mode.range(reference.date_naive(), explicit)?;
    let tz = reference.timezone();
    let matched: Vec<&T> = items
        .iter()
        .filter(|item| {
            item.timestamp(field)
                .and_then(|ts| ts.resolve(&tz))
                .is_some_and(|dt| range.contains(dt.date_naive()))
        })
        .collect();
    tracing::trace!(
        mode = %mode,
        %field,
        %range,
        total = items.len(),
        matched = matched.len(),
        "date filter applied"
    );
    Ok(matched)
}

/// Whole days since the item was created, rounded down. `None` when the
/// creation date is missing or unreadable.
pub fn days_open<T, Tz>(item: &T, reference: &DateTime<Tz>) -> Option<i64>
where
    T: Tracked,
    Tz: TimeZone,
{
    let created = item
        .timestamp(DateField::Created)?
        .resolve(&reference.timezone())?;
    let elapsed = reference.clone().signed_duration_since(created);
    Some(elapsed.num_milliseconds().div_euclid(86_400_000))
}
