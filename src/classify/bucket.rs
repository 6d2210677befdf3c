use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::{DateField, Tracked};

/// Dashboard category. The first three mirror stored status text; `Overdue`
/// is derived from the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Pending,
        Bucket::InProgress,
        Bucket::Completed,
        Bucket::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Pending => "pending",
            Bucket::InProgress => "in_progress",
            Bucket::Completed => "completed",
            Bucket::Overdue => "overdue",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Bucket::Pending => "Pending",
            Bucket::InProgress => "In Progress",
            Bucket::Completed => "Completed",
            Bucket::Overdue => "Overdue",
        }
    }

    fn matches<T, Tz>(&self, item: &T, reference: &DateTime<Tz>) -> bool
    where
        T: Tracked,
        Tz: TimeZone,
    {
        match self {
            Bucket::Overdue => is_overdue(item, reference),
            stored => item.status_text() == Some(stored.as_str()),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Bucket::Pending),
            "in_progress" | "inprogress" => Ok(Bucket::InProgress),
            "completed" => Ok(Bucket::Completed),
            "overdue" => Ok(Bucket::Overdue),
            _ => Err(ParseError::Bucket(s.to_string())),
        }
    }
}

/// Per-bucket tallies. Buckets overlap: a pending item past its deadline is
/// counted under both `pending` and `overdue`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Pending => self.pending,
            Bucket::InProgress => self.in_progress,
            Bucket::Completed => self.completed,
            Bucket::Overdue => self.overdue,
        }
    }

    fn slot(&mut self, bucket: Bucket) -> &mut usize {
        match bucket {
            Bucket::Pending => &mut self.pending,
            Bucket::InProgress => &mut self.in_progress,
            Bucket::Completed => &mut self.completed,
            Bucket::Overdue => &mut self.overdue,
        }
    }
}

/// Not completed, has a readable deadline, and that deadline is strictly
/// before `reference`.
pub fn is_overdue<T, Tz>(item: &T, reference: &DateTime<Tz>) -> bool
where
    T: Tracked,
    Tz: TimeZone,
{
    if item.status_text() == Some(Bucket::Completed.as_str()) {
        return false;
    }
    item.timestamp(DateField::Due)
        .and_then(|ts| ts.resolve(&reference.timezone()))
        .is_some_and(|due| due < *reference)
}

pub fn categorize<T: Tracked>(items: &[T]) -> BucketCounts {
    categorize_at(items, &Local::now())
}

pub fn categorize_at<T, Tz>(items: &[T], reference: &DateTime<Tz>) -> BucketCounts
where
    T: Tracked,
    Tz: TimeZone,
{
    let mut counts = BucketCounts::default();
    for item in items {
        for bucket in Bucket::ALL {
            if bucket.matches(item, reference) {
                *counts.slot(bucket) += 1;
            }
        }
    }
    counts
}

pub fn select_category<T: Tracked>(items: &[T], bucket: Bucket) -> Vec<&T> {
    select_category_at(items, bucket, &Local::now())
}

pub fn select_category_at<'a, T, Tz>(
    items: &'a [T],
    bucket: Bucket,
    reference: &DateTime<Tz>,
) -> Vec<&'a T>
where
    T: Tracked,
    Tz: TimeZone,
{
    items
        .iter()
        .filter(|item| bucket.matches(*item, reference))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::work_item::WorkItem;
    use chrono::{Duration, Utc};

    fn reference() -> DateTime<Utc> {
        "2024-05-15T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn overdue_requires_past_deadline() {
        let now = reference();
        let past = WorkItem::new("a", "a").with_status("pending").with_due(now - Duration::hours(1));
        let future = WorkItem::new("b", "b").with_status("pending").with_due(now + Duration::hours(1));
        let exact = WorkItem::new("c", "c").with_status("pending").with_due(now);
        let none = WorkItem::new("d", "d").with_status("pending");
        let junk = WorkItem::new("e", "e").with_status("pending").with_due("soon");
        assert!(is_overdue(&past, &now));
        assert!(!is_overdue(&future, &now));
        assert!(!is_overdue(&exact, &now));
        assert!(!is_overdue(&none, &now));
        assert!(!is_overdue(&junk, &now));
    }

    #[test]
    fn completed_is_never_overdue() {
        let now = reference();
        let done = WorkItem::new("a", "a")
            .with_status("completed")
            .with_due(now - Duration::days(30));
        assert!(!is_overdue(&done, &now));
    }

    #[test]
    fn unknown_status_can_still_be_overdue() {
        let now = reference();
        let item = WorkItem::new("a", "a").with_due(now - Duration::days(1));
        let counts = categorize_at(&[item], &now);
        assert_eq!(
            counts,
            BucketCounts {
                overdue: 1,
                ..BucketCounts::default()
            }
        );
    }

    #[test]
    fn status_match_is_exact() {
        let now = reference();
        let items = vec![
            WorkItem::new("a", "a").with_status("Pending"),
            WorkItem::new("b", "b").with_status("in progress"),
            WorkItem::new("c", "c").with_status("in_progress"),
        ];
        let counts = categorize_at(&items, &now);
        assert_eq!(counts.pending, 0);
        assert_eq!(counts.in_progress, 1);
    }

    #[test]
    fn select_keeps_input_order() {
        let now = reference();
        let items = vec![
            WorkItem::new("1", "a").with_status("pending"),
            WorkItem::new("2", "b").with_status("completed"),
            WorkItem::new("3", "c").with_status("pending"),
        ];
        let ids: Vec<&str> = select_category_at(&items, Bucket::Pending, &now)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn counts_lookup_by_bucket() {
        let counts = BucketCounts {
            pending: 4,
            in_progress: 3,
            completed: 2,
            overdue: 1,
        };
        let values: Vec<usize> = Bucket::ALL.iter().map(|b| counts.get(*b)).collect();
        assert_eq!(values, vec![4, 3, 2, 1]);
    }

    #[test]
    fn parses_bucket_names() {
        assert_eq!("in_progress".parse(), Ok(Bucket::InProgress));
        assert_eq!("in-progress".parse(), Ok(Bucket::InProgress));
        assert_eq!("Overdue".parse(), Ok(Bucket::Overdue));
        assert!("done".parse::<Bucket>().is_err());
    }
}
