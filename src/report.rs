//! Report views over fetched items: dashboard counts with an optional
//! category drill-down, and the per-status summary sheet.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;
use std::fmt::Write;

use crate::classify::{
    categorize_at, days_open, filter_by_range_at, is_overdue, select_category_at, Bucket,
    BucketCounts, DateRange, FilterMode,
};
use crate::error::{FilterError, ParseError};
use crate::model::work_item::WorkItem;
use crate::model::{DateField, ItemKind, Tracked};

pub fn parse_day(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::Date(raw.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub field: DateField,
    pub range: Option<FilterMode>,
    pub day: Option<NaiveDate>,
    pub category: Option<Bucket>,
}

impl ReportOptions {
    pub fn for_kind(kind: ItemKind) -> Self {
        Self {
            field: kind.default_field(),
            range: None,
            day: None,
            category: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub kind: ItemKind,
    pub field: DateField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<FilterMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateRange>,
    /// Items considered after date filtering.
    pub total: usize,
    pub counts: BucketCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Bucket>,
    pub items: Vec<&'a WorkItem>,
}

/// Counts are taken over the date-filtered list when a range is set.
pub fn build_report<'a, Tz: TimeZone>(
    kind: ItemKind,
    items: &'a [WorkItem],
    opts: &ReportOptions,
    reference: &DateTime<Tz>,
) -> Result<Report<'a>, FilterError> {
    let (window, considered) = match opts.range {
        Some(mode) => {
            let window = mode.range(reference.date_naive(), opts.day)?;
            let filtered = filter_by_range_at(items, opts.field, mode, reference, opts.day)?;
            (Some(window), filtered)
        }
        None => (None, items.iter().collect()),
    };

    let counts = categorize_at(&considered, reference);
    let selected = match opts.category {
        Some(bucket) => select_category_at(&considered, bucket, reference)
            .into_iter()
            .copied()
            .collect(),
        None => Vec::new(),
    };

    Ok(Report {
        kind,
        field: opts.field,
        mode: opts.range,
        window,
        total: considered.len(),
        counts,
        category: opts.category,
        items: selected,
    })
}

/// Sections shown on the summary sheet. Tickets have no overdue section.
fn summary_sections(kind: ItemKind) -> &'static [Bucket] {
    match kind {
        ItemKind::Task => &Bucket::ALL,
        ItemKind::Ticket => &[Bucket::Pending, Bucket::InProgress, Bucket::Completed],
    }
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub kind: ItemKind,
    pub mode: FilterMode,
    pub window: DateRange,
    pub sections: Vec<(Bucket, Vec<&'a WorkItem>)>,
}

pub fn build_summary<'a, Tz: TimeZone>(
    kind: ItemKind,
    items: &'a [WorkItem],
    field: DateField,
    mode: FilterMode,
    day: Option<NaiveDate>,
    reference: &DateTime<Tz>,
) -> Result<Summary<'a>, FilterError> {
    let window = mode.range(reference.date_naive(), day)?;
    let in_window = filter_by_range_at(items, field, mode, reference, day)?;
    let sections = summary_sections(kind)
        .iter()
        .map(|&bucket| {
            let members: Vec<&WorkItem> = select_category_at(&in_window, bucket, reference)
                .into_iter()
                .copied()
                .collect();
            (bucket, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect();
    Ok(Summary {
        kind,
        mode,
        window,
        sections,
    })
}

fn plural(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Task => "Tasks",
        ItemKind::Ticket => "Tickets",
    }
}

fn item_line<Tz: TimeZone>(
    out: &mut String,
    kind: ItemKind,
    item: &WorkItem,
    reference: &DateTime<Tz>,
) {
    let status = item.status_text().unwrap_or("unknown");
    let _ = write!(out, "  - {} [{}] ({})", item.title, status, item.id);

    let assignee = match kind {
        ItemKind::Task => item.task_assignee(),
        ItemKind::Ticket => item.ticket_assignee().to_string(),
    };
    let _ = write!(out, " · {assignee}");

    let open = item.status_text() == Some(Bucket::Pending.as_str()) || is_overdue(item, reference);
    if open {
        if let Some(days) = days_open(item, reference) {
            let _ = write!(out, " · open {days} day(s)");
        }
    }
    if let Some(due) = item.deadline() {
        let _ = write!(out, " · due {due}");
    }
    if let Some(created) = &item.created_date {
        let _ = write!(out, " · created {created}");
    }
    let media = item.media();
    if !media.is_empty() {
        let _ = write!(out, " · media: {}", media.join(", "));
    }
    out.push('\n');
    if let Some(comment) = item.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(out, "      comment: {comment}");
    }
}

pub fn render_report<Tz: TimeZone>(report: &Report<'_>, reference: &DateTime<Tz>) -> String {
    let mut out = String::new();
    match (report.mode, report.window) {
        (Some(mode), Some(window)) => {
            let _ = writeln!(
                out,
                "{} · {} ({window}, by {} date): {}",
                plural(report.kind),
                mode.display_name(),
                report.field,
                report.total
            );
        }
        _ => {
            let _ = writeln!(out, "{}: {}", plural(report.kind), report.total);
        }
    }
    for bucket in Bucket::ALL {
        let _ = writeln!(
            out,
            "  {:<12} {}",
            bucket.display_name(),
            report.counts.get(bucket)
        );
    }

    if let Some(bucket) = report.category {
        let _ = writeln!(out, "\n{}:", bucket.display_name());
        if report.items.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for item in &report.items {
            item_line(&mut out, report.kind, item, reference);
        }
    }
    out
}

pub fn render_summary<Tz: TimeZone>(summary: &Summary<'_>, reference: &DateTime<Tz>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} summary · {} ({})",
        plural(summary.kind),
        summary.mode.display_name(),
        summary.window
    );
    if summary.sections.is_empty() {
        let _ = writeln!(out, "  nothing in this period");
    }
    for (bucket, members) in &summary.sections {
        let _ = writeln!(
            out,
            "\n{} {} ({})",
            bucket.display_name(),
            plural(summary.kind),
            members.len()
        );
        for item in members {
            item_line(&mut out, summary.kind, item, reference);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reference() -> DateTime<Utc> {
        "2024-05-15T12:00:00Z".parse().unwrap()
    }

    fn tickets() -> Vec<WorkItem> {
        vec![
            WorkItem::new("k1", "Leaky tap")
                .with_status("pending")
                .with_created("2024-05-13T09:00:00Z")
                .with_due("2024-05-14T09:00:00Z"),
            WorkItem::new("k2", "Broken lift")
                .with_status("in_progress")
                .with_created("2024-05-02T09:00:00Z"),
            WorkItem::new("k3", "Door squeaks")
                .with_status("completed")
                .with_created("2024-04-20T09:00:00Z"),
            WorkItem::new("k4", "No date").with_status("pending"),
        ]
    }

    #[test]
    fn counts_over_everything_without_range() {
        let items = tickets();
        let opts = ReportOptions::for_kind(ItemKind::Ticket);
        let report = build_report(ItemKind::Ticket, &items, &opts, &reference()).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(
            report.counts,
            BucketCounts {
                pending: 2,
                in_progress: 1,
                completed: 1,
                overdue: 1,
            }
        );
        assert!(report.items.is_empty());
    }

    #[test]
    fn counts_follow_date_filter() {
        let items = tickets();
        let opts = ReportOptions {
            range: Some(FilterMode::ThisMonth),
            category: Some(Bucket::Pending),
            ..ReportOptions::for_kind(ItemKind::Ticket)
        };
        let report = build_report(ItemKind::Ticket, &items, &opts, &reference()).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.counts.pending, 1);
        assert_eq!(report.counts.completed, 0);
        let ids: Vec<&str> = report.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["k1"]);

        let text = render_report(&report, &reference());
        assert!(text.contains("This Month (2024-05-01 .. 2024-05-31, by created date): 2"));
        assert!(text.contains("Leaky tap [pending] (k1)"));
        assert!(text.contains("open 2 day(s)"));
    }

    #[test]
    fn report_surfaces_missing_specific_day() {
        let items = tickets();
        let opts = ReportOptions {
            range: Some(FilterMode::SpecificDay),
            ..ReportOptions::for_kind(ItemKind::Ticket)
        };
        let err = build_report(ItemKind::Ticket, &items, &opts, &reference()).unwrap_err();
        assert_eq!(err, FilterError::MissingSpecificDate);
    }

    #[test]
    fn summary_groups_non_empty_sections() {
        let items = tickets();
        let summary = build_summary(
            ItemKind::Ticket,
            &items,
            DateField::Created,
            FilterMode::ThisMonth,
            None,
            &reference(),
        )
        .unwrap();
        let buckets: Vec<Bucket> = summary.sections.iter().map(|(b, _)| *b).collect();
        assert_eq!(buckets, vec![Bucket::Pending, Bucket::InProgress]);

        let text = render_summary(&summary, &reference());
        assert!(text.contains("Tickets summary · This Month (2024-05-01 .. 2024-05-31)"));
        assert!(text.contains("In Progress Tickets (1)"));
        assert!(!text.contains("Door squeaks"));
    }

    #[test]
    fn task_summary_has_overdue_section() {
        let items = vec![
            WorkItem::new("t1", "Paint hall")
                .with_status("pending")
                .with_created("2024-05-03T09:00:00Z")
                .with_due("2024-05-10T09:00:00Z"),
            WorkItem::new("t2", "Fix gate")
                .with_status("in_progress")
                .with_created("2024-05-06T09:00:00Z")
                .with_due("2024-05-30T09:00:00Z"),
        ];
        let summary = build_summary(
            ItemKind::Task,
            &items,
            DateField::Created,
            FilterMode::ThisMonth,
            None,
            &reference(),
        )
        .unwrap();
        let buckets: Vec<Bucket> = summary.sections.iter().map(|(b, _)| *b).collect();
        assert_eq!(
            buckets,
            vec![Bucket::Pending, Bucket::InProgress, Bucket::Overdue]
        );
        let overdue: Vec<&str> = summary.sections[2].1.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(overdue, vec!["t1"]);

        let text = render_summary(&summary, &reference());
        assert!(text.contains("Overdue Tasks (1)"));
    }

    #[test]
    fn report_serializes_to_json() {
        let items = tickets();
        let opts = ReportOptions {
            category: Some(Bucket::Overdue),
            ..ReportOptions::for_kind(ItemKind::Ticket)
        };
        let report = build_report(ItemKind::Ticket, &items, &opts, &reference()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "ticket");
        assert_eq!(json["category"], "overdue");
        assert_eq!(json["counts"]["overdue"], 1);
        assert_eq!(json["items"][0]["_id"], "k1");
        assert!(json.get("window").is_none());
    }

    #[test]
    fn parses_days() {
        assert_eq!(
            parse_day("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_day("2023-02-29").is_err());
        assert!(parse_day("29/02/2024").is_err());
    }
}
