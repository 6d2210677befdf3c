pub mod timestamp;
pub mod work_item;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use timestamp::Timestamp;

/// Which date on an item a range filter looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Due,
    Created,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::Due => "due",
            DateField::Created => "created",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "due" | "duedate" | "due_date" => Ok(DateField::Due),
            "created" | "createddate" | "created_date" => Ok(DateField::Created),
            _ => Err(ParseError::DateField(s.to_string())),
        }
    }
}

/// The two kinds of work item the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Ticket,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Ticket => "ticket",
        }
    }

    /// Tasks are scheduled by deadline, tickets by when they were raised.
    pub fn default_field(&self) -> DateField {
        match self {
            ItemKind::Task => DateField::Due,
            ItemKind::Ticket => DateField::Created,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the classifier can sort into date ranges and status buckets.
pub trait Tracked {
    fn timestamp(&self, field: DateField) -> Option<&Timestamp>;
    fn status_text(&self) -> Option<&str>;
}

impl<T: Tracked + ?Sized> Tracked for &T {
    fn timestamp(&self, field: DateField) -> Option<&Timestamp> {
        (**self).timestamp(field)
    }

    fn status_text(&self) -> Option<&str> {
        (**self).status_text()
    }
}
