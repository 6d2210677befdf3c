use serde::{Deserialize, Deserializer, Serialize};

use super::timestamp::Timestamp;
use super::{DateField, Tracked};

/// A task or ticket snapshot as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<StatusRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    /// Report screens read the deadline from here rather than `dueDate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_by: Option<CompleteBy>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub assigned_workers: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_group: Option<GroupRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Attachment>,
}

/// Media attached to a status update. Only presence matters here; the
/// files themselves stay on the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, alias = "hasImage", alias = "hasVideo", alias = "hasAudio")]
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
}

/// The backend stores a bare group id; populated queries embed the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id(String),
    Populated {
        #[serde(default)]
        name: Option<String>,
    },
}

impl GroupRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            GroupRef::Id(_) => None,
            GroupRef::Populated { name } => name.as_deref(),
        }
    }
}

/// `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Older records carry the status as a bare string.
fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<StatusRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Record(StatusRecord),
    }

    Ok(match Option::<Wire>::deserialize(deserializer)? {
        Some(Wire::Text(text)) => Some(StatusRecord {
            text: Some(text),
            ..StatusRecord::default()
        }),
        Some(Wire::Record(record)) => Some(record),
        None => None,
    })
}

impl WorkItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: None,
            created_date: None,
            due_date: None,
            complete_by: None,
            assigned_workers: Vec::new(),
            assigned_group: None,
            assigned_worker: None,
            comment: None,
        }
    }

    pub fn with_status(mut self, text: &str) -> Self {
        self.status = Some(StatusRecord {
            text: Some(text.to_string()),
            ..StatusRecord::default()
        });
        self
    }

    pub fn with_created(mut self, created: impl Into<Timestamp>) -> Self {
        self.created_date = Some(created.into());
        self
    }

    pub fn with_due(mut self, due: impl Into<Timestamp>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    /// Deadline used for overdue checks and due-date filtering.
    pub fn deadline(&self) -> Option<&Timestamp> {
        self.complete_by
            .as_ref()
            .and_then(|c| c.due_date.as_ref())
            .or(self.due_date.as_ref())
    }

    /// Names of the media kinds attached to the latest status update.
    pub fn media(&self) -> Vec<&'static str> {
        let Some(status) = &self.status else {
            return Vec::new();
        };
        [
            ("image", &status.image),
            ("video", &status.video),
            ("audio", &status.audio),
        ]
        .into_iter()
        .filter(|(_, a)| a.as_ref().is_some_and(|a| a.present))
        .map(|(name, _)| name)
        .collect()
    }

    /// Short assignment summary for task listings.
    pub fn task_assignee(&self) -> String {
        if !self.assigned_workers.is_empty() {
            return format!("{} worker(s)", self.assigned_workers.len());
        }
        self.assigned_group
            .as_ref()
            .and_then(GroupRef::name)
            .unwrap_or("Unassigned")
            .to_string()
    }

    /// Assignment summary for ticket listings.
    pub fn ticket_assignee(&self) -> &'static str {
        match &self.assigned_worker {
            Some(serde_json::Value::Null) | None => "Worker not assigned",
            Some(_) => "Worker assigned",
        }
    }
}

impl Tracked for WorkItem {
    fn timestamp(&self, field: DateField) -> Option<&Timestamp> {
        match field {
            DateField::Due => self.deadline(),
            DateField::Created => self.created_date.as_ref(),
        }
    }

    fn status_text(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.text.as_deref())
    }
}
