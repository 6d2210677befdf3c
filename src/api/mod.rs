pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

use crate::model::work_item::WorkItem;
use crate::model::ItemKind;
use crate::session::{AccountKind, Session};

/// Whose items to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Assigned to this user id.
    User(String),
    Group(String),
    /// Raised by this user id. Only meaningful for tickets.
    CreatedBy(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("all"),
            Scope::User(id) => write!(f, "user {id}"),
            Scope::Group(group) => write!(f, "group {group}"),
            Scope::CreatedBy(id) => write!(f, "created by {id}"),
        }
    }
}

/// The facility-management backend. Everything stateful lives behind it.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, kind: AccountKind, user_id: &str, password: &str) -> Result<Session>;
    async fn fetch_tasks(&self, scope: &Scope) -> Result<Vec<WorkItem>>;
    async fn fetch_tickets(&self, scope: &Scope) -> Result<Vec<WorkItem>>;

    async fn fetch(&self, kind: ItemKind, scope: &Scope) -> Result<Vec<WorkItem>> {
        match kind {
            ItemKind::Task => self.fetch_tasks(scope).await,
            ItemKind::Ticket => self.fetch_tickets(scope).await,
        }
    }
}
