use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::Scope;
use crate::config::data_dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Staff,
    Tenant,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Staff => "staff",
            AccountKind::Tenant => "tenant",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "staff" => Ok(AccountKind::Staff),
            "tenant" => Ok(AccountKind::Tenant),
            _ => anyhow::bail!("Unknown account type '{s}' (expected staff or tenant)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// `"group"` limits an admin to their own group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_type: Option<String>,
}

/// The logged-in user. Passed explicitly to whatever needs to know who is
/// asking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub kind: AccountKind,
    /// Account type string the backend returned at login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub user: User,
}

impl Session {
    pub fn display_name(&self) -> &str {
        self.user
            .name
            .as_deref()
            .or(self.user.user_id.as_deref())
            .unwrap_or(&self.user.id)
    }

    fn own_group(&self) -> Option<Scope> {
        self.user.group.clone().map(Scope::Group)
    }

    /// What this user gets to see by default.
    pub fn default_scope(&self) -> Scope {
        if self.kind == AccountKind::Tenant {
            return Scope::CreatedBy(self.user.id.clone());
        }
        if !self.user.is_admin {
            return Scope::User(self.user.id.clone());
        }
        if self.user.admin_type.as_deref() == Some("group") {
            if let Some(scope) = self.own_group() {
                return scope;
            }
        }
        Scope::All
    }

    /// Resolve a scope keyword given on the command line.
    pub fn scope_for(&self, keyword: &str) -> Result<Scope> {
        match keyword {
            "all" => Ok(Scope::All),
            "mine" => Ok(Scope::User(self.user.id.clone())),
            "created" => Ok(Scope::CreatedBy(self.user.id.clone())),
            "group" => self
                .own_group()
                .with_context(|| format!("{} does not belong to a group", self.display_name())),
            other => anyhow::bail!("Unknown scope '{other}' (expected all, mine, group or created)"),
        }
    }
}

/// JSON file holding the current session between invocations.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::at(data_dir().join("session.json"))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let session = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(session))
    }

    /// Like [`SessionStore::load`], but a missing session is an error.
    pub fn require(&self) -> Result<Session> {
        self.load()?
            .context("Not logged in. Run `taskdesk login <staff|tenant> <userId> <password>` first")
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Returns whether there was a session to remove.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
