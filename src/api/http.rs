use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Backend, Scope};
use crate::config::BackendConfig;
use crate::model::work_item::WorkItem;
use crate::session::{AccountKind, Session, User};

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        tracing::debug!(route, "GET");
        let resp = self
            .client
            .get(self.url(route))
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {route} failed"))?;
        read_json(resp, route).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: User,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, route: &str) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);
        anyhow::bail!("{route} returned {status}: {}", message.trim());
    }
    resp.json()
        .await
        .with_context(|| format!("Failed to parse response from {route}"))
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn login_route(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Staff => "/api/auth/login",
        AccountKind::Tenant => "/api/user1/login",
    }
}

pub fn tasks_route(scope: &Scope) -> Result<String> {
    match scope {
        Scope::All => Ok("/api/tasks".to_string()),
        Scope::User(id) => Ok(format!("/api/tasks/user/{}", segment(id))),
        Scope::Group(group) => Ok(format!("/api/tasks/group/{}", segment(group))),
        Scope::CreatedBy(_) => anyhow::bail!("Tasks cannot be listed by creator"),
    }
}

pub fn tickets_route(scope: &Scope) -> String {
    match scope {
        Scope::All => "/api/tickets/".to_string(),
        Scope::User(id) => format!("/api/tickets/user/{}", segment(id)),
        Scope::Group(group) => format!("/api/tickets/group/{}", segment(group)),
        Scope::CreatedBy(id) => format!("/api/tickets/createdby/{}", segment(id)),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, kind: AccountKind, user_id: &str, password: &str) -> Result<Session> {
        let route = login_route(kind);
        tracing::debug!(route, %kind, user_id, "POST");
        let resp = self
            .client
            .post(self.url(route))
            .json(&LoginRequest { user_id, password })
            .send()
            .await
            .context("Login request failed")?;
        let body: LoginResponse = read_json(resp, route).await.context("Login failed")?;
        Ok(Session {
            kind,
            role: body.kind,
            user: body.user,
        })
    }

    async fn fetch_tasks(&self, scope: &Scope) -> Result<Vec<WorkItem>> {
        let route = tasks_route(scope)?;
        let items: Vec<WorkItem> = self.get_json(&route).await.context("Unable to fetch tasks")?;
        tracing::info!(%scope, count = items.len(), "fetched tasks");
        Ok(items)
    }

    async fn fetch_tickets(&self, scope: &Scope) -> Result<Vec<WorkItem>> {
        let route = tickets_route(scope);
        let items: Vec<WorkItem> = self
            .get_json(&route)
            .await
            .context("Unable to fetch tickets")?;
        tracing::info!(%scope, count = items.len(), "fetched tickets");
        Ok(items)
    }
}

#[cfg(test)]
mod route_tests {
    use super::*;

    #[test]
    fn task_routes() {
        assert_eq!(tasks_route(&Scope::All).unwrap(), "/api/tasks");
        assert_eq!(
            tasks_route(&Scope::User("abc".into())).unwrap(),
            "/api/tasks/user/abc"
        );
        assert_eq!(
            tasks_route(&Scope::Group("north wing".into())).unwrap(),
            "/api/tasks/group/north%20wing"
        );
        assert!(tasks_route(&Scope::CreatedBy("abc".into())).is_err());
    }

    #[test]
    fn ticket_routes() {
        assert_eq!(tickets_route(&Scope::All), "/api/tickets/");
        assert_eq!(
            tickets_route(&Scope::CreatedBy("t/1".into())),
            "/api/tickets/createdby/t%2F1"
        );
        assert_eq!(tickets_route(&Scope::User("u".into())), "/api/tickets/user/u");
    }

    #[test]
    fn login_routes_by_account_kind() {
        assert_eq!(login_route(AccountKind::Staff), "/api/auth/login");
        assert_eq!(login_route(AccountKind::Tenant), "/api/user1/login");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://localhost:5000/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(backend.url("/api/tasks"), "http://localhost:5000/api/tasks");
    }
}
