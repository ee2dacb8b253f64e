use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const PUBLIC_API: &str = "https://public.api.bsky.app/xrpc";
pub const AUTH_API: &str = "https://bsky.social/xrpc";

pub const PAGE_LIMIT: u32 = 100;
/// Delay between paginated requests. The AppView rate ceiling is 3000
/// requests per 5-minute window per source IP.
pub const REQUEST_DELAY: Duration = Duration::from_millis(400);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Profile metadata for an actor, fetched once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ProfileView {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub follows_count: u64,
    #[serde(default)]
    pub posts_count: u64,
}

/// One account in a followers or follows list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct GraphEntry {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indexed_at: String,
}

#[derive(Debug, Deserialize)]
pub struct FollowersPage {
    pub followers: Vec<GraphEntry>,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FollowsPage {
    pub follows: Vec<GraphEntry>,
    pub cursor: Option<String>,
}

/// Session obtained from `com.atproto.server.createSession`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub did: String,
    pub handle: String,
}

/// AT Protocol error body, e.g. `{"error":"InvalidRequest","message":"..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| if b.message.is_empty() { b.error } else { b.message })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string())
}

/// Client for the Bluesky / AT Protocol XRPC API.
///
/// Anonymous until [`login`](Self::login) succeeds; afterwards all calls go
/// to the authenticated base with a bearer token attached.
pub struct BskyClient {
    http: reqwest::Client,
    public_base: String,
    auth_base: String,
    session: Option<Session>,
}

impl BskyClient {
    pub fn new() -> Result<Self> {
        Self::with_base_urls(PUBLIC_API, AUTH_API)
    }

    /// Build a client against explicit base URLs. Tests point both at a
    /// local mock server.
    pub fn with_base_urls(public_base: &str, auth_base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("skygraph/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            public_base: public_base.trim_end_matches('/').to_string(),
            auth_base: auth_base.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn base_url(&self) -> &str {
        if self.session.is_some() {
            &self.auth_base
        } else {
            &self.public_base
        }
    }

    /// Exchange a handle + app password for a session token.
    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<()> {
        let url = format!("{}/com.atproto.server.createSession", self.auth_base);
        debug!(%url, "POST");
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;
        let session: Session = Self::read_json(resp).await?;
        info!(handle = %session.handle, did = %session.did, "authenticated");
        self.session = Some(session);
        Ok(())
    }

    /// Fetch profile metadata for an actor.
    pub async fn get_profile(&self, actor: &str) -> Result<ProfileView> {
        let url = format!("{}/app.bsky.actor.getProfile", self.base_url());
        self.get_json(&url, &[("actor", actor)]).await
    }

    /// All followers of an actor, in API return order.
    pub async fn get_followers(&self, actor: &str) -> Result<Vec<GraphEntry>> {
        self.paginate(actor, "app.bsky.graph.getFollowers", |page: FollowersPage| {
            (page.followers, page.cursor)
        })
        .await
    }

    /// All accounts an actor follows, in API return order.
    pub async fn get_follows(&self, actor: &str) -> Result<Vec<GraphEntry>> {
        self.paginate(actor, "app.bsky.graph.getFollows", |page: FollowsPage| {
            (page.follows, page.cursor)
        })
        .await
    }

    /// Generic paginator for the graph list endpoints.
    ///
    /// Terminates when the server omits the cursor (or returns an empty
    /// one) or when a page carries no items; sleeps `REQUEST_DELAY` between
    /// consecutive calls.
    async fn paginate<P, F>(&self, actor: &str, endpoint: &str, split: F) -> Result<Vec<GraphEntry>>
    where
        P: DeserializeOwned,
        F: Fn(P) -> (Vec<GraphEntry>, Option<String>),
    {
        let url = format!("{}/{}", self.base_url(), endpoint);
        let limit = PAGE_LIMIT.to_string();
        let mut entries: Vec<GraphEntry> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0u32;

        loop {
            let body: P = {
                let mut query: Vec<(&str, &str)> = vec![("actor", actor), ("limit", &limit)];
                if let Some(ref c) = cursor {
                    query.push(("cursor", c));
                }
                self.get_json(&url, &query).await?
            };

            let (items, next) = split(body);
            let empty_page = items.is_empty();
            entries.extend(items);
            page += 1;
            info!(endpoint, page, total = entries.len(), "fetched page");

            cursor = next;
            if empty_page || cursor.as_deref().map_or(true, str::is_empty) {
                break;
            }
            tokio::time::sleep(REQUEST_DELAY).await;
        }

        Ok(entries)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!(%url, "GET");
        let mut req = self.http.get(url).query(query);
        if let Some(ref session) = self.session {
            req = req.header(AUTHORIZATION, format!("Bearer {}", session.access_jwt));
        }
        let resp = req.send().await?;
        Self::read_json(resp).await
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
