//! GitHub REST implementation of the tracker client.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{IssuePage, IssueRecord, IssueState, Res},
};

use super::{GenericTrackerClient, PAGE_SIZE, TrackerClient};

// Extra methods on `TrackerClient` applied by the github implementation.

impl TrackerClient {
    /// Creates a new GitHub tracker client.
    pub fn github(config: &Config) -> Res<Self> {
        let client = GithubTrackerClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

/// The subset of the GitHub issue payload that the bot cares about.
#[derive(Debug, Deserialize)]
struct GithubIssue {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    state: IssueState,
    pull_request: Option<serde_json::Value>,
    user: Option<GithubUser>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    avatar_url: String,
}

impl From<GithubIssue> for IssueRecord {
    fn from(issue: GithubIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            html_url: issue.html_url,
            state: issue.state,
            is_pull_request: issue.pull_request.is_some(),
            author_avatar_url: issue.user.map(|u| u.avatar_url).unwrap_or_default(),
            created_at: issue.created_at,
        }
    }
}

// Specific implementations.

/// GitHub tracker client implementation.
#[derive(Clone)]
struct GithubTrackerClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubTrackerClient {
    /// Create a new GitHub tracker client.
    #[instrument(name = "GithubTrackerClient::new", skip_all)]
    fn new(config: &Config) -> Res<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("hashtag-bot"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        let auth_header = format!("Bearer {}", config.github_token.trim());
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth_header).context("Invalid GitHub authorization header.")?);

        let http = reqwest::Client::builder().default_headers(headers).build().context("Failed to create GitHub API client.")?;

        Ok(Self {
            http,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenericTrackerClient for GithubTrackerClient {
    #[instrument(skip(self))]
    async fn list_issues(&self, owner: &str, repo: &str, page: u32) -> Res<IssuePage> {
        let url = format!("{}/repos/{owner}/{repo}/issues", self.api_base);
        let per_page = PAGE_SIZE.to_string();
        let page_value = page.max(1).to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("state", "all"), ("per_page", per_page.as_str()), ("page", page_value.as_str())])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list issues: {}", e))?;

        let status = response.status();
        let next_page = parse_next_page(response.headers().get(LINK).and_then(|v| v.to_str().ok()));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("GitHub returned {} while listing issues: {}", status, truncate(&body, 512)));
        }

        let issues: Vec<GithubIssue> = response.json().await.context("Failed to decode GitHub issues.")?;

        debug!("Fetched {} issues from page {} (next page: {}).", issues.len(), page, next_page);

        Ok(IssuePage {
            items: issues.into_iter().map(IssueRecord::from).collect(),
            next_page,
        })
    }
}

// Helpers.

/// Extract the `page` of the `rel="next"` entry in a GitHub `Link` header.
///
/// Returns `0` when there is no next page.
fn parse_next_page(link: Option<&str>) -> u32 {
    let Some(link) = link else {
        return 0;
    };

    link.split(',')
        .filter_map(|part| {
            let (target, params) = part.split_once(';')?;
            if !params.split(';').any(|p| p.trim() == r#"rel="next""#) {
                return None;
            }

            let url = target.trim().trim_start_matches('<').trim_end_matches('>');
            let query = url.split_once('?')?.1;

            query.split('&').find_map(|pair| pair.strip_prefix("page=")).and_then(|page| page.parse().ok())
        })
        .next()
        .unwrap_or(0)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

// Tests.
