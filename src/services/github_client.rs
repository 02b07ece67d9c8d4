use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::config::constants::{DEFAULT_HTTP_TIMEOUT_SECS, GITHUB_API_VERSION, USER_AGENT as AGENT};
use crate::enums::api_error::ApiError;
use crate::structs::page::Page;
use crate::structs::repository::Repository;
use crate::structs::workflow::{Deployment, Environment, PendingDeployment, RunFilter, WorkflowJob, WorkflowRun};
use crate::traits::github_api::GithubApi;

/// REST client for one organization on github.com or a GitHub Enterprise
/// Server (`base_url` such as `https://ghe.example.com/api/v3`).
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    org: String,
}

#[derive(Deserialize)]
struct Account {
    #[serde(default)]
    login: String,
}

#[derive(Deserialize)]
struct RawRepository {
    id: u64,
    name: String,
    owner: Account,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    disabled: bool,
    pushed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    default_branch: Option<String>,
}

impl From<RawRepository> for Repository {
    fn from(raw: RawRepository) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            owner: raw.owner.login,
            archived: raw.archived,
            disabled: raw.disabled,
            pushed_at: raw.pushed_at,
            updated_at: raw.updated_at,
            default_branch: raw.default_branch,
        }
    }
}

#[derive(Deserialize)]
struct RawWorkflowRun {
    id: u64,
    run_number: u64,
    #[serde(default)]
    name: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    #[serde(default)]
    head_sha: String,
    head_branch: Option<String>,
    #[serde(default)]
    event: String,
    actor: Option<Account>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RawWorkflowRun> for WorkflowRun {
    fn from(raw: RawWorkflowRun) -> Self {
        Self {
            id: raw.id,
            run_number: raw.run_number,
            name: raw.name.unwrap_or_default(),
            status: raw.status.unwrap_or_default(),
            conclusion: raw.conclusion,
            head_sha: raw.head_sha,
            head_branch: raw.head_branch.unwrap_or_default(),
            event: raw.event,
            actor: raw.actor.map(|actor| actor.login).unwrap_or_default(),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct WorkflowRunList {
    workflow_runs: Vec<RawWorkflowRun>,
}

#[derive(Deserialize)]
struct RawWorkflowJob {
    id: u64,
    run_id: u64,
    name: String,
    status: Option<String>,
}

#[derive(Deserialize)]
struct WorkflowJobList {
    jobs: Vec<RawWorkflowJob>,
}

#[derive(Deserialize)]
struct EnvironmentList {
    #[serde(default)]
    environments: Vec<Environment>,
}

#[derive(Deserialize)]
struct RawPendingDeployment {
    environment: Environment,
    #[serde(default)]
    current_user_can_approve: bool,
}

#[derive(Serialize)]
struct ReviewRequest<'a> {
    environment_ids: &'a [u64],
    state: &'static str,
    comment: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GithubClient {
    pub fn new(base_url: &str, org: &str, token: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| ApiError::Transport("API token contains invalid header characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(GITHUB_API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            org: org.to_string(),
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    fn repo_url(&self, repo: &str, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, self.org, repo, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &headers, &url, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Maps a non-success response onto the engine's error kinds.
fn classify_failure(status: StatusCode, headers: &HeaderMap, url: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|err| err.message)
        .unwrap_or_else(|_| body.trim().to_string());

    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|remaining| remaining.trim() == "0");
    let retry_after_secs = headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok());

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(url.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after_secs },
        StatusCode::FORBIDDEN if quota_exhausted || retry_after_secs.is_some() => ApiError::RateLimited { retry_after_secs },
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        _ => ApiError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Page number of the `rel="next"` entry of a `Link` header.
fn next_page_from_link(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, rel) = entry.split_once(';')?;
        if !rel.contains("rel=\"next\"") {
            return None;
        }

        let url = target.trim().trim_start_matches('<').trim_end_matches('>');
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Page<Repository>, ApiError> {
        let url = format!("{}/orgs/{}/repos", self.base_url, self.org);
        let request = self.client.get(&url).query(&[("type", "all".to_string()), ("page", page.to_string()), ("per_page", per_page.to_string())]);

        let response = self.send(request).await?;
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_from_link);
        let repos: Vec<RawRepository> = response.json().await?;

        let items = repos.into_iter().map(Repository::from).collect();
        Ok(match next_page {
            Some(next) => Page::with_next(items, next),
            None => Page::last(items),
        })
    }

    async fn list_workflow_runs(&self, repo: &str, filter: &RunFilter) -> Result<Vec<WorkflowRun>, ApiError> {
        let mut query = vec![("page", filter.page.max(1).to_string()), ("per_page", filter.per_page.to_string())];
        if let Some(status) = &filter.status {
            query.push(("status", status.clone()));
        }

        let request = self.client.get(self.repo_url(repo, "actions/runs")).query(&query);
        let list: WorkflowRunList = self.get_json(request).await?;
        Ok(list.workflow_runs.into_iter().map(WorkflowRun::from).collect())
    }

    async fn list_workflow_jobs(&self, repo: &str, run_id: u64, per_page: u32) -> Result<Vec<WorkflowJob>, ApiError> {
        let request = self
            .client
            .get(self.repo_url(repo, &format!("actions/runs/{}/jobs", run_id)))
            .query(&[("per_page", per_page)]);

        let list: WorkflowJobList = self.get_json(request).await?;
        Ok(list
            .jobs
            .into_iter()
            .map(|job| WorkflowJob {
                id: job.id,
                run_id: job.run_id,
                name: job.name,
                status: job.status.unwrap_or_default(),
            })
            .collect())
    }

    async fn get_workflow_run(&self, repo: &str, run_id: u64) -> Result<WorkflowRun, ApiError> {
        let request = self.client.get(self.repo_url(repo, &format!("actions/runs/{}", run_id)));
        let run: RawWorkflowRun = self.get_json(request).await?;
        Ok(run.into())
    }

    async fn list_environments(&self, repo: &str) -> Result<Vec<Environment>, ApiError> {
        let request = self.client.get(self.repo_url(repo, "environments"));
        let list: EnvironmentList = self.get_json(request).await?;
        Ok(list.environments)
    }

    async fn list_deployments(&self, repo: &str, per_page: u32) -> Result<Vec<Deployment>, ApiError> {
        let request = self.client.get(self.repo_url(repo, "deployments")).query(&[("per_page", per_page)]);
        self.get_json(request).await
    }

    async fn path_exists(&self, owner: &str, repo: &str, path: &str) -> Result<bool, ApiError> {
        let url = format!("{}/repos/{}/{}/contents/{}", self.base_url, owner, repo, path.trim_start_matches('/'));
        match self.send(self.client.get(&url)).await {
            Ok(_) => Ok(true),
            Err(ApiError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn cancel_workflow_run(&self, repo: &str, run_id: u64) -> Result<(), ApiError> {
        let request = self.client.post(self.repo_url(repo, &format!("actions/runs/{}/cancel", run_id)));
        self.send(request).await?;
        Ok(())
    }

    async fn list_pending_deployments(&self, repo: &str, run_id: u64) -> Result<Vec<PendingDeployment>, ApiError> {
        let request = self
            .client
            .get(self.repo_url(repo, &format!("actions/runs/{}/pending_deployments", run_id)));
        let pending: Vec<RawPendingDeployment> = self.get_json(request).await?;

        Ok(pending
            .into_iter()
            .map(|raw| PendingDeployment {
                environment_id: raw.environment.id,
                environment_name: raw.environment.name,
                current_user_can_approve: raw.current_user_can_approve,
            })
            .collect())
    }

    async fn approve_pending_deployment(
        &self,
        repo: &str,
        run_id: u64,
        environment_ids: &[u64],
        comment: &str,
    ) -> Result<(), ApiError> {
        let body = ReviewRequest {
            environment_ids,
            state: "approved",
            comment,
        };
        let request = self
            .client
            .post(self.repo_url(repo, &format!("actions/runs/{}/pending_deployments", run_id)))
            .json(&body);

        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_is_read_from_link_header() {
        let link = r#"<https://api.github.com/organizations/1/repos?page=3&per_page=30>; rel="next", <https://api.github.com/organizations/1/repos?page=9&per_page=30>; rel="last""#;
        assert_eq!(next_page_from_link(link), Some(3));

        let last = r#"<https://api.github.com/organizations/1/repos?page=1&per_page=30>; rel="prev""#;
        assert_eq!(next_page_from_link(last), None);
        assert_eq!(next_page_from_link(""), None);
    }

    #[test]
    fn failures_are_classified() {
        let mut exhausted = HeaderMap::new();
        exhausted.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));

        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, &exhausted, "/orgs/acme/repos", "{\"message\":\"API rate limit exceeded\"}"),
            ApiError::RateLimited { retry_after_secs: None }
        ));

        let mut retry = HeaderMap::new();
        retry.insert(RETRY_AFTER, HeaderValue::from_static("60"));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, &retry, "/", ""),
            ApiError::RateLimited { retry_after_secs: Some(60) }
        ));

        let forbidden = classify_failure(StatusCode::FORBIDDEN, &HeaderMap::new(), "/", "{\"message\":\"Resource not accessible by integration\"}");
        assert!(matches!(forbidden, ApiError::Forbidden(ref message) if message == "Resource not accessible by integration"));

        assert!(classify_failure(StatusCode::NOT_FOUND, &HeaderMap::new(), "/repos/acme/gone", "").is_not_found());

        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, &HeaderMap::new(), "/", "upstream down"),
            ApiError::Http { status: 502, ref message } if message == "upstream down"
        ));
    }

    #[test]
    fn wire_repository_is_flattened() {
        let json = r#"{
            "id": 7, "name": "api", "owner": {"login": "acme"},
            "archived": false, "disabled": false,
            "pushed_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-02T10:00:00Z",
            "default_branch": "main", "private": true
        }"#;

        let repo: Repository = serde_json::from_str::<RawRepository>(json).unwrap().into();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.default_branch.as_deref(), Some("main"));
        assert!(repo.pushed_at.is_some());
    }

    #[test]
    fn wire_run_tolerates_missing_fields() {
        let json = r#"{"workflow_runs": [
            {"id": 1, "run_number": 12, "name": "Deploy", "status": "waiting", "conclusion": null,
             "head_sha": "abc", "head_branch": "main", "event": "push", "actor": {"login": "octocat"},
             "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:05:00Z"},
            {"id": 2, "run_number": 13, "head_branch": null, "actor": null}
        ]}"#;

        let list: WorkflowRunList = serde_json::from_str(json).unwrap();
        let runs: Vec<WorkflowRun> = list.workflow_runs.into_iter().map(WorkflowRun::from).collect();

        assert_eq!(runs[0].actor, "octocat");
        assert_eq!(runs[0].status, "waiting");
        assert_eq!(runs[1].head_branch, "");
        assert_eq!(runs[1].name, "");
    }

    #[test]
    fn review_request_serializes_as_approval() {
        let body = ReviewRequest {
            environment_ids: &[11, 12],
            state: "approved",
            comment: "ship it",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["environment_ids"], serde_json::json!([11, 12]));
        assert_eq!(json["state"], "approved");
    }

    #[test]
    fn client_rejects_unusable_token() {
        assert!(GithubClient::new("https://api.github.com/", "acme", "bad\ntoken").is_err());

        let client = GithubClient::new("https://ghe.example.com/api/v3/", "acme", "ghp_token").unwrap();
        assert_eq!(client.repo_url("api", "environments"), "https://ghe.example.com/api/v3/repos/acme/api/environments");
    }
}
