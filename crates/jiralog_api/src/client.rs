use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{Issue, SearchPage, UpdatedWorklogsPage, Worklog, WorklogPage};
use crate::pagination::{self, Page};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Field selection used when an issue is looked up to enrich a worklog.
const ISSUE_LOOKUP_FIELDS: &str = "summary,issuetype";
/// Maximum number of ids accepted by a single `worklog/list` request.
const WORKLOG_LIST_CHUNK: usize = 1000;

/// HTTP client for the Jira Cloud REST API, authenticated with basic
/// credentials (account email + API token). All requests are issued and
/// awaited one at a time.
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.http.get(self.url_for(path)).query(query).send().await?;
        Self::parse_json(&describe_request(path, query), response).await
    }

    async fn post<B, T>(&self, path: &str, context: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.url_for(path)).json(body).send().await?;
        Self::parse_json(context, response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(endpoint: &str, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(JiraError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::Authentication(format!(
                "Access denied ({}) on {} - {}",
                status, endpoint, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::http(status, endpoint, body))
        }
    }

    /// Returns every issue matching `jql`, requesting only `fields` and
    /// draining the search pagination.
    pub async fn search_issues(&self, jql: &str, fields: &[&str]) -> Result<Vec<Issue>> {
        let page_size = self.config.page_size();
        let issues = pagination::fetch_all(|start_at| {
            let body = SearchRequest {
                jql,
                start_at,
                max_results: page_size,
                fields,
            };
            let context = format!("search startAt={} maxResults={}", start_at, page_size);
            async move {
                let page: SearchPage = self.post("search", &context, &body).await?;
                Ok(Page {
                    items: page.issues,
                    total: page.total,
                })
            }
        })
        .await?;
        debug!(count = issues.len(), "jira:search issues fetched");
        Ok(issues)
    }

    /// Returns every worklog attached to one issue, draining the per-issue
    /// pagination. One or more round-trips per issue.
    pub async fn issue_worklogs(&self, issue_key: &str) -> Result<Vec<Worklog>> {
        let page_size = self.config.page_size();
        let path = format!("issue/{}/worklog", issue_key);
        pagination::fetch_all(|start_at| {
            let path = path.clone();
            let query = [
                ("startAt", start_at.to_string()),
                ("maxResults", page_size.to_string()),
            ];
            async move {
                let page: WorklogPage = self.get_with_query(&path, &query).await?;
                Ok(Page {
                    items: page.worklogs,
                    total: page.total,
                })
            }
        })
        .await
    }

    /// Returns the ids of all worklogs updated at or after `since_ms`
    /// (milliseconds since epoch), following the server's continuation
    /// cursor until it signals the last page or stops advancing.
    pub async fn updated_worklog_ids(&self, since_ms: i64) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        let mut since = since_ms;

        loop {
            let query = [("since", since.to_string())];
            let page: UpdatedWorklogsPage =
                self.get_with_query("worklog/updated", &query).await?;
            ids.extend(page.values.iter().map(|entry| entry.worklog_id));

            if page.last_page {
                break;
            }
            match page.until {
                Some(next) if next > since => since = next,
                _ => break,
            }
        }

        debug!(count = ids.len(), since = since_ms, "jira:updated worklog ids fetched");
        Ok(ids)
    }

    /// Retrieves full worklog details in bulk, one request per chunk of at
    /// most 1000 ids, concatenated in chunk order.
    pub async fn worklogs_by_ids(&self, ids: &[i64]) -> Result<Vec<Worklog>> {
        let mut details = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(WORKLOG_LIST_CHUNK) {
            let body = WorklogListRequest { ids: chunk };
            let context = format!("worklog/list ids={}", chunk.len());
            let batch: Vec<Worklog> = self.post("worklog/list", &context, &body).await?;
            details.extend(batch);
        }
        Ok(details)
    }

    /// Single-issue lookup by numeric id or key, restricted to the fields
    /// the extraction pipeline needs.
    pub async fn issue_by_id(&self, id: &str) -> Result<Issue> {
        let path = format!("issue/{}", id);
        let query = [("fields", ISSUE_LOOKUP_FIELDS.to_string())];
        self.get_with_query(&path, &query).await
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let credentials = BASE64_STANDARD.encode(format!("{}:{}", config.email, config.api_token));
    headers.insert(AUTHORIZATION, header_value(format!("Basic {}", credentials))?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}

fn describe_request(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let params = query
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, params)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: &'a str,
    start_at: u64,
    max_results: u32,
    fields: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct WorklogListRequest<'a> {
    ids: &'a [i64],
}

#[cfg(test)]
mod tests {
    use super::describe_request;

    #[test]
    fn describe_request_includes_query_context() {
        assert_eq!(describe_request("worklog/updated", &[]), "worklog/updated");
        assert_eq!(
            describe_request(
                "issue/DEV-1/worklog",
                &[("startAt", "0".to_string()), ("maxResults", "100".to_string())]
            ),
            "issue/DEV-1/worklog?startAt=0&maxResults=100"
        );
    }
}
