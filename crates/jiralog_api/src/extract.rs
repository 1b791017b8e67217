//! Worklog extraction pipeline: date windows, the two retrieval strategies
//! and normalization of raw worklogs into flat records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::JiraClient;
use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{Issue, Worklog};

/// Inclusive day window an extraction run is scoped to.
///
/// Construction rejects inverted ranges, so a window in hand is always
/// valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(JiraError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.from
    }

    pub fn end(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    /// Window start at 00:00:00 UTC, in milliseconds since epoch. Lower
    /// bound for the updated-worklogs feed.
    pub fn since_epoch_millis(&self) -> i64 {
        self.from.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
    }
}

/// Flat output unit of an extraction run: one row per worklog entry that
/// falls inside the requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorklogRecord {
    pub date: NaiveDate,
    pub user: String,
    pub activity: String,
    pub issue_key: String,
    pub summary: String,
    pub hours: f64,
}

/// Issue metadata attached to every record of that issue within one run.
#[derive(Debug, Clone)]
struct IssueMeta {
    key: String,
    summary: String,
    activity: String,
}

impl IssueMeta {
    fn from_issue(issue: &Issue) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.fields.summary.clone().unwrap_or_default(),
            activity: issue
                .fields
                .issuetype
                .as_ref()
                .and_then(|issuetype| issuetype.name.clone())
                .unwrap_or_default(),
        }
    }

    /// Sentinel used when a single-issue lookup fails: the run continues
    /// with a placeholder key derived from the raw id and an empty summary.
    fn placeholder(raw_id: &str) -> Self {
        Self {
            key: format!("UNKNOWN-{}", raw_id),
            summary: String::new(),
            activity: String::new(),
        }
    }
}

/// Converts a duration in seconds to hours rounded to 2 decimals.
fn hours_from_seconds(seconds: i64) -> f64 {
    let hours = seconds.max(0) as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}

/// Date component of a worklog start timestamp. Only the first 10
/// characters (`YYYY-MM-DD`) matter; time-of-day and offset are ignored for
/// window filtering.
fn started_date(started: &str) -> Option<NaiveDate> {
    started
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

fn author_name(worklog: &Worklog) -> String {
    worklog
        .author
        .as_ref()
        .and_then(|author| {
            author
                .display_name
                .clone()
                .or_else(|| author.email_address.clone())
        })
        .unwrap_or_default()
}

/// Normalizes one raw worklog against its issue metadata, discarding
/// entries that are undated or outside the window.
fn record_from_worklog(
    worklog: &Worklog,
    meta: &IssueMeta,
    window: &DateWindow,
) -> Option<WorklogRecord> {
    let date = worklog.started.as_deref().and_then(started_date)?;
    if !window.contains(date) {
        return None;
    }
    Some(WorklogRecord {
        date,
        user: author_name(worklog),
        activity: meta.activity.clone(),
        issue_key: meta.key.clone(),
        summary: meta.summary.clone(),
        hours: hours_from_seconds(worklog.time_spent_seconds.unwrap_or(0)),
    })
}

fn range_jql(window: &DateWindow, extra: Option<&str>) -> String {
    let mut jql = format!(
        "worklogDate >= \"{}\" AND worklogDate <= \"{}\"",
        window.start(),
        window.end()
    );
    if let Some(extra) = extra.map(str::trim).filter(|extra| !extra.is_empty()) {
        jql.push_str(" AND (");
        jql.push_str(extra);
        jql.push(')');
    }
    jql
}

/// Retrieval strategy turning a date window into normalized records. The
/// search-based and updated-feed modes implement the same contract so both
/// feed one normalization path.
#[async_trait]
pub trait WorklogSource {
    async fn fetch(&self, client: &JiraClient, window: &DateWindow) -> Result<Vec<WorklogRecord>>;
}

/// Range mode: JQL search for issues with worklogs inside the window, then
/// every worklog of every matching issue. Issue metadata comes from the
/// search pages themselves.
#[derive(Debug, Clone, Default)]
pub struct SearchSource {
    pub extra_jql: Option<String>,
}

#[async_trait]
impl WorklogSource for SearchSource {
    async fn fetch(&self, client: &JiraClient, window: &DateWindow) -> Result<Vec<WorklogRecord>> {
        let jql = range_jql(window, self.extra_jql.as_deref());
        debug!(%jql, "extract:search mode");
        let issues = client.search_issues(&jql, &["summary", "issuetype"]).await?;

        let mut records = Vec::new();
        for issue in &issues {
            let meta = IssueMeta::from_issue(issue);
            let worklogs = client.issue_worklogs(&issue.key).await?;
            records.extend(
                worklogs
                    .iter()
                    .filter_map(|worklog| record_from_worklog(worklog, &meta, window)),
            );
        }
        Ok(records)
    }
}

/// Day mode: the `worklog/updated` cursor feed bounded at the window start,
/// bulk detail retrieval, and a per-run issue metadata map populated by
/// single-issue lookups. The map lives only for this call.
#[derive(Debug, Clone, Default)]
pub struct UpdatedFeedSource;

#[async_trait]
impl WorklogSource for UpdatedFeedSource {
    async fn fetch(&self, client: &JiraClient, window: &DateWindow) -> Result<Vec<WorklogRecord>> {
        let since = window.since_epoch_millis();
        debug!(since, "extract:updated-feed mode");
        let ids = client.updated_worklog_ids(since).await?;
        let worklogs = client.worklogs_by_ids(&ids).await?;

        let mut meta_by_issue: HashMap<String, IssueMeta> = HashMap::new();
        let mut records = Vec::new();
        for worklog in &worklogs {
            let issue_id = worklog.issue_id.clone().unwrap_or_default();
            if !meta_by_issue.contains_key(&issue_id) {
                let meta = if issue_id.is_empty() {
                    IssueMeta::placeholder(&issue_id)
                } else {
                    match client.issue_by_id(&issue_id).await {
                        Ok(issue) => IssueMeta::from_issue(&issue),
                        Err(err) => {
                            warn!(issue_id = %issue_id, error = %err, "issue lookup failed, using placeholder");
                            IssueMeta::placeholder(&issue_id)
                        }
                    }
                };
                meta_by_issue.insert(issue_id.clone(), meta);
            }
            if let Some(record) = record_from_worklog(worklog, &meta_by_issue[&issue_id], window) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Extracts the normalized worklog records for a single day.
pub async fn fetch_worklogs_for_day(
    domain: &str,
    email: &str,
    api_token: &str,
    day: NaiveDate,
) -> Result<Vec<WorklogRecord>> {
    let client = JiraClient::new(JiraConfig::new(domain, email, api_token))?;
    UpdatedFeedSource
        .fetch(&client, &DateWindow::single(day))
        .await
}

/// Extracts the normalized worklog records for an inclusive date range,
/// optionally narrowing the issue search with an extra JQL predicate.
pub async fn fetch_worklogs_for_range(
    domain: &str,
    email: &str,
    api_token: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
    extra_jql: Option<&str>,
) -> Result<Vec<WorklogRecord>> {
    let window = DateWindow::new(date_from, date_to)?;
    let client = JiraClient::new(JiraConfig::new(domain, email, api_token))?;
    SearchSource {
        extra_jql: extra_jql.map(str::to_string),
    }
    .fetch(&client, &window)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorklogAuthor;

    fn day(text: &str) -> NaiveDate {
        text.parse().unwrap()
    }

    fn worklog(started: &str, seconds: i64, author: &str) -> Worklog {
        Worklog {
            id: None,
            issue_id: Some("10001".to_string()),
            author: Some(WorklogAuthor {
                display_name: Some(author.to_string()),
                email_address: None,
                account_id: None,
            }),
            started: Some(started.to_string()),
            time_spent_seconds: Some(seconds),
        }
    }

    #[test]
    fn hours_round_to_two_decimals() {
        assert_eq!(hours_from_seconds(5400), 1.5);
        assert_eq!(hours_from_seconds(1), 0.0);
        assert_eq!(hours_from_seconds(3600), 1.0);
        assert_eq!(hours_from_seconds(5430), 1.51);
        assert_eq!(hours_from_seconds(-60), 0.0);
    }

    #[test]
    fn started_date_ignores_time_and_offset() {
        assert_eq!(
            started_date("2024-03-01T23:30:00.000+1100"),
            Some(day("2024-03-01"))
        );
        assert_eq!(
            started_date("2024-03-01T00:10:00.000-0800"),
            Some(day("2024-03-01"))
        );
        assert_eq!(started_date("garbage"), None);
        assert_eq!(started_date(""), None);
    }

    #[test]
    fn window_rejects_inverted_range() {
        let err = DateWindow::new(day("2024-03-10"), day("2024-03-01")).unwrap_err();
        assert!(matches!(err, JiraError::InvalidDateRange { .. }));
    }

    #[test]
    fn window_contains_is_inclusive() {
        let window = DateWindow::new(day("2024-03-01"), day("2024-03-03")).unwrap();
        assert!(window.contains(day("2024-03-01")));
        assert!(window.contains(day("2024-03-03")));
        assert!(!window.contains(day("2024-02-29")));
        assert!(!window.contains(day("2024-03-04")));
    }

    #[test]
    fn single_day_window_since_is_utc_midnight() {
        let window = DateWindow::single(day("2024-03-01"));
        assert_eq!(window.since_epoch_millis(), 1_709_251_200_000);
    }

    #[test]
    fn range_jql_appends_extra_predicate_in_parens() {
        let window = DateWindow::new(day("2024-03-01"), day("2024-03-05")).unwrap();
        assert_eq!(
            range_jql(&window, None),
            "worklogDate >= \"2024-03-01\" AND worklogDate <= \"2024-03-05\""
        );
        assert_eq!(
            range_jql(&window, Some("project = DEV")),
            "worklogDate >= \"2024-03-01\" AND worklogDate <= \"2024-03-05\" AND (project = DEV)"
        );
        assert_eq!(
            range_jql(&window, Some("   ")),
            "worklogDate >= \"2024-03-01\" AND worklogDate <= \"2024-03-05\""
        );
    }

    #[test]
    fn record_outside_window_is_discarded() {
        let window = DateWindow::single(day("2024-03-01"));
        let meta = IssueMeta {
            key: "DEV-1".to_string(),
            summary: "Fix login".to_string(),
            activity: "Bug".to_string(),
        };

        let inside = record_from_worklog(&worklog("2024-03-01T09:00:00.000+0000", 7200, "Ada"), &meta, &window);
        let outside = record_from_worklog(&worklog("2024-03-02T09:00:00.000+0000", 7200, "Ada"), &meta, &window);

        let record = inside.unwrap();
        assert_eq!(record.date, day("2024-03-01"));
        assert_eq!(record.hours, 2.0);
        assert_eq!(record.issue_key, "DEV-1");
        assert!(outside.is_none());
    }

    #[test]
    fn missing_fields_default_to_empty_strings() {
        let window = DateWindow::single(day("2024-03-01"));
        let meta = IssueMeta::placeholder("999");
        let raw = Worklog {
            id: None,
            issue_id: Some("999".to_string()),
            author: None,
            started: Some("2024-03-01T10:00:00.000+0000".to_string()),
            time_spent_seconds: None,
        };

        let record = record_from_worklog(&raw, &meta, &window).unwrap();
        assert_eq!(record.user, "");
        assert_eq!(record.summary, "");
        assert_eq!(record.activity, "");
        assert_eq!(record.issue_key, "UNKNOWN-999");
        assert_eq!(record.hours, 0.0);
    }

    #[test]
    fn undated_worklog_is_discarded() {
        let window = DateWindow::single(day("2024-03-01"));
        let meta = IssueMeta::placeholder("1");
        let raw = Worklog {
            id: None,
            issue_id: None,
            author: None,
            started: None,
            time_spent_seconds: Some(3600),
        };
        assert!(record_from_worklog(&raw, &meta, &window).is_none());
    }
}
