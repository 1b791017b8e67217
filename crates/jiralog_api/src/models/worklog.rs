use serde::Deserialize;
use serde_json::Value;

/// One page of the per-issue worklog listing.
#[derive(Debug, Deserialize)]
pub struct WorklogPage {
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
    #[serde(default)]
    pub total: u64,
}

/// A single time-tracking entry as returned by the worklog endpoints.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    #[serde(default)]
    pub id: Option<Value>,
    pub issue_id: Option<String>,
    pub author: Option<WorklogAuthor>,
    pub started: Option<String>,
    pub time_spent_seconds: Option<i64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorklogAuthor {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub account_id: Option<String>,
}

/// One page of the `worklog/updated` cursor feed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedWorklogsPage {
    #[serde(default)]
    pub values: Vec<UpdatedWorklogRef>,
    #[serde(default)]
    pub last_page: bool,
    pub until: Option<i64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedWorklogRef {
    pub worklog_id: i64,
}
