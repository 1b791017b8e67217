//! Typed Jira REST API client focused on worklog extraction.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pagination;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use extract::{
    fetch_worklogs_for_day, fetch_worklogs_for_range, DateWindow, SearchSource, UpdatedFeedSource,
    WorklogRecord, WorklogSource,
};
pub use models::{
    Issue, IssueFields, IssueType, SearchPage, UpdatedWorklogRef, UpdatedWorklogsPage, Worklog,
    WorklogAuthor, WorklogPage,
};
