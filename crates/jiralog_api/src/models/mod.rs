mod issue;
mod worklog;

pub use issue::{Issue, IssueFields, IssueType, SearchPage};
pub use worklog::{UpdatedWorklogRef, UpdatedWorklogsPage, Worklog, WorklogAuthor, WorklogPage};
