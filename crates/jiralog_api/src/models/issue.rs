use serde::Deserialize;

/// One page of a JQL search result.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub issuetype: Option<IssueType>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IssueType {
    pub name: Option<String>,
}
