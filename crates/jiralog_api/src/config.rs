use std::time::Duration;

pub const DEFAULT_API_PATH: &str = "rest/api/3";
pub const DEFAULT_USER_AGENT: &str = "jiralog";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for a Jira Cloud site: host, basic-auth credentials
/// and request tuning knobs.
#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub domain: String,
    pub email: String,
    pub api_token: String,
    pub base_url: String,
    pub api_path: String,
    pub user_agent: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    pub fn new(
        domain: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        let domain = domain.into();
        let base_url = format!("https://{}", domain.trim_end_matches('/'));
        Self {
            domain,
            email: email.into(),
            api_token: api_token.into(),
            base_url,
            api_path: DEFAULT_API_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Effective page size, clamped to the 1..=100 window the search and
    /// worklog endpoints accept.
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, DEFAULT_PAGE_SIZE)
    }

    pub fn api_root(&self) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_path.trim_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::JiraConfig;
    use std::time::Duration;

    #[test]
    fn new_derives_base_url_from_domain() {
        let config = JiraConfig::new("acme.atlassian.net", "me@acme.com", "tok");
        assert_eq!(config.base_url, "https://acme.atlassian.net");
        assert_eq!(config.api_root(), "https://acme.atlassian.net/rest/api/3/");
    }

    #[test]
    fn builder_overrides_apply() {
        let config = JiraConfig::new("acme.atlassian.net", "me@acme.com", "tok")
            .with_base_url("http://127.0.0.1:9999")
            .with_page_size(25)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.api_root(), "http://127.0.0.1:9999/rest/api/3/");
        assert_eq!(config.page_size(), 25);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn page_size_is_clamped_to_server_limit() {
        let config = JiraConfig::new("acme.atlassian.net", "me@acme.com", "tok");
        assert_eq!(config.with_page_size(500).page_size(), 100);
        let config = JiraConfig::new("acme.atlassian.net", "me@acme.com", "tok");
        assert_eq!(config.with_page_size(0).page_size(), 1);
    }
}
