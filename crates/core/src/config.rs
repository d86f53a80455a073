// Client configuration loaded from environment variables.
// Decision: IDGEN_ prefix for all client config
// Decision: Defaults target a backend running locally on port 5050

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::guard::GuardPolicy;
use crate::validation::EmailDomainPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:5050";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const SESSION_FILE_NAME: &str = "session.json";

/// Complete client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Upper bound for a single auth request
    pub http_timeout: Duration,
    /// Where the file-backed session lives
    pub session_file: PathBuf,
    /// Registration email-domain allow-list
    pub email_domains: EmailDomainPolicy,
    /// Route-guard verification requirement
    pub guard: GuardPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            session_file: default_session_file(),
            email_domains: EmailDomainPolicy::default(),
            guard: GuardPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let api_url = std::env::var("IDGEN_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let http_timeout = std::env::var("IDGEN_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        let session_file = std::env::var("IDGEN_SESSION_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        let email_domains = std::env::var("IDGEN_ALLOWED_EMAIL_DOMAINS")
            .map(|s| EmailDomainPolicy::from_list(&s))
            .unwrap_or_default();

        let require_verified = std::env::var("IDGEN_REQUIRE_VERIFIED")
            .map(|s| parse_bool(&s))
            .unwrap_or(false);

        Self {
            api_url: normalize_base_url(&api_url),
            http_timeout,
            session_file,
            email_domains,
            guard: GuardPolicy { require_verified },
        }
    }

    /// Override the base URL (CLI flag)
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_base_url(api_url);
        self
    }
}

/// Platform data directory, falling back to the working directory
pub fn default_session_file() -> PathBuf {
    ProjectDirs::from("", "", "idgen")
        .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(".idgen").join(SESSION_FILE_NAME))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
