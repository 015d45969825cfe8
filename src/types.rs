use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;

/// A pull request awaiting the user's review, as shown in the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    /// `owner/name` of the repository the PR belongs to.
    pub repository: String,
    pub author_login: String,
    pub created_at: DateTime<Utc>,
    pub number: u64,
    pub url: String,
    pub title: String,
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// One page of search results, in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// Total number of matches reported by the API, which may exceed
    /// the number of pull requests actually retrieved.
    pub issue_count: u64,
    pub pull_requests: Vec<PullRequest>,
}

impl SearchResult {
    /// Matches the API counted but did not return in this page.
    pub fn hidden_count(&self) -> u64 {
        self.issue_count
            .saturating_sub(self.pull_requests.len() as u64)
    }
}

/// Failure talking to the GraphQL API.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS or timeout failure, or an unusable endpoint.
    Transport(String),
    /// The server answered with a non-success status.
    Status { status: StatusCode, body: String },
    /// The body was not the JSON shape we asked for.
    Decode(serde_json::Error),
    /// The API accepted the request but reported query errors.
    GraphQL(Vec<String>),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(reason) => write!(f, "Request failed: {reason}"),
            FetchError::Status { status, body } if body.is_empty() => {
                write!(f, "GitHub API returned {status}")
            }
            FetchError::Status { status, body } => {
                write!(f, "GitHub API returned {status}: {body}")
            }
            FetchError::Decode(err) => write!(f, "Malformed response from GitHub API: {err}"),
            FetchError::GraphQL(messages) => {
                write!(f, "GitHub API error: {}", messages.join("; "))
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display hides the underlying cause (DNS, refused, ...).
        let mut reason = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        FetchError::Transport(reason)
    }
}

/// Anything that can run a GraphQL search document and hand back results.
///
/// The real implementation is [`crate::GitHub`]; tests substitute canned
/// responses.
#[async_trait]
pub trait ReviewSource {
    async fn search(&self, document: &str) -> Result<SearchResult, FetchError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn pr(labels: &[&str]) -> PullRequest {
        PullRequest {
            repository: "owner/repo".to_string(),
            author_login: "alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2020, 3, 5, 10, 0, 0).unwrap(),
            number: 1,
            url: "https://github.com/owner/repo/pull/1".to_string(),
            title: "Fix things".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn has_label_is_exact_match() {
        let pr = pr(&["WIP", "bug"]);
        assert!(pr.has_label("WIP"));
        assert!(pr.has_label("bug"));
        assert!(!pr.has_label("wip"));
        assert!(!pr.has_label("WIP "));
    }

    #[test]
    fn hidden_count_reports_unretrieved_matches() {
        let result = SearchResult {
            issue_count: 120,
            pull_requests: vec![pr(&[]); 100],
        };
        assert_eq!(result.hidden_count(), 20);

        let complete = SearchResult {
            issue_count: 1,
            pull_requests: vec![pr(&[])],
        };
        assert_eq!(complete.hidden_count(), 0);
    }

    #[test]
    fn status_error_message_includes_body_when_present() {
        let err = FetchError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "Bad credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GitHub API returned 401 Unauthorized: Bad credentials"
        );

        let bare = FetchError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert_eq!(bare.to_string(), "GitHub API returned 502 Bad Gateway");
    }

    #[test]
    fn graphql_errors_are_joined() {
        let err = FetchError::GraphQL(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(err.to_string(), "GitHub API error: first; second");
    }
}
