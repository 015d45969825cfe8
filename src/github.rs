use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::debug;
use url::Url;

use crate::{
    config::Settings,
    graphql::{parse_search_response, request_body},
    types::{FetchError, ReviewSource, SearchResult},
};

const USER_AGENT: &str = concat!("review-requests/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 200;

/// GraphQL endpoint for a GitHub host: `https://<hostname>/api/graphql`.
///
/// That is where GitHub Enterprise serves GraphQL. Public GitHub is the one
/// exception: `github.com` (or `api.github.com`) has no `/api/graphql` path
/// and maps to `https://api.github.com/graphql` instead.
pub fn graphql_endpoint(hostname: &str) -> Result<Url, FetchError> {
    let host = hostname.trim().trim_end_matches('/');
    let raw = match host {
        "github.com" | "api.github.com" => "https://api.github.com/graphql".to_string(),
        _ => format!("https://{host}/api/graphql"),
    };
    Url::parse(&raw)
        .map_err(|err| FetchError::Transport(format!("invalid API endpoint '{raw}': {err}")))
}

/// Reduces an error response body to something that fits on one menu line.
fn summarize_body(body: &str) -> String {
    // GitHub error bodies are JSON with a human-readable "message".
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string));
    if let Some(message) = message {
        return message;
    }

    let first_line = body.lines().map(str::trim).find(|l| !l.is_empty());
    first_line
        .map(|line| line.chars().take(MAX_ERROR_BODY).collect())
        .unwrap_or_default()
}

/// Authenticated client for a GitHub GraphQL endpoint.
#[derive(Debug)]
pub struct GitHub {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl GitHub {
    pub fn new(settings: &Settings, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = graphql_endpoint(&settings.hostname)?;
        Self::with_endpoint(endpoint, &settings.access_token, timeout)
    }

    pub fn with_endpoint(endpoint: Url, token: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ReviewSource for GitHub {
    async fn search(&self, document: &str) -> Result<SearchResult, FetchError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("bearer {}", self.token))
            .json(&request_body(document))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("{} returned {} ({} bytes)", self.endpoint, status, body.len());

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: summarize_body(&body),
            });
        }

        let result = parse_search_response(&body)?;
        debug!(
            "Search matched {} issues, {} retrieved",
            result.issue_count,
            result.pull_requests.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};

    use super::*;

    const EMPTY_SEARCH: &str = r#"{"data":{"search":{"issueCount":0,"edges":[]}}}"#;

    fn client(server: &Server) -> GitHub {
        let endpoint = Url::parse(&format!("{}/api/graphql", server.url())).unwrap();
        GitHub::with_endpoint(endpoint, "secret-token", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn enterprise_hosts_use_api_graphql_path() {
        assert_eq!(
            graphql_endpoint("github.example.com").unwrap().as_str(),
            "https://github.example.com/api/graphql"
        );
        assert_eq!(
            graphql_endpoint(" github.example.com/ ").unwrap().as_str(),
            "https://github.example.com/api/graphql"
        );
    }

    #[test]
    fn public_github_uses_api_host() {
        for host in ["github.com", "api.github.com"] {
            assert_eq!(
                graphql_endpoint(host).unwrap().as_str(),
                "https://api.github.com/graphql"
            );
        }
    }

    #[test]
    fn invalid_hostname_is_rejected() {
        assert!(matches!(
            graphql_endpoint("bad host name"),
            Err(FetchError::Transport(_))
        ));
    }

    #[test]
    fn client_from_settings_targets_configured_host() {
        let settings = Settings {
            hostname: "github.example.com".to_string(),
            access_token: "abc".to_string(),
            username: "me".to_string(),
            filters: String::new(),
            wip_label: "WIP".to_string(),
        };
        let github = GitHub::new(&settings, Duration::from_secs(1)).unwrap();
        assert_eq!(
            github.endpoint().as_str(),
            "https://github.example.com/api/graphql"
        );
    }

    #[test]
    fn error_bodies_are_summarized() {
        assert_eq!(
            summarize_body(
                r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com"}"#
            ),
            "Bad credentials"
        );
        assert_eq!(summarize_body("\n  upstream timeout  \nmore"), "upstream timeout");
        assert_eq!(summarize_body(""), "");
        assert_eq!(summarize_body(&"x".repeat(500)).len(), MAX_ERROR_BODY);
    }

    #[tokio::test]
    async fn sends_authenticated_json_post() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql")
            .match_header("authorization", "bearer secret-token")
            .match_header("content-type", "application/json")
            .match_header("user-agent", Matcher::Regex("^review-requests/".to_string()))
            .match_body(Matcher::Json(serde_json::json!({ "query": "{ search }" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EMPTY_SEARCH)
            .create_async()
            .await;

        let result = client(&server).search("{ search }").await.unwrap();
        assert_eq!(result, SearchResult::default());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        match client(&server).search("{ search }").await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Bad credentials");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        assert!(matches!(
            client(&server).search("{ search }").await,
            Err(FetchError::Decode(_))
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql")
            .with_status(200)
            .with_body(r#"{"data":null,"errors":[{"message":"Could not resolve to a User"}]}"#)
            .create_async()
            .await;

        match client(&server).search("{ search }").await {
            Err(FetchError::GraphQL(messages)) => {
                assert_eq!(messages, vec!["Could not resolve to a User"]);
            }
            other => panic!("expected GraphQL error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = Url::parse(&format!("http://{addr}/api/graphql")).unwrap();
        let github =
            GitHub::with_endpoint(endpoint, "secret-token", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            github.search("{ search }").await,
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn unresponsive_server_times_out() {
        // Never accepted; the kernel completes the handshake and the
        // request goes unanswered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint =
            Url::parse(&format!("http://{}/api/graphql", listener.local_addr().unwrap())).unwrap();

        let github =
            GitHub::with_endpoint(endpoint, "secret-token", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            github.search("{ search }").await,
            Err(FetchError::Transport(_))
        ));
        drop(listener);
    }
}
