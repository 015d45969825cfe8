use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{FetchError, PullRequest, SearchResult};

/// Login GitHub shows for pull requests whose author account was deleted.
pub const GHOST_LOGIN: &str = "ghost";

const SEARCH_DOCUMENT: &str = r#"{
  search(query: $SEARCH_QUERY, type: ISSUE, first: 100) {
    issueCount
    edges {
      node {
        ... on PullRequest {
          repository {
            nameWithOwner
          }
          author {
            login
          }
          createdAt
          number
          url
          title
          labels(first: 100) {
            nodes {
              name
            }
          }
        }
      }
    }
  }
}"#;

/// Builds the GraphQL document for `search_query`.
///
/// The search string is embedded as a quoted string literal. JSON string
/// escaping is a subset of GraphQL's, so quotes or backslashes in user
/// filters cannot break out of the literal.
pub fn search_document(search_query: &str) -> String {
    let literal = serde_json::Value::String(search_query.to_string()).to_string();
    SEARCH_DOCUMENT.replace("$SEARCH_QUERY", &literal)
}

/// Request body for a GraphQL-over-HTTP POST.
pub fn request_body(document: &str) -> serde_json::Value {
    serde_json::json!({ "query": document })
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: Option<SearchData>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: GraphQLSearch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLSearch {
    pub issue_count: u64,
    pub edges: Vec<GraphQLEdge>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLEdge {
    pub node: GraphQLPullRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPullRequest {
    pub repository: GraphQLRepository,
    pub author: Option<GraphQLAuthor>,
    pub created_at: DateTime<Utc>,
    pub number: u64,
    pub url: String,
    pub title: String,
    pub labels: GraphQLLabelConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRepository {
    pub name_with_owner: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLAuthor {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabelConnection {
    pub nodes: Vec<GraphQLLabel>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabel {
    pub name: String,
}

impl From<GraphQLPullRequest> for PullRequest {
    fn from(pr: GraphQLPullRequest) -> Self {
        PullRequest {
            repository: pr.repository.name_with_owner,
            author_login: pr
                .author
                .map(|a| a.login)
                .unwrap_or_else(|| GHOST_LOGIN.to_string()),
            created_at: pr.created_at,
            number: pr.number,
            url: pr.url,
            title: pr.title,
            labels: pr.labels.nodes.into_iter().map(|l| l.name).collect(),
        }
    }
}

/// Parses a response body into search results.
///
/// GraphQL errors only fail the fetch when no data came back alongside
/// them; partial data is shown as-is.
pub fn parse_search_response(body: &str) -> Result<SearchResult, FetchError> {
    let response: GraphQLResponse = serde_json::from_str(body).map_err(FetchError::Decode)?;
    into_search_result(response)
}

pub fn into_search_result(response: GraphQLResponse) -> Result<SearchResult, FetchError> {
    let Some(data) = response.data else {
        let messages = if response.errors.is_empty() {
            vec!["response contained no data".to_string()]
        } else {
            response.errors.into_iter().map(|e| e.message).collect()
        };
        return Err(FetchError::GraphQL(messages));
    };

    Ok(SearchResult {
        issue_count: data.search.issue_count,
        pull_requests: data
            .search
            .edges
            .into_iter()
            .map(|edge| edge.node.into())
            .collect(),
    })
}
