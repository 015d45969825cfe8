//! Review requests: a status-bar plugin listing pull requests awaiting
//! your review.
//!
//! Reads credentials from an INI file, runs a single GitHub GraphQL search
//! for open PRs with a pending review request for the configured user, and
//! renders the results in the line-oriented menu format status-bar hosts
//! consume. Each run is a stateless, one-shot fetch-and-print.

pub mod cli;
pub mod config;
pub mod github;
pub mod graphql;
pub mod menu;
pub mod query;
pub mod search;
pub mod types;

pub use cli::{Invocation, parse_args};
pub use config::{ConfigError, Settings, load_settings, parse_settings};
pub use github::GitHub;
pub use menu::{MenuLine, MenuStyle, Palette, parse_date, render, write_menu};
pub use query::review_menu;
pub use types::{FetchError, PullRequest, ReviewSource, SearchResult};
