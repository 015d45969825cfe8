use tracing::{debug, warn};

use crate::{
    config::Settings,
    graphql::search_document,
    menu::{MenuLine, MenuStyle, fetch_failed, render},
    search::review_requests_query,
    types::ReviewSource,
};

/// Fetches the user's pending review requests and renders the menu.
///
/// Never fails: an unreachable or misbehaving API produces a warning menu
/// so the status bar always has well-formed output to show.
pub async fn review_menu<S>(settings: &Settings, style: &MenuStyle, source: &S) -> Vec<MenuLine>
where
    S: ReviewSource + Sync,
{
    let search_query = review_requests_query(&settings.username, &settings.filters);
    debug!("Search query: {}", search_query);

    match source.search(&search_document(&search_query)).await {
        Ok(result) => render(&result, style),
        Err(err) => {
            warn!("Fetching review requests failed: {}", err);
            fetch_failed(&err)
        }
    }
}
