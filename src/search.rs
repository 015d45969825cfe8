/// Accumulates GitHub search qualifiers into a single query string.
#[derive(Debug, Default)]
pub struct SearchQueryBuilder {
    terms: Vec<String>,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pr_type(&mut self) -> &mut Self {
        self.terms.push("type:pr".to_string());
        self
    }

    pub fn open(&mut self) -> &mut Self {
        self.terms.push("state:open".to_string());
        self
    }

    pub fn review_requested(&mut self, login: &str) -> &mut Self {
        self.terms.push(format!("review-requested:{login}"));
        self
    }

    /// Appends user-supplied qualifiers verbatim. Blank input is a no-op.
    pub fn raw(&mut self, qualifiers: &str) -> &mut Self {
        let qualifiers = qualifiers.trim();
        if !qualifiers.is_empty() {
            self.terms.push(qualifiers.to_string());
        }
        self
    }

    pub fn build(&self) -> String {
        self.terms.join(" ")
    }
}

/// Search string for open PRs where `username` has a pending review request,
/// narrowed by the user's extra `filters`.
pub fn review_requests_query(username: &str, filters: &str) -> String {
    SearchQueryBuilder::new()
        .pr_type()
        .open()
        .review_requested(username)
        .raw(filters)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_without_filters() {
        assert_eq!(
            review_requests_query("whoami", ""),
            "type:pr state:open review-requested:whoami"
        );
    }

    #[test]
    fn filters_are_appended_verbatim() {
        assert_eq!(
            review_requests_query("whoami", "label:whatever -repo:org/legacy"),
            "type:pr state:open review-requested:whoami label:whatever -repo:org/legacy"
        );
    }

    #[test]
    fn whitespace_only_filters_are_ignored() {
        assert_eq!(
            review_requests_query("whoami", "   \t"),
            review_requests_query("whoami", "")
        );
    }

    #[test]
    fn builder_keeps_term_order() {
        let query = SearchQueryBuilder::new()
            .raw("org:acme")
            .pr_type()
            .open()
            .build();
        assert_eq!(query, "org:acme type:pr state:open");
    }
}
