//! Rendering of search results as status-bar plugin output.
//!
//! The widget reads one menu entry per line. The first line is shown in the
//! bar itself; lines after the first `---` form the drop-down. Each line is
//! either bare text or `<text> | key=value key=value ...`.

use std::{fmt, io::Write};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{
    config::{ConfigError, DEFAULT_WIP_LABEL},
    types::{FetchError, SearchResult},
};

pub const SEPARATOR: &str = "---";
pub const WARNING_HEADER: &str = "⚠ Github review requests";

const TITLE_SIZE: u32 = 16;
const SUBTITLE_SIZE: u32 = 12;
const DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DATE_OUTPUT_FORMAT: &str = "%B %d, %Y";

/// One line of plugin output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLine {
    pub text: String,
    pub attrs: Vec<(&'static str, String)>,
}

impl MenuLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: Vec::new(),
        }
    }

    pub fn separator() -> Self {
        Self::new(SEPARATOR)
    }

    pub fn attr(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.attrs.push((key, value.to_string()));
        self
    }
}

impl fmt::Display for MenuLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if self.attrs.is_empty() {
            return Ok(());
        }

        write!(f, " |")?;
        for (key, value) in &self.attrs {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Colours for the two lines of each pull request entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub inactive: String,
    pub title: String,
    pub subtitle: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            inactive: "#b4b4b4".to_string(),
            title: "#000000".to_string(),
            subtitle: "#586069".to_string(),
        }
    }
}

impl Palette {
    /// `(title, subtitle)` colours for an active or dimmed entry.
    pub fn colors(&self, inactive: bool) -> (&str, &str) {
        if inactive {
            (self.inactive.as_str(), self.inactive.as_str())
        } else {
            (self.title.as_str(), self.subtitle.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuStyle {
    /// Pull requests carrying this label are dimmed, not hidden.
    pub wip_label: String,
    pub palette: Palette,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self::with_wip_label(DEFAULT_WIP_LABEL)
    }
}

impl MenuStyle {
    pub fn with_wip_label(label: impl Into<String>) -> Self {
        Self {
            wip_label: label.into(),
            palette: Palette::default(),
        }
    }
}

/// Reformats an API timestamp such as `2020-03-05T10:00:00Z` as
/// `March 05, 2020`.
///
/// This is the string-to-string form of [`format_date`]. [`render`] works
/// on timestamps serde has already parsed and calls `format_date` directly.
pub fn parse_date(text: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(text, DATE_INPUT_FORMAT)
        .with_context(|| format!("Invalid timestamp: '{}'", text))?;
    Ok(format_date(&parsed.and_utc()))
}

/// Date shown in each entry's subtitle line.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_OUTPUT_FORMAT).to_string()
}

/// Builds the menu for a set of review requests.
pub fn render(result: &SearchResult, style: &MenuStyle) -> Vec<MenuLine> {
    let mut lines = Vec::with_capacity(3 + result.pull_requests.len() * 3);
    lines.push(MenuLine::new(format!("#{}", result.issue_count)));
    lines.push(MenuLine::separator());

    for pr in &result.pull_requests {
        let inactive = pr.has_label(&style.wip_label);
        let (title_color, subtitle_color) = style.palette.colors(inactive);

        lines.push(
            MenuLine::new(format!("{} - {}", pr.repository, pr.title))
                .attr("size", TITLE_SIZE)
                .attr("color", title_color)
                .attr("href", &pr.url),
        );
        lines.push(
            MenuLine::new(format!(
                "#{} opened on {} by @{}",
                pr.number,
                format_date(&pr.created_at),
                pr.author_login
            ))
            .attr("size", SUBTITLE_SIZE)
            .attr("color", subtitle_color),
        );
        lines.push(MenuLine::separator());
    }

    let hidden = result.hidden_count();
    if hidden > 0 {
        lines.push(
            MenuLine::new(format!("{hidden} more not shown"))
                .attr("size", SUBTITLE_SIZE)
                .attr("color", &style.palette.subtitle),
        );
    }

    lines
}

fn warning(detail: impl Into<String>) -> Vec<MenuLine> {
    vec![
        MenuLine::new(WARNING_HEADER).attr("color", "red"),
        MenuLine::separator(),
        MenuLine::new(detail),
    ]
}

/// Output for a configuration that cannot be used.
pub fn config_diagnostic(err: &ConfigError) -> Vec<MenuLine> {
    match err {
        ConfigError::NotFound(_) => vec![MenuLine::new(err.to_string())],
        ConfigError::Incomplete | ConfigError::Unreadable { .. } => warning(err.to_string()),
    }
}

/// Output for a failed API call.
pub fn fetch_failed(err: &FetchError) -> Vec<MenuLine> {
    // A stray newline would split the detail into several menu entries.
    let detail = err.to_string().replace(['\r', '\n'], " ");
    warning(detail)
}

pub fn write_menu<W: Write>(lines: &[MenuLine], writer: &mut W) -> std::io::Result<()> {
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}
