//! Plugin settings read from an INI file in the user's home directory.
//!
//! The file is shared with other status-bar plugins, so each plugin reads
//! its own section:
//!
//! ```ini
//! [github-review-requests]
//! access_token=0123456789abcdef
//! username=whoami
//! hostname=github.example.com
//! filters=label:whatever
//! ```

use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".bitbarrc";
pub const DEFAULT_SECTION: &str = "github-review-requests";
pub const DEFAULT_HOSTNAME: &str = "github.com";
pub const DEFAULT_WIP_LABEL: &str = "WIP";

/// Values are taken as written: no quote stripping, no backslash escapes.
fn raw_values() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

/// Settings for one run. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub hostname: String,
    pub access_token: String,
    pub username: String,
    /// Extra search qualifiers appended to the generated query.
    pub filters: String,
    /// PRs carrying this label are dimmed in the menu.
    pub wip_label: String,
}

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    /// `access_token` or `username` is missing or blank.
    Incomplete,
    Unreadable { path: PathBuf, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Can't find {}", display_path(path)),
            ConfigError::Incomplete => write!(f, "access_token and username cannot be empty"),
            ConfigError::Unreadable { path, reason } => {
                write!(f, "Can't read {}: {reason}", display_path(path))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// `$HOME/.bitbarrc`, or a bare `~/.bitbarrc` that will not exist when the
/// home directory cannot be determined.
pub fn default_config_path() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(CONFIG_FILE_NAME)
}

/// Renders `path` with the home directory abbreviated to `~`.
pub fn display_path(path: &Path) -> String {
    home::home_dir()
        .filter(|home| home.parent().is_some())
        .and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf))
        .map(|rest| format!("~/{}", rest.display()))
        .unwrap_or_else(|| path.display().to_string())
}

/// Loads and validates the settings stored under `section` in `path`.
pub fn load_settings(path: &Path, section: &str) -> Result<Settings, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    debug!("Reading section [{}] of {}", section, path.display());
    let ini =
        Ini::load_from_file_opt(path, raw_values()).map_err(|err| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    settings_from_ini(&ini, section)
}

/// Like [`load_settings`] but for configuration text already in memory.
pub fn parse_settings(text: &str, section: &str) -> Result<Settings, ConfigError> {
    let ini =
        Ini::load_from_str_opt(text, raw_values()).map_err(|err| ConfigError::Unreadable {
            path: PathBuf::from(CONFIG_FILE_NAME),
            reason: err.to_string(),
        })?;

    settings_from_ini(&ini, section)
}

fn settings_from_ini(ini: &Ini, section: &str) -> Result<Settings, ConfigError> {
    let properties = ini.section(Some(section));
    // Option names are case-insensitive; section names are not.
    let get = |key: &str| {
        properties
            .and_then(|p| {
                p.iter()
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
            })
            .map(|(_, value)| value.trim())
            .unwrap_or_default()
            .to_string()
    };

    let access_token = get("access_token");
    let username = get("username");
    if access_token.is_empty() || username.is_empty() {
        return Err(ConfigError::Incomplete);
    }

    let hostname = Some(get("hostname"))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
    let wip_label = Some(get("wip_label"))
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_WIP_LABEL.to_string());

    Ok(Settings {
        hostname,
        access_token,
        username,
        filters: get("filters"),
        wip_label,
    })
}
