//! Build script for review-requests - embeds version information.
//!
//! `BUILD_INFO_HUMAN` is shown by `--version` and combines:
//!
//! 1. the crate version from Cargo.toml,
//! 2. `git describe --tags --always --dirty` in parentheses, or a
//!    `v{version}-{timestamp}-{commit}` pseudo-version when no tag exists,
//! 3. the rustc version string.
//!
//! Any piece that cannot be determined is left out.

use std::process::Command;

use chrono::Utc;

fn main() {
    ["src", "build.rs", "Cargo.toml", "Cargo.lock"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

/// Runs a command and returns its trimmed stdout when it succeeds.
fn capture(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn git_version() -> Option<String> {
    let desc = capture("git", &["describe", "--tags", "--always", "--dirty"])?;
    if desc.contains('v') || desc.contains("-g") {
        return Some(desc);
    }

    // Untagged history: describe only returned a commit hash.
    let commit = capture("git", &["rev-parse", "--short=12", "HEAD"])?;
    let dirty = desc.ends_with("-dirty");
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let suffix = if dirty { "+dirty" } else { "" };

    Some(format!(
        "v{}-{timestamp}-{commit}{suffix}",
        env!("CARGO_PKG_VERSION")
    ))
}

fn build_info() -> String {
    [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        git_version().map(|v| format!("({v})")),
        capture("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
