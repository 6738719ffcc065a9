//! Path utilities for Flex Designer
//!
//! Handles tilde expansion and app-root resolution.

use std::path::PathBuf;

/// Expands a leading `~` to `home`.
fn expand_tilde_with(path: &str, home: &str) -> String {
    if path == "~" {
        return home.to_string();
    }
    match path.strip_prefix("~/") {
        Some(rest) => format!("{}/{}", home.trim_end_matches('/'), rest),
        None => path.to_string(),
    }
}

fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
}

/// Resolves the Flex Designer data directory from `FLEXDESIGNER_ROOT`.
/// Absolute paths are used as-is, `~` paths are expanded and bare names live under `$HOME`.
pub fn get_app_root() -> PathBuf {
    let root_name = std::env::var("FLEXDESIGNER_ROOT").ok();
    resolve_app_root(root_name.as_deref(), &home_dir())
}

fn resolve_app_root(root_name: Option<&str>, home: &str) -> PathBuf {
    let root_name = root_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(".flexdesigner");

    if root_name.starts_with('/') {
        PathBuf::from(root_name)
    } else if root_name.starts_with('~') {
        PathBuf::from(expand_tilde_with(root_name, home))
    } else {
        PathBuf::from(home).join(root_name)
    }
}
