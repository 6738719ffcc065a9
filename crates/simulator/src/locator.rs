//! Text- and structure-based lookups. Read-only.

use tracing::debug;

use crate::error::PageError;
use crate::page::{HostPage, NodeRef};
use crate::visibility::is_visible;

pub const CLICKABLE_SELECTOR: &str = r#"button, [role="button"], a"#;

/// Containers the simulator uses for modal dialogs, most specific first.
pub const DIALOG_SELECTORS: &[&str] = &[
    r#"[role="dialog"]"#,
    ".modal",
    ".dialog",
    ".MuiDialog-root",
    ".ant-modal",
];

pub const EMBEDDED_EDITOR_CONTAINER: &str = ".monaco-editor";

/// A node that left the document mid-probe makes the probe a miss, so polling goes on.
pub(crate) fn detached_as_miss<T>(result: Result<Option<T>, PageError>) -> Result<Option<T>, PageError> {
    match result {
        Err(PageError::Detached) => Ok(None),
        other => other,
    }
}

/// Collapses whitespace runs, trims and lowercases.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// The first visible clickable element whose normalised text contains any of `labels`.
pub async fn find_by_label<P: HostPage + ?Sized>(
    page: &P,
    labels: &[&str],
    scope: Option<NodeRef>,
) -> Result<Option<NodeRef>, PageError> {
    let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    for node in page.query_all(scope, CLICKABLE_SELECTOR).await? {
        if !is_visible(page, node).await? {
            continue;
        }
        let text = match page.text_content(node).await {
            Ok(text) => normalize_text(&text),
            Err(PageError::Detached) => continue,
            Err(e) => return Err(e),
        };
        if text.is_empty() {
            continue;
        }
        if lowered.iter().any(|label| text.contains(label.as_str())) {
            debug!("Matched clickable {:?} by label: {}", node, text);
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// A visible dialog container that mentions JSON, or the block around a visible embedded editor.
pub async fn find_dialog<P: HostPage + ?Sized>(page: &P, scope: Option<NodeRef>) -> Result<Option<NodeRef>, PageError> {
    for selector in DIALOG_SELECTORS {
        for node in page.query_all(scope, selector).await? {
            if !is_visible(page, node).await? {
                continue;
            }
            let text = match page.text_content(node).await {
                Ok(text) => text,
                Err(PageError::Detached) => continue,
                Err(e) => return Err(e),
            };
            if text.to_lowercase().contains("json") {
                return Ok(Some(node));
            }
        }
    }

    if let Some(container) = page.query(scope, EMBEDDED_EDITOR_CONTAINER).await? {
        if is_visible(page, container).await? {
            return detached_as_miss(page.closest(container, "div").await);
        }
    }

    Ok(None)
}
