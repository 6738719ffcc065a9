//! Finding the simulator's JSON editor, opening it first when needed.

use tracing::{debug, info, warn};

use crate::error::{InjectError, OperationResult, PageError};
use crate::locator::{detached_as_miss, find_by_label, find_dialog};
use crate::page::{HostPage, ModelRef, NodeRef};
use crate::poll::{wait_for, Timing};
use crate::visibility::{first_visible, is_visible};

const VIEW_JSON_ICON: &str = "button.btn.btn-secondary i.fa.fa-code";

pub const VIEW_JSON_LABELS: &[&str] = &[
    "View JSON",
    "View Json",
    "View as JSON",
    "View as Json",
    "JSONを表示",
    "JSON を表示",
    "Show JSON",
];

/// Which editor implementation the dialog uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    /// A plain `<textarea>`.
    TextInput(NodeRef),
    /// A `contenteditable` region.
    RichText(NodeRef),
    /// Models of the page-global embedded code editor. Discovery never builds this empty.
    EmbeddedModel(Vec<ModelRef>),
}

impl Editor {
    pub fn kind(&self) -> &'static str {
        match self {
            Editor::TextInput(_) => "textarea",
            Editor::RichText(_) => "contenteditable",
            Editor::EmbeddedModel(_) => "embedded",
        }
    }
}

/// A discovered editor and the dialog it was found in. Not reused across attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorHandle {
    pub root: NodeRef,
    pub editor: Editor,
}

/// One probe of the current page, without side effects.
pub async fn find_json_editor<P: HostPage + ?Sized>(page: &P) -> Result<Option<EditorHandle>, PageError> {
    let Some(root) = find_dialog(page, None).await? else {
        return Ok(None);
    };
    // The dialog can be re-rendered between finding it and looking inside it.
    detached_as_miss(find_editor_in(page, root).await)
}

async fn find_editor_in<P: HostPage + ?Sized>(page: &P, root: NodeRef) -> Result<Option<EditorHandle>, PageError> {
    let textareas = page.query_all(Some(root), "textarea").await?;
    if let Some(area) = first_visible(page, &textareas).await? {
        return Ok(Some(EditorHandle { root, editor: Editor::TextInput(area) }));
    }

    let models = page.editor_models().await?;
    if !models.is_empty() {
        return Ok(Some(EditorHandle { root, editor: Editor::EmbeddedModel(models) }));
    }

    let editables = page.query_all(Some(root), r#"[contenteditable="true"]"#).await?;
    if let Some(region) = first_visible(page, &editables).await? {
        return Ok(Some(EditorHandle { root, editor: Editor::RichText(region) }));
    }

    debug!("Dialog {:?} has no editor yet", root);
    Ok(None)
}

/// The control that opens the JSON dialog: the code-icon button, else a labelled one.
pub async fn find_view_json_button<P: HostPage + ?Sized>(page: &P) -> Result<Option<NodeRef>, PageError> {
    if let Some(icon) = page.query(None, VIEW_JSON_ICON).await? {
        if let Some(button) = detached_as_miss(page.closest(icon, "button").await)? {
            if is_visible(page, button).await? {
                return Ok(Some(button));
            }
        }
    }
    find_by_label(page, VIEW_JSON_LABELS, None).await
}

/// Returns the open editor, clicking "view JSON" once and polling if it is not open yet.
pub async fn ensure_json_editor<P: HostPage + ?Sized>(page: &P, timing: &Timing) -> OperationResult<EditorHandle> {
    if let Some(handle) = find_json_editor(page).await? {
        info!("Found open {} editor", handle.editor.kind());
        return Ok(handle);
    }

    match find_view_json_button(page).await? {
        Some(trigger) => {
            info!("Opening the JSON dialog");
            page.click(trigger).await?;
        }
        None => warn!("No View JSON control on the page; waiting for an editor anyway"),
    }

    match wait_for(timing.editor_timeout, timing.editor_interval, || find_json_editor(page)).await? {
        Some(handle) => {
            info!("JSON dialog opened with a {} editor", handle.editor.kind());
            Ok(handle)
        }
        None => Err(InjectError::EditorNotFound),
    }
}
