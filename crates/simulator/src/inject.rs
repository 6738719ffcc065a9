use tracing::{debug, info, warn};

use crate::discovery::{Editor, EditorHandle};
use crate::error::{InjectError, OperationResult, PageError};
use crate::page::{DomEvent, HostPage, ModelRef, NodeRef};

/// Writes `text` into the editor the way its implementation expects, then lets the
/// host page's own listeners see the edit.
pub async fn set_editor_content<P: HostPage + ?Sized>(page: &P, handle: &EditorHandle, text: &str) -> OperationResult {
    match &handle.editor {
        Editor::TextInput(element) => {
            page.set_value(*element, text).await?;
            notify_edit(page, *element).await?;
            Ok(())
        }
        Editor::RichText(element) => {
            page.set_text_content(*element, text).await?;
            notify_edit(page, *element).await?;
            Ok(())
        }
        Editor::EmbeddedModel(models) if models.is_empty() => Err(InjectError::UnsupportedEditorType),
        Editor::EmbeddedModel(models) => write_models(page, models, text).await,
    }
}

async fn notify_edit<P: HostPage + ?Sized>(page: &P, element: NodeRef) -> Result<(), PageError> {
    page.dispatch_event(element, DomEvent::Input).await?;
    page.dispatch_event(element, DomEvent::Change).await
}

/// Empty or JSON-shaped content marks a model as ours; others belong to unrelated editors.
pub fn is_replaceable(current: &str) -> bool {
    let current = current.trim();
    current.is_empty() || current.starts_with('{') || current.starts_with('[')
}

async fn write_models<P: HostPage + ?Sized>(page: &P, models: &[ModelRef], text: &str) -> OperationResult {
    let mut updated = 0usize;
    for &model in models {
        let current = match page.model_value(model).await {
            Ok(current) => current,
            Err(e) => {
                warn!("Skipping editor model {:?}: {}", model, e);
                continue;
            }
        };
        if !is_replaceable(&current) {
            debug!("Leaving editor model {:?} alone", model);
            continue;
        }
        match page.set_model_value(model, text).await {
            Ok(()) => updated += 1,
            Err(e) => warn!("Failed to set editor model {:?}: {}", model, e),
        }
    }

    if updated == 0 {
        return Err(InjectError::EditorWriteFailed);
    }
    info!("Updated {} embedded editor model(s)", updated);

    // Nudge every view so the host re-validates; a view refusing is not fatal.
    for view in page.editor_views().await.unwrap_or_default() {
        if let Err(e) = page.touch_view(view).await {
            debug!("Editor view {:?} ignored the edit trigger: {}", view, e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Element, FixturePage};

    #[test]
    fn test_is_replaceable() {
        assert!(is_replaceable(""));
        assert!(is_replaceable("  \n"));
        assert!(is_replaceable(" {\"a\":1}"));
        assert!(is_replaceable("[]"));
        assert!(!is_replaceable("not json at all"));
        assert!(!is_replaceable("// {"));
    }

    #[tokio::test]
    async fn test_textarea_value_and_events() {
        let mut page = FixturePage::new();
        let root = page.append(None, Element::new("div"));
        let area = page.append(Some(root), Element::new("textarea"));
        let handle = EditorHandle { root, editor: Editor::TextInput(area) };

        let json = "{\n  \"type\": \"bubble\"\n}";
        set_editor_content(&page, &handle, json).await.unwrap();

        assert_eq!(page.value(area).await, json);
        assert_eq!(page.event_count(area, DomEvent::Input).await, 1);
        assert_eq!(page.event_count(area, DomEvent::Change).await, 1);
    }

    #[tokio::test]
    async fn test_rich_text_replaces_content() {
        let mut page = FixturePage::new();
        let root = page.append(None, Element::new("div"));
        let region = page.append(Some(root), Element::new("div").attr("contenteditable", "true"));
        page.append(Some(region), Element::new("span").text("{\"old\":true}"));
        let handle = EditorHandle { root, editor: Editor::RichText(region) };

        set_editor_content(&page, &handle, "{}").await.unwrap();

        assert_eq!(page.text(region).await, "{}");
        assert_eq!(page.event_count(region, DomEvent::Input).await, 1);
        assert_eq!(page.event_count(region, DomEvent::Change).await, 1);
    }

    #[tokio::test]
    async fn test_embedded_updates_only_json_shaped_models() {
        let mut page = FixturePage::new();
        let root = page.append(None, Element::new("div"));
        page.install_editor_registry(&["{}", "not json at all"], Some(2));
        let handle = EditorHandle { root, editor: Editor::EmbeddedModel(vec![ModelRef(0), ModelRef(1)]) };

        set_editor_content(&page, &handle, "{\"a\":1}").await.unwrap();

        assert_eq!(page.model_text(0).await.as_deref(), Some("{\"a\":1}"));
        assert_eq!(page.model_text(1).await.as_deref(), Some("not json at all"));
        assert_eq!(page.view_touches(0).await, Some(1));
        assert_eq!(page.view_touches(1).await, Some(1));
    }

    #[tokio::test]
    async fn test_embedded_without_candidates_fails() {
        let mut page = FixturePage::new();
        let root = page.append(None, Element::new("div"));
        page.install_editor_registry(&["const x = 1;"], Some(1));
        let handle = EditorHandle { root, editor: Editor::EmbeddedModel(vec![ModelRef(0)]) };

        let result = set_editor_content(&page, &handle, "{}").await;
        assert_eq!(result, Err(InjectError::EditorWriteFailed));
        assert_eq!(page.view_touches(0).await, Some(0));
    }

    #[tokio::test]
    async fn test_embedded_skips_broken_model() {
        let mut page = FixturePage::new();
        let root = page.append(None, Element::new("div"));
        page.install_editor_registry(&["{}", ""], None);
        page.break_model(0);
        let handle = EditorHandle { root, editor: Editor::EmbeddedModel(vec![ModelRef(0), ModelRef(1)]) };

        set_editor_content(&page, &handle, "[1]").await.unwrap();
        assert_eq!(page.model_text(0).await.as_deref(), Some("{}"));
        assert_eq!(page.model_text(1).await.as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_empty_embedded_handle_is_unsupported() {
        let mut page = FixturePage::new();
        let root = page.append(None, Element::new("div"));
        let handle = EditorHandle { root, editor: Editor::EmbeddedModel(Vec::new()) };

        let result = set_editor_content(&page, &handle, "{}").await;
        assert_eq!(result, Err(InjectError::UnsupportedEditorType));
    }
}
