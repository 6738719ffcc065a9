use flexdesigner_simulator::fixture::{ClickAction, Element, EventAction, FixturePage};
use flexdesigner_simulator::{apply_to_simulator, DomEvent, InjectError, Timing};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_textarea_dialog_end_to_end() {
    let mut page = FixturePage::new();
    let dialog = page.append(None, Element::new("div").attr("role", "dialog"));
    page.append(Some(dialog), Element::new("div").class("modal-title").text("View JSON"));
    let area = page.append(Some(dialog), Element::new("textarea"));
    let apply = page.append(Some(dialog), Element::new("button").class("btn btn-primary").text("Apply"));

    let json = r#"{"type":"bubble"}"#;
    apply_to_simulator(&page, json, &Timing::default()).await.unwrap();

    assert_eq!(page.value(area).await, json);
    assert_eq!(page.event_count(area, DomEvent::Input).await, 1);
    assert_eq!(page.event_count(area, DomEvent::Change).await, 1);
    assert_eq!(page.click_count(apply).await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_opens_dialog_and_waits_for_late_apply_control() {
    let mut page = FixturePage::new();
    let trigger = page.append(None, Element::new("button").class("btn btn-secondary"));
    page.append(Some(trigger), Element::new("i").class("fa fa-code"));

    let dialog = page.append(None, Element::new("div").class("modal").hidden_until_revealed());
    page.append(Some(dialog), Element::new("h5").text("JSON"));
    let monaco = page.append(Some(dialog), Element::new("div").class("monaco-editor").hidden_until_revealed());
    let apply = page.append(Some(dialog), Element::new("button").text("適用").hidden_until_revealed());
    page.install_editor_registry(&["", "console.log('other editor')"], Some(1));

    page.on_click(trigger, ClickAction::Reveal { target: dialog, after: Duration::from_millis(300) });
    page.on_click(trigger, ClickAction::Reveal { target: monaco, after: Duration::from_millis(300) });
    page.on_click(trigger, ClickAction::Reveal { target: apply, after: Duration::from_millis(1500) });

    apply_to_simulator(&page, "{\n  \"type\": \"carousel\"\n}", &Timing::default()).await.unwrap();

    assert_eq!(page.click_count(trigger).await, 1);
    assert_eq!(page.model_text(0).await.as_deref(), Some("{\n  \"type\": \"carousel\"\n}"));
    assert_eq!(page.model_text(1).await.as_deref(), Some("console.log('other editor')"));
    assert_eq!(page.view_touches(0).await, Some(1));
    assert_eq!(page.click_count(apply).await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_apply_control_is_reported_after_its_window() {
    let mut page = FixturePage::new();
    let dialog = page.append(None, Element::new("div").attr("role", "dialog").text("JSON"));
    let area = page.append(Some(dialog), Element::new("textarea"));
    // outside the dialog, so it must not be used
    let stray = page.append(None, Element::new("button").text("Apply"));

    let timing = Timing::default();
    let start = Instant::now();
    let result = apply_to_simulator(&page, "{}", &timing).await;

    assert_eq!(result, Err(InjectError::ApplyControlNotFound));
    assert_eq!(result.unwrap_err().to_string(), "apply control not found");
    assert!(start.elapsed() > timing.apply_timeout);
    assert_eq!(page.value(area).await, "{}");
    assert_eq!(page.click_count(stray).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dialog_re_rendered_after_write_times_out_as_missing_apply() {
    let mut page = FixturePage::new();
    let dialog = page.append(None, Element::new("div").attr("role", "dialog").text("JSON"));
    let area = page.append(Some(dialog), Element::new("textarea"));
    let apply = page.append(Some(dialog), Element::new("button").text("Apply"));
    page.on_event(area, DomEvent::Change, EventAction::Remove { target: dialog });

    let timing = Timing::default();
    let start = Instant::now();
    let result = apply_to_simulator(&page, "{}", &timing).await;

    assert_eq!(result, Err(InjectError::ApplyControlNotFound));
    assert!(start.elapsed() > timing.apply_timeout);
    assert_eq!(page.value(area).await, "{}");
    assert_eq!(page.click_count(apply).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_unwritable_embedded_editor_stops_before_apply() {
    let mut page = FixturePage::new();
    let dialog = page.append(None, Element::new("div").attr("role", "dialog").text("JSON"));
    let apply = page.append(Some(dialog), Element::new("button").text("Apply"));
    page.install_editor_registry(&["<html></html>"], None);

    let result = apply_to_simulator(&page, "{}", &Timing::default()).await;

    assert_eq!(result, Err(InjectError::EditorWriteFailed));
    assert_eq!(result.unwrap_err().to_string(), "could not update embedded editor");
    assert_eq!(page.click_count(apply).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_page_reports_editor_not_found() {
    let page = FixturePage::new();
    let timing = Timing {
        editor_timeout: Duration::from_millis(600),
        ..Timing::default()
    };

    let start = Instant::now();
    let result = apply_to_simulator(&page, "{}", &timing).await;

    assert_eq!(result, Err(InjectError::EditorNotFound));
    assert_eq!(result.unwrap_err().to_string(), "editor not found");
    assert!(start.elapsed() > Duration::from_millis(600));
}
