use crate::error::PageError;
use crate::locator::{detached_as_miss, find_by_label, normalize_text};
use crate::page::{HostPage, NodeRef};
use crate::visibility::is_visible;

const APPLY_TEST_IDS: &str = r#"[data-testid="apply-json"], [data-testid="view-json-apply"]"#;
const PRIMARY_BUTTON: &str = "button.btn.btn-primary";

/// "Apply" in English and Japanese; the last form spells 用 with the Kangxi radical U+2F64.
pub const APPLY_LABELS: &[&str] = &["apply", "適用", "適\u{2F64}"];

/// The host page's own confirmation control within `scope`. A detached `scope` holds none.
pub async fn find_apply_button<P: HostPage + ?Sized>(page: &P, scope: Option<NodeRef>) -> Result<Option<NodeRef>, PageError> {
    detached_as_miss(find_apply_in(page, scope).await)
}

async fn find_apply_in<P: HostPage + ?Sized>(page: &P, scope: Option<NodeRef>) -> Result<Option<NodeRef>, PageError> {
    if let Some(direct) = page.query(scope, APPLY_TEST_IDS).await? {
        if is_visible(page, direct).await? {
            return Ok(Some(direct));
        }
    }

    if let Some(labelled) = find_by_label(page, APPLY_LABELS, scope).await? {
        return Ok(Some(labelled));
    }

    // Every match here also passes the label tier above while `button` is clickable.
    for button in page.query_all(scope, PRIMARY_BUTTON).await? {
        if !is_visible(page, button).await? {
            continue;
        }
        let text = match page.text_content(button).await {
            Ok(text) => text,
            Err(PageError::Detached) => continue,
            Err(e) => return Err(e),
        };
        if normalize_text(&text).contains("apply") {
            return Ok(Some(button));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Element, FixturePage};

    #[tokio::test]
    async fn test_test_id_first() {
        let mut page = FixturePage::new();
        let dialog = page.append(None, Element::new("div"));
        page.append(Some(dialog), Element::new("button").text("Apply"));
        let direct = page.append(Some(dialog), Element::new("span").attr("data-testid", "view-json-apply"));

        assert_eq!(find_apply_button(&page, Some(dialog)).await.unwrap(), Some(direct));
    }

    #[tokio::test]
    async fn test_hidden_test_id_falls_through_to_label() {
        let mut page = FixturePage::new();
        let dialog = page.append(None, Element::new("div"));
        page.append(Some(dialog), Element::new("button").attr("data-testid", "apply-json").display("none"));
        let labelled = page.append(Some(dialog), Element::new("button").text("適\u{2F64}"));

        assert_eq!(find_apply_button(&page, Some(dialog)).await.unwrap(), Some(labelled));
    }

    #[tokio::test]
    async fn test_scope_excludes_outside_controls() {
        let mut page = FixturePage::new();
        page.append(None, Element::new("button").text("Apply"));
        let dialog = page.append(None, Element::new("div"));
        page.append(Some(dialog), Element::new("button").text("Close"));

        assert_eq!(find_apply_button(&page, Some(dialog)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_label_tier_answers_before_primary_button_tier() {
        let mut page = FixturePage::new();
        let dialog = page.append(None, Element::new("div"));
        let link = page.append(Some(dialog), Element::new("div").attr("role", "button").text("Apply and close"));
        page.append(Some(dialog), Element::new("button").class("btn btn-primary").text("Apply"));

        assert_eq!(find_apply_button(&page, Some(dialog)).await.unwrap(), Some(link));
    }

    #[tokio::test]
    async fn test_detached_scope_holds_no_control() {
        let mut page = FixturePage::new();
        let wrapper = page.append(None, Element::new("div"));
        let dialog = page.append(Some(wrapper), Element::new("div"));
        page.append(Some(dialog), Element::new("button").text("Apply"));
        page.set_text_content(wrapper, "").await.unwrap();

        assert_eq!(find_apply_button(&page, Some(dialog)).await, Ok(None));
    }
}
