//! In-memory host page for exercising the automation heuristics offline.
//!
//! Elements carry inline `display`/`visibility`/`opacity`, a text node and a form value.
//! `visibility` inherits from ancestors; `display` and `opacity` do not, matching what
//! computed style reports per element.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::PageError;
use crate::page::{ComputedStyle, DomEvent, HostPage, ModelRef, NodeRef, ViewRef};
use crate::selector::{ElementTree, SelectorList};

/// Builder for one fixture element.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    display: Option<String>,
    visibility: Option<String>,
    opacity: Option<String>,
    hidden_until_revealed: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        match self.attrs.iter_mut().find(|(k, _)| k == "class") {
            Some((_, v)) => {
                v.push(' ');
                v.push_str(class);
            }
            None => self.attrs.push(("class".to_string(), class.to_string())),
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.retain(|(k, _)| k != name);
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn display(mut self, display: &str) -> Self {
        self.display = Some(display.to_string());
        self
    }

    pub fn visibility(mut self, visibility: &str) -> Self {
        self.visibility = Some(visibility.to_string());
        self
    }

    pub fn opacity(mut self, opacity: &str) -> Self {
        self.opacity = Some(opacity.to_string());
        self
    }

    /// Rendered as `display: none` until a [`ClickAction::Reveal`] takes effect.
    pub fn hidden_until_revealed(mut self) -> Self {
        self.hidden_until_revealed = true;
        self
    }
}

/// What a click on a fixture element does besides being counted.
#[derive(Debug, Clone)]
pub enum ClickAction {
    /// `target` becomes visible `after` the click.
    Reveal { target: NodeRef, after: Duration },
}

/// What dispatching an event on a fixture element does besides being counted.
#[derive(Debug, Clone)]
pub enum EventAction {
    /// `target` and its subtree leave the document, as on a host re-render.
    Remove { target: NodeRef },
}

#[derive(Debug)]
struct Node {
    element: Element,
    parent: Option<usize>,
    children: Vec<usize>,
    value: String,
    events: HashMap<DomEvent, usize>,
    clicks: usize,
    on_click: Vec<ClickAction>,
    on_event: Vec<(DomEvent, EventAction)>,
    revealed_at: Option<Instant>,
    detached: bool,
}

impl Node {
    fn new(element: Element, parent: Option<usize>) -> Self {
        Self {
            element,
            parent,
            children: Vec::new(),
            value: String::new(),
            events: HashMap::new(),
            clicks: 0,
            on_click: Vec::new(),
            on_event: Vec::new(),
            revealed_at: None,
            detached: false,
        }
    }
}

#[derive(Debug)]
struct Model {
    value: String,
    broken: bool,
}

#[derive(Debug, Default)]
struct Registry {
    models: Vec<Model>,
    views: Option<Vec<usize>>,
}

#[derive(Debug)]
struct Dom {
    nodes: Vec<Node>,
    registry: Option<Registry>,
}

impl ElementTree for Dom {
    fn parent_of(&self, id: usize) -> Option<usize> {
        self.nodes[id].parent
    }

    fn tag_of(&self, id: usize) -> &str {
        &self.nodes[id].element.tag
    }

    fn attr_of(&self, id: usize, name: &str) -> Option<&str> {
        self.nodes[id]
            .element
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Dom {
    fn live(&self, node: NodeRef) -> Result<usize, PageError> {
        let id = node.0 as usize;
        match self.nodes.get(id) {
            Some(n) if !n.detached => Ok(id),
            _ => Err(PageError::Detached),
        }
    }

    fn descendants(&self, id: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn text_of(&self, id: usize) -> String {
        let mut text = self.nodes[id].element.text.clone();
        for &child in &self.nodes[id].children {
            text.push_str(&self.text_of(child));
        }
        text
    }

    fn inherited_visibility(&self, id: usize) -> String {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(v) = &self.nodes[current].element.visibility {
                return v.clone();
            }
            cursor = self.nodes[current].parent;
        }
        "visible".to_string()
    }

    fn detach_subtree(&mut self, id: usize) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.nodes[child].detached = true;
            self.detach_subtree(child);
        }
    }

    fn remove(&mut self, id: usize) {
        if id == 0 || id >= self.nodes.len() {
            return;
        }
        self.detach_subtree(id);
        self.nodes[id].detached = true;
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    fn model(&mut self, model: ModelRef) -> Result<&mut Model, PageError> {
        self.registry
            .as_mut()
            .and_then(|r| r.models.get_mut(model.0 as usize))
            .ok_or_else(|| PageError::Script(format!("no editor model #{}", model.0)))
    }
}

/// A scripted page. Build it with `&mut self` methods, then share it behind `&`.
#[derive(Debug)]
pub struct FixturePage {
    dom: Mutex<Dom>,
}

impl Default for FixturePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FixturePage {
    /// An empty document with a `body` root.
    pub fn new() -> Self {
        Self {
            dom: Mutex::new(Dom {
                nodes: vec![Node::new(Element::new("body"), None)],
                registry: None,
            }),
        }
    }

    /// Appends `element` under `parent`; an unknown parent falls back to the body.
    pub fn append(&mut self, parent: Option<NodeRef>, element: Element) -> NodeRef {
        let dom = self.dom.get_mut();
        let parent = parent
            .map(|p| p.0 as usize)
            .filter(|&p| p < dom.nodes.len())
            .unwrap_or(0);
        let id = dom.nodes.len();
        dom.nodes.push(Node::new(element, Some(parent)));
        dom.nodes[parent].children.push(id);
        NodeRef(id as u32)
    }

    /// Ignored for unknown nodes.
    pub fn on_click(&mut self, node: NodeRef, action: ClickAction) {
        if let Some(n) = self.dom.get_mut().nodes.get_mut(node.0 as usize) {
            n.on_click.push(action);
        }
    }

    /// Ignored for unknown nodes.
    pub fn on_event(&mut self, node: NodeRef, event: DomEvent, action: EventAction) {
        if let Some(n) = self.dom.get_mut().nodes.get_mut(node.0 as usize) {
            n.on_event.push((event, action));
        }
    }

    /// Installs a page-global editor registry. `views: None` models a registry
    /// that cannot enumerate its editor views.
    pub fn install_editor_registry(&mut self, models: &[&str], views: Option<usize>) {
        self.dom.get_mut().registry = Some(Registry {
            models: models
                .iter()
                .map(|v| Model { value: v.to_string(), broken: false })
                .collect(),
            views: views.map(|n| vec![0; n]),
        });
    }

    /// Makes every read and write of the model fail.
    pub fn break_model(&mut self, model: usize) {
        if let Some(m) = self.dom.get_mut().registry.as_mut().and_then(|r| r.models.get_mut(model)) {
            m.broken = true;
        }
    }

    /// Form value; empty for unknown nodes.
    pub async fn value(&self, node: NodeRef) -> String {
        let dom = self.dom.lock().await;
        dom.nodes.get(node.0 as usize).map(|n| n.value.clone()).unwrap_or_default()
    }

    pub async fn text(&self, node: NodeRef) -> String {
        let dom = self.dom.lock().await;
        let id = node.0 as usize;
        if id < dom.nodes.len() { dom.text_of(id) } else { String::new() }
    }

    pub async fn event_count(&self, node: NodeRef, event: DomEvent) -> usize {
        let dom = self.dom.lock().await;
        dom.nodes
            .get(node.0 as usize)
            .and_then(|n| n.events.get(&event).copied())
            .unwrap_or(0)
    }

    pub async fn click_count(&self, node: NodeRef) -> usize {
        let dom = self.dom.lock().await;
        dom.nodes.get(node.0 as usize).map(|n| n.clicks).unwrap_or(0)
    }

    pub async fn model_text(&self, model: usize) -> Option<String> {
        let dom = self.dom.lock().await;
        dom.registry.as_ref()?.models.get(model).map(|m| m.value.clone())
    }

    pub async fn view_touches(&self, view: usize) -> Option<usize> {
        let dom = self.dom.lock().await;
        dom.registry.as_ref()?.views.as_ref()?.get(view).copied()
    }
}

fn parse(selector: &str) -> Result<SelectorList, PageError> {
    SelectorList::parse(selector).map_err(|e| PageError::Script(e.to_string()))
}

#[async_trait]
impl HostPage for FixturePage {
    async fn query_all(&self, scope: Option<NodeRef>, selector: &str) -> Result<Vec<NodeRef>, PageError> {
        let selector = parse(selector)?;
        let dom = self.dom.lock().await;
        let root = match scope {
            Some(node) => dom.live(node)?,
            None => 0,
        };
        let mut candidates = Vec::new();
        dom.descendants(root, &mut candidates);
        Ok(candidates
            .into_iter()
            .filter(|&id| selector.matches(&*dom, id))
            .map(|id| NodeRef(id as u32))
            .collect())
    }

    async fn computed_style(&self, node: NodeRef) -> Result<ComputedStyle, PageError> {
        let dom = self.dom.lock().await;
        let id = dom.live(node)?;
        let n = &dom.nodes[id];
        let still_hidden = n.element.hidden_until_revealed
            && n.revealed_at.is_none_or(|at| Instant::now() < at);
        let display = if still_hidden {
            "none".to_string()
        } else {
            n.element.display.clone().unwrap_or_else(|| "block".to_string())
        };
        Ok(ComputedStyle {
            display,
            visibility: dom.inherited_visibility(id),
            opacity: n.element.opacity.clone().unwrap_or_else(|| "1".to_string()),
        })
    }

    async fn text_content(&self, node: NodeRef) -> Result<String, PageError> {
        let dom = self.dom.lock().await;
        let id = dom.live(node)?;
        Ok(dom.text_of(id))
    }

    async fn closest(&self, node: NodeRef, selector: &str) -> Result<Option<NodeRef>, PageError> {
        let selector = parse(selector)?;
        let dom = self.dom.lock().await;
        let mut cursor = Some(dom.live(node)?);
        while let Some(id) = cursor {
            if selector.matches(&*dom, id) {
                return Ok(Some(NodeRef(id as u32)));
            }
            cursor = dom.nodes[id].parent;
        }
        Ok(None)
    }

    async fn set_value(&self, node: NodeRef, text: &str) -> Result<(), PageError> {
        let mut dom = self.dom.lock().await;
        let id = dom.live(node)?;
        dom.nodes[id].value = text.to_string();
        Ok(())
    }

    async fn set_text_content(&self, node: NodeRef, text: &str) -> Result<(), PageError> {
        let mut dom = self.dom.lock().await;
        let id = dom.live(node)?;
        dom.detach_subtree(id);
        dom.nodes[id].element.text = text.to_string();
        Ok(())
    }

    async fn dispatch_event(&self, node: NodeRef, event: DomEvent) -> Result<(), PageError> {
        let mut dom = self.dom.lock().await;
        let id = dom.live(node)?;
        *dom.nodes[id].events.entry(event).or_insert(0) += 1;
        let actions: Vec<EventAction> = dom.nodes[id]
            .on_event
            .iter()
            .filter(|(on, _)| *on == event)
            .map(|(_, action)| action.clone())
            .collect();
        for action in actions {
            match action {
                EventAction::Remove { target } => dom.remove(target.0 as usize),
            }
        }
        Ok(())
    }

    async fn click(&self, node: NodeRef) -> Result<(), PageError> {
        let mut dom = self.dom.lock().await;
        let id = dom.live(node)?;
        dom.nodes[id].clicks += 1;
        let actions = dom.nodes[id].on_click.clone();
        for action in actions {
            match action {
                ClickAction::Reveal { target, after } => {
                    if let Some(t) = dom.nodes.get_mut(target.0 as usize) {
                        t.revealed_at = Some(Instant::now() + after);
                    }
                }
            }
        }
        Ok(())
    }

    async fn editor_models(&self) -> Result<Vec<ModelRef>, PageError> {
        let dom = self.dom.lock().await;
        Ok(dom
            .registry
            .as_ref()
            .map(|r| (0..r.models.len() as u32).map(ModelRef).collect())
            .unwrap_or_default())
    }

    async fn model_value(&self, model: ModelRef) -> Result<String, PageError> {
        let mut dom = self.dom.lock().await;
        let m = dom.model(model)?;
        if m.broken {
            return Err(PageError::Script("model is disposed".to_string()));
        }
        Ok(m.value.clone())
    }

    async fn set_model_value(&self, model: ModelRef, text: &str) -> Result<(), PageError> {
        let mut dom = self.dom.lock().await;
        let m = dom.model(model)?;
        if m.broken {
            return Err(PageError::Script("model is disposed".to_string()));
        }
        m.value = text.to_string();
        Ok(())
    }

    async fn editor_views(&self) -> Result<Vec<ViewRef>, PageError> {
        let dom = self.dom.lock().await;
        Ok(dom
            .registry
            .as_ref()
            .and_then(|r| r.views.as_ref())
            .map(|v| (0..v.len() as u32).map(ViewRef).collect())
            .unwrap_or_default())
    }

    async fn touch_view(&self, view: ViewRef) -> Result<(), PageError> {
        let mut dom = self.dom.lock().await;
        let touches = dom
            .registry
            .as_mut()
            .and_then(|r| r.views.as_mut())
            .and_then(|v| v.get_mut(view.0 as usize))
            .ok_or_else(|| PageError::Script(format!("no editor view #{}", view.0)))?;
        *touches += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_is_scoped_and_ordered() {
        let mut page = FixturePage::new();
        let outside = page.append(None, Element::new("button").text("Apply"));
        let dialog = page.append(None, Element::new("div").attr("role", "dialog"));
        let first = page.append(Some(dialog), Element::new("button").text("Cancel"));
        let wrapper = page.append(Some(dialog), Element::new("span"));
        let nested = page.append(Some(wrapper), Element::new("a").text("Apply"));

        let all = page.query_all(None, "button, a").await.unwrap();
        assert_eq!(all, vec![outside, first, nested]);

        let scoped = page.query_all(Some(dialog), "button, a").await.unwrap();
        assert_eq!(scoped, vec![first, nested]);
    }

    #[tokio::test]
    async fn test_visibility_inherits_but_display_does_not() {
        let mut page = FixturePage::new();
        let parent = page.append(None, Element::new("div").visibility("hidden").display("none"));
        let child = page.append(Some(parent), Element::new("button"));

        let style = page.computed_style(child).await.unwrap();
        assert_eq!(style.visibility, "hidden");
        assert_eq!(style.display, "block");
    }

    #[tokio::test]
    async fn test_set_text_content_detaches_children() {
        let mut page = FixturePage::new();
        let editable = page.append(None, Element::new("div").attr("contenteditable", "true"));
        let line = page.append(Some(editable), Element::new("p").text("old"));

        page.set_text_content(editable, "new").await.unwrap();
        assert_eq!(page.text(editable).await, "new");
        assert_eq!(page.computed_style(line).await, Err(PageError::Detached));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_after_click() {
        let mut page = FixturePage::new();
        let button = page.append(None, Element::new("button"));
        let dialog = page.append(None, Element::new("div").hidden_until_revealed());
        page.on_click(button, ClickAction::Reveal { target: dialog, after: Duration::from_millis(300) });

        assert_eq!(page.computed_style(dialog).await.unwrap().display, "none");
        page.click(button).await.unwrap();
        tokio::time::advance(Duration::from_millis(299)).await;
        assert_eq!(page.computed_style(dialog).await.unwrap().display, "none");
        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(page.computed_style(dialog).await.unwrap().display, "block");
    }

    #[tokio::test]
    async fn test_event_removes_subtree() {
        let mut page = FixturePage::new();
        let dialog = page.append(None, Element::new("div").attr("role", "dialog"));
        let area = page.append(Some(dialog), Element::new("textarea"));
        let button = page.append(Some(dialog), Element::new("button"));
        page.on_event(area, DomEvent::Change, EventAction::Remove { target: dialog });

        page.dispatch_event(area, DomEvent::Input).await.unwrap();
        assert_eq!(page.query_all(None, "button").await.unwrap(), vec![button]);

        page.dispatch_event(area, DomEvent::Change).await.unwrap();
        assert!(page.query_all(None, "button").await.unwrap().is_empty());
        assert_eq!(page.text_content(dialog).await, Err(PageError::Detached));
        assert_eq!(page.query_all(Some(button), "*").await, Err(PageError::Detached));
    }
}
