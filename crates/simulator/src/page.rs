//! The seam between the automation heuristics and a concrete page.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// Opaque element handle. Valid only for the page that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub u32);

/// Embedded-editor content model handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelRef(pub u32);

/// Embedded-editor view handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewRef(pub u32);

/// The three computed-style properties visibility depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Input,
    Change,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
        }
    }
}

/// Structural reads and narrow writes against a page we do not own.
#[async_trait]
pub trait HostPage: Send + Sync {
    /// Descendants of `scope` (or the whole document) matching `selector`, in document order.
    async fn query_all(&self, scope: Option<NodeRef>, selector: &str) -> Result<Vec<NodeRef>, PageError>;

    async fn computed_style(&self, node: NodeRef) -> Result<ComputedStyle, PageError>;

    async fn text_content(&self, node: NodeRef) -> Result<String, PageError>;

    /// `node` itself or its nearest ancestor matching `selector`.
    async fn closest(&self, node: NodeRef, selector: &str) -> Result<Option<NodeRef>, PageError>;

    async fn set_value(&self, node: NodeRef, text: &str) -> Result<(), PageError>;

    async fn set_text_content(&self, node: NodeRef, text: &str) -> Result<(), PageError>;

    /// Dispatches a bubbling synthetic event.
    async fn dispatch_event(&self, node: NodeRef, event: DomEvent) -> Result<(), PageError>;

    async fn click(&self, node: NodeRef) -> Result<(), PageError>;

    /// Models of the page-global embedded-editor registry; empty when there is none.
    async fn editor_models(&self) -> Result<Vec<ModelRef>, PageError>;

    async fn model_value(&self, model: ModelRef) -> Result<String, PageError>;

    async fn set_model_value(&self, model: ModelRef, text: &str) -> Result<(), PageError>;

    /// Editor views of the registry; empty when it cannot enumerate them.
    async fn editor_views(&self) -> Result<Vec<ViewRef>, PageError>;

    /// Issues an empty edit on the view so the host re-validates.
    async fn touch_view(&self, view: ViewRef) -> Result<(), PageError>;

    /// First match of `selector`, if any.
    async fn query(&self, scope: Option<NodeRef>, selector: &str) -> Result<Option<NodeRef>, PageError> {
        Ok(self.query_all(scope, selector).await?.into_iter().next())
    }
}
