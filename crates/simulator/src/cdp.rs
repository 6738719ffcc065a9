//! [`HostPage`] over the Chrome DevTools Protocol.

use async_trait::async_trait;
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::bridge::bridge_js;
use crate::error::PageError;
use crate::page::{ComputedStyle, DomEvent, HostPage, ModelRef, NodeRef, ViewRef};

#[derive(Debug, Deserialize)]
struct BridgeReply {
    #[serde(default)]
    ok: Value,
    error: Option<String>,
    #[serde(default)]
    detached: bool,
}

impl BridgeReply {
    fn into_result<T: DeserializeOwned>(self, op: &str) -> Result<T, PageError> {
        if self.detached {
            return Err(PageError::Detached);
        }
        if let Some(error) = self.error {
            return Err(PageError::Script(format!("{}: {}", op, error)));
        }
        serde_json::from_value(self.ok).map_err(|e| PageError::Script(format!("{}: unexpected reply: {}", op, e)))
    }
}

/// The expression that runs `op(...args)` through the page bridge, installing it if needed.
fn bridge_call(op: &str, args: &Value) -> String {
    let op_json = serde_json::to_string(op).unwrap_or_else(|_| "\"\"".to_string());
    format!("(function() {{ \n{}\n return window.__flexDesigner({}, {}); }})()", bridge_js(), op_json, args)
}

/// A live simulator tab.
#[derive(Clone)]
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    async fn call<T: DeserializeOwned>(&self, op: &str, args: Value) -> Result<T, PageError> {
        let result = self.page.evaluate(bridge_call(op, &args)).await?;
        let raw = result
            .value()
            .cloned()
            .ok_or_else(|| PageError::Script(format!("{}: no value returned", op)))?;
        let reply: BridgeReply =
            serde_json::from_value(raw).map_err(|e| PageError::Script(format!("{}: malformed reply: {}", op, e)))?;
        reply.into_result(op)
    }
}

#[async_trait]
impl HostPage for CdpPage {
    async fn query_all(&self, scope: Option<NodeRef>, selector: &str) -> Result<Vec<NodeRef>, PageError> {
        self.call("queryAll", json!([scope, selector])).await
    }

    async fn computed_style(&self, node: NodeRef) -> Result<ComputedStyle, PageError> {
        self.call("computedStyle", json!([node])).await
    }

    async fn text_content(&self, node: NodeRef) -> Result<String, PageError> {
        self.call("textContent", json!([node])).await
    }

    async fn closest(&self, node: NodeRef, selector: &str) -> Result<Option<NodeRef>, PageError> {
        self.call("closest", json!([node, selector])).await
    }

    async fn set_value(&self, node: NodeRef, text: &str) -> Result<(), PageError> {
        self.call::<Value>("setValue", json!([node, text])).await.map(drop)
    }

    async fn set_text_content(&self, node: NodeRef, text: &str) -> Result<(), PageError> {
        self.call::<Value>("setTextContent", json!([node, text])).await.map(drop)
    }

    async fn dispatch_event(&self, node: NodeRef, event: DomEvent) -> Result<(), PageError> {
        self.call::<Value>("dispatchEvent", json!([node, event.name()])).await.map(drop)
    }

    async fn click(&self, node: NodeRef) -> Result<(), PageError> {
        self.call::<Value>("click", json!([node])).await.map(drop)
    }

    async fn editor_models(&self) -> Result<Vec<ModelRef>, PageError> {
        self.call("editorModels", json!([])).await
    }

    async fn model_value(&self, model: ModelRef) -> Result<String, PageError> {
        self.call("modelValue", json!([model])).await
    }

    async fn set_model_value(&self, model: ModelRef, text: &str) -> Result<(), PageError> {
        self.call::<Value>("setModelValue", json!([model, text])).await.map(drop)
    }

    async fn editor_views(&self) -> Result<Vec<ViewRef>, PageError> {
        self.call("editorViews", json!([])).await
    }

    async fn touch_view(&self, view: ViewRef) -> Result<(), PageError> {
        self.call::<Value>("touchView", json!([view])).await.map(drop)
    }
}
