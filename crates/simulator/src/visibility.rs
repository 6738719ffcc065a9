use crate::error::PageError;
use crate::page::{ComputedStyle, HostPage, NodeRef};

const MIN_OPACITY: f64 = 0.05;

impl ComputedStyle {
    pub fn is_visible(&self) -> bool {
        if self.display == "none" || self.visibility == "hidden" {
            return false;
        }
        let opacity = self.opacity.trim();
        let opacity = if opacity.is_empty() { "1" } else { opacity };
        // An unparsable opacity compares false, like NaN would.
        opacity.parse::<f64>().map(|o| o > MIN_OPACITY).unwrap_or(false)
    }
}

/// Whether `node` is meaningfully visible. A detached node is not.
pub async fn is_visible<P: HostPage + ?Sized>(page: &P, node: NodeRef) -> Result<bool, PageError> {
    match page.computed_style(node).await {
        Ok(style) => Ok(style.is_visible()),
        Err(PageError::Detached) => Ok(false),
        Err(e) => Err(e),
    }
}

/// The first visible node of `nodes`.
pub async fn first_visible<P: HostPage + ?Sized>(page: &P, nodes: &[NodeRef]) -> Result<Option<NodeRef>, PageError> {
    for &node in nodes {
        if is_visible(page, node).await? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}
