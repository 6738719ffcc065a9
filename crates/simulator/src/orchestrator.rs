use tracing::info;

use crate::apply::find_apply_button;
use crate::discovery::ensure_json_editor;
use crate::error::{InjectError, OperationResult};
use crate::inject::set_editor_content;
use crate::page::HostPage;
use crate::poll::{wait_for, Timing};

/// Opens the simulator's JSON editor, writes `json` into it and presses its apply control.
///
/// Every failure comes back as an [`InjectError`] whose message is fit for the user.
pub async fn apply_to_simulator<P: HostPage + ?Sized>(page: &P, json: &str, timing: &Timing) -> OperationResult {
    let handle = ensure_json_editor(page, timing).await?;

    set_editor_content(page, &handle, json).await?;
    info!("Wrote {} bytes into the {} editor", json.len(), handle.editor.kind());

    let root = Some(handle.root);
    let apply = wait_for(timing.apply_timeout, timing.apply_interval, || find_apply_button(page, root))
        .await?
        .ok_or(InjectError::ApplyControlNotFound)?;

    page.click(apply).await?;
    info!("Applied JSON to the simulator");
    Ok(())
}
