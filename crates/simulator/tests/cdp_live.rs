//! Runs the full apply flow against a real headless Chromium.
//!
//! `cargo test -p flexdesigner-simulator --test cdp_live -- --ignored`

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;

use flexdesigner_simulator::{apply_to_simulator, CdpPage, Timing};

const SIMULATOR_PAGE: &str = r#"<!doctype html>
<html><body>
  <button class="btn btn-secondary" id="open"><i class="fa fa-code"></i></button>
  <div class="modal" id="dialog" style="display:none">
    <h5>JSON</h5>
    <textarea id="json"></textarea>
    <button class="btn btn-primary" id="apply">Apply</button>
  </div>
  <script>
    window.applied = null;
    window.inputs = 0;
    document.getElementById('open').addEventListener('click', function () {
      setTimeout(function () { document.getElementById('dialog').style.display = 'block'; }, 200);
    });
    document.getElementById('json').addEventListener('input', function () { window.inputs += 1; });
    document.getElementById('apply').addEventListener('click', function () {
      window.applied = document.getElementById('json').value;
    });
  </script>
</body></html>"#;

#[tokio::test]
#[ignore = "needs a local Chromium"]
async fn test_apply_through_cdp() -> anyhow::Result<()> {
    let config = BrowserConfig::builder().build().map_err(anyhow::Error::msg)?;
    let (mut browser, mut handler) = Browser::launch(config).await?;
    let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let page = browser.new_page("about:blank").await?;
    page.set_content(SIMULATOR_PAGE).await?;

    let json = r#"{"type":"bubble","body":{"type":"box","layout":"vertical","contents":[]}}"#;
    let host = CdpPage::new(page.clone());
    apply_to_simulator(&host, json, &Timing::default()).await?;

    let applied: String = page.evaluate("window.applied").await?.into_value()?;
    assert_eq!(applied, json);
    let inputs: u32 = page.evaluate("window.inputs").await?.into_value()?;
    assert_eq!(inputs, 1);

    browser.close().await?;
    handle.abort();
    Ok(())
}
