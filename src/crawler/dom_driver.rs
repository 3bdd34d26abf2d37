//! DOM page driver
//!
//! Drives the live browser page through the listing: navigation via CDP,
//! extraction by handing the rendered HTML to the same parsing ruleset the
//! HTTP back-end uses. Pagination here is a click, so this back-end works on
//! portals whose next-page control is script-driven rather than a plain link.

use crate::crawler::driver::{CaptureMode, DriveError, LeadRow, PageDriver};
use crate::crawler::extract::{parse_listing, NEXT_LABELS, NEXT_SYMBOLS};
use async_trait::async_trait;
use chromiumoxide::Page;
use std::time::Duration;
use url::Url;

const NEXT_TAG_ATTR: &str = "data-leadscope-next";

/// Settle time after a next-page click, for script-driven reloads that never
/// emit a navigation event.
const CLICK_SETTLE: Duration = Duration::from_millis(1500);

/// PageDriver backed by the authenticated browser page
pub struct DomDriver {
    page: Page,
    opened: bool,
}

impl DomDriver {
    /// Wraps the session's page. The page must already be authenticated.
    pub fn new(page: Page) -> Self {
        Self {
            page,
            opened: false,
        }
    }

    async fn evaluate_bool(&self, script: String) -> Result<bool, DriveError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| DriveError::Browser(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| DriveError::Browser(e.to_string()))
    }

    /// Best-effort: bump the listing's items-per-page control to its largest
    /// option, so the crawl visits fewer pages. Any failure is ignored.
    async fn maximize_page_size(&self) {
        let script = r#"
            (() => {
                const select = document.querySelector(
                    'select[name*="length"], select[name*="porPagina"], select.items-per-page');
                if (!select || select.options.length === 0) return false;
                let best = 0;
                for (let i = 0; i < select.options.length; i++) {
                    const v = parseInt(select.options[i].value, 10);
                    if (!isNaN(v) && v > parseInt(select.options[best].value, 10)) best = i;
                }
                if (select.selectedIndex === best) return false;
                select.selectedIndex = best;
                select.dispatchEvent(new Event('change', { bubbles: true }));
                return true;
            })()
        "#;

        match self.page.evaluate(script).await {
            Ok(result) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    tracing::debug!("Bumped items-per-page to the largest option");
                    tokio::time::sleep(CLICK_SETTLE).await;
                }
            }
            Err(e) => tracing::debug!("Items-per-page adjustment skipped: {}", e),
        }
    }

    /// Script that tags the first usable next-page control with
    /// [`NEXT_TAG_ATTR`], using the shared pagination vocabulary.
    fn tag_next_script() -> Result<String, DriveError> {
        let labels = serde_json::to_string(&NEXT_LABELS)
            .map_err(|e| DriveError::Browser(e.to_string()))?;
        let symbols = serde_json::to_string(&NEXT_SYMBOLS)
            .map_err(|e| DriveError::Browser(e.to_string()))?;

        Ok(format!(
            r#"
            (() => {{
                const labels = {labels};
                const symbols = {symbols};
                const matches = (raw) => {{
                    const text = (raw || '').trim().toLowerCase();
                    return labels.some((w) => text.includes(w)) || symbols.includes(text);
                }};
                const candidates = document.querySelectorAll('a, button');
                for (const el of candidates) {{
                    if (!matches(el.textContent) &&
                        !matches(el.getAttribute('aria-label'))) continue;
                    if (el.disabled) continue;
                    const holder = el.closest('li, .page-item');
                    if (holder && holder.classList.contains('disabled')) continue;
                    el.setAttribute('{NEXT_TAG_ATTR}', '1');
                    return true;
                }}
                return false;
            }})()
            "#
        ))
    }

    async fn untag_next(&self) {
        let script = format!(
            "document.querySelectorAll('[{0}]').forEach((el) => el.removeAttribute('{0}'))",
            NEXT_TAG_ATTR
        );
        if let Err(e) = self.page.evaluate(script).await {
            tracing::debug!("Next-page tag cleanup failed: {}", e);
        }
    }
}

#[async_trait]
impl PageDriver for DomDriver {
    async fn open(&mut self, url: &Url) -> Result<(), DriveError> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| DriveError::Browser(e.to_string()))?;

        self.maximize_page_size().await;
        self.opened = true;
        Ok(())
    }

    async fn collect(&mut self, mode: CaptureMode) -> Result<Vec<LeadRow>, DriveError> {
        if !self.opened {
            return Err(DriveError::NotOpen);
        }

        let html = self
            .page
            .content()
            .await
            .map_err(|e| DriveError::Browser(e.to_string()))?;

        Ok(parse_listing(&html, mode).rows)
    }

    async fn next_page(&mut self) -> Result<bool, DriveError> {
        if !self.opened {
            return Err(DriveError::NotOpen);
        }

        if !self.evaluate_bool(Self::tag_next_script()?).await? {
            return Ok(false);
        }

        let click = async {
            self.page
                .find_element(format!("[{}]", NEXT_TAG_ATTR))
                .await
                .map_err(|e| DriveError::Browser(e.to_string()))?
                .click()
                .await
                .map_err(|e| DriveError::Browser(e.to_string()))?;
            Ok::<(), DriveError>(())
        }
        .await;

        self.untag_next().await;
        click?;

        // Full navigations emit an event; script-driven reloads only settle.
        let _ = self.page.wait_for_navigation().await;
        tokio::time::sleep(CLICK_SETTLE).await;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_script_embeds_vocabulary() {
        let script = DomDriver::tag_next_script().unwrap();
        for label in NEXT_LABELS {
            assert!(script.contains(label));
        }
        assert!(script.contains(NEXT_TAG_ATTR));
    }
}
