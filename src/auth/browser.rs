//! Browser session bootstrap
//!
//! Launches one Chromium instance per crawl process and keeps a single
//! logical page for the whole run. Login, DOM-driven pagination and the
//! cookie hand-off to the HTTP driver all share this page; operations on it
//! are strictly sequential.

use crate::config::BrowserConfig as BrowserSettings;
use crate::LeadscopeError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A launched browser with its event handler task and the run's page
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launches Chromium per the configured flags and opens the run's page.
    pub async fn launch(
        settings: &BrowserSettings,
        navigation_timeout: Duration,
    ) -> Result<Self, LeadscopeError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(navigation_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(dir) = &settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        let config = builder.build().map_err(LeadscopeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| LeadscopeError::Browser(e.to_string()))?;

        // Drive the CDP event stream; the connection dies without this.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| LeadscopeError::Browser(e.to_string()))?;

        Ok(Self {
            browser,
            handler_task,
            page,
        })
    }

    /// The run's single page
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Builds a `name=value; name=value` Cookie header from the session,
    /// for the HTTP driver to reuse the authenticated state.
    pub async fn cookie_header(&self) -> Result<String, LeadscopeError> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| LeadscopeError::Browser(e.to_string()))?;

        Ok(cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Closes the browser and stops the handler task.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Browser close failed: {}", e);
        }
        self.handler_task.abort();
    }
}
