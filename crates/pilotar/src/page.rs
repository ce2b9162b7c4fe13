//! Page handle: the capability set every page object composes.
//!
//! A [`Page`] wraps a single browser tab together with the application
//! base URL and the default interaction timeout. Element operations
//! compile their [`crate::locator::Selector`] to a JavaScript lookup and
//! poll the page until the operation lands or the timeout elapses.
//!
//! With the `browser` feature enabled the page drives a real tab over
//! CDP. A page constructed with [`Page::detached`] has no tab behind it:
//! navigation is tracked locally and element operations report the
//! element as absent, which is what unit tests exercise.

use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::locator::Locator;
use crate::result::{PilotarError, PilotarResult};
use crate::wait::WaitOptions;

#[cfg(feature = "browser")]
use {
    crate::wait::NETWORK_IDLE_THRESHOLD_MS,
    chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType},
    chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams},
    chromiumoxide::page::Page as CdpPage,
    std::sync::Arc,
    std::time::Instant,
    tokio::sync::Mutex,
};

/// A single browser tab plus the base URL it resolves paths against.
///
/// The page is the sole owner of its tab: [`Page::close`] consumes the
/// handle, so releasing it twice does not compile.
#[derive(Debug)]
pub struct Page {
    width: u32,
    height: u32,
    base_url: String,
    wait: WaitOptions,
    url: String,
    #[cfg(feature = "browser")]
    inner: Option<Arc<Mutex<CdpPage>>>,
}

impl Page {
    /// Create a page with no tab behind it.
    #[must_use]
    pub fn detached(
        width: u32,
        height: u32,
        base_url: impl Into<String>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            width,
            height,
            base_url: base_url.into(),
            wait: WaitOptions::new().with_timeout(default_timeout.as_millis() as u64),
            url: String::from("about:blank"),
            #[cfg(feature = "browser")]
            inner: None,
        }
    }

    /// Wrap a live CDP tab.
    #[cfg(feature = "browser")]
    pub(crate) fn attached(
        page: CdpPage,
        width: u32,
        height: u32,
        base_url: impl Into<String>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            width,
            height,
            base_url: base_url.into(),
            wait: WaitOptions::new().with_timeout(default_timeout.as_millis() as u64),
            url: String::from("about:blank"),
            inner: Some(Arc::new(Mutex::new(page))),
        }
    }

    /// Viewport width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Viewport height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default timeout applied when neither the call nor the locator
    /// overrides it.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.wait.timeout()
    }

    /// The URL of the last completed navigation.
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.url
    }

    /// Navigate to a path or absolute URL.
    ///
    /// A `path` already starting with `http` is requested unchanged;
    /// anything else is resolved against the base URL.
    pub async fn navigate(&mut self, path: &str) -> PilotarResult<()> {
        let full_url = self.resolve_url(path);
        info!(url = %full_url, "navigating");
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let page = inner.lock().await;
            page.goto(full_url.as_str())
                .await
                .map_err(|e| PilotarError::Navigation {
                    url: full_url.clone(),
                    message: e.to_string(),
                })?;
        }
        self.url = full_url;
        Ok(())
    }

    /// Click the first element matching the locator.
    pub async fn click(&self, locator: &Locator) -> PilotarResult<()> {
        debug!(%locator, "clicking element");
        let script = format!(
            "(() => {{ const el = {q}; if (!el) return false; el.click(); return true; }})()",
            q = locator.selector().to_query()
        );
        self.run_element_op(locator, &script).await
    }

    /// Replace the value of the first input matching the locator.
    pub async fn fill(&self, locator: &Locator, text: &str) -> PilotarResult<()> {
        debug!(%locator, "filling element");
        let script = format!(
            "(() => {{ const el = {q}; if (!el) return false; el.focus(); el.value = {text:?}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            q = locator.selector().to_query()
        );
        self.run_element_op(locator, &script).await
    }

    /// Type into the first element matching the locator, one character
    /// at a time via key events.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> PilotarResult<()> {
        debug!(%locator, "typing into element");
        let focus = format!(
            "(() => {{ const el = {q}; if (!el) return false; el.focus(); return true; }})()",
            q = locator.selector().to_query()
        );
        self.run_element_op(locator, &focus).await?;
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            for ch in text.chars() {
                let params = DispatchKeyEventParams::builder()
                    .r#type(DispatchKeyEventType::Char)
                    .text(ch.to_string())
                    .build()
                    .map_err(|e| PilotarError::PageError {
                        message: e.to_string(),
                    })?;
                let page = inner.lock().await;
                page.execute(params)
                    .await
                    .map_err(|e| PilotarError::PageError {
                        message: e.to_string(),
                    })?;
            }
        }
        #[cfg(not(feature = "browser"))]
        let _ = text;
        Ok(())
    }

    /// Text content of the first element matching the locator.
    pub async fn text(&self, locator: &Locator) -> PilotarResult<String> {
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let script = format!(
                "(() => {{ const el = {q}; return el ? el.textContent : null; }})()",
                q = locator.selector().to_query()
            );
            let deadline = Instant::now() + self.op_timeout(locator, None);
            loop {
                let value: Option<String> = {
                    let page = inner.lock().await;
                    page.evaluate(script.as_str())
                        .await
                        .ok()
                        .and_then(|r| r.into_value().ok())
                        .flatten()
                };
                if let Some(text) = value {
                    debug!(%locator, %text, "got element text");
                    return Ok(text);
                }
                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(self.wait.poll_interval()).await;
            }
        }
        Err(PilotarError::ElementNotFound {
            selector: locator.to_string(),
        })
    }

    /// Soft visibility query.
    ///
    /// Narrows `PilotarResult<bool>` to `bool`: any failure during the
    /// probe, whatever its cause, becomes `false`. Error detail is
    /// discarded on purpose; this is the one locator operation that does
    /// not fail loudly.
    pub async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.probe_visible(locator, timeout).await.unwrap_or(false)
    }

    /// Block until the element is visible, or fail with `Timeout`.
    pub async fn wait_for_element(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> PilotarResult<()> {
        info!(%locator, "waiting for element");
        let timeout = self.op_timeout(locator, timeout);
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let script = locator.selector().to_visibility_query();
            let deadline = Instant::now() + timeout;
            loop {
                let visible: bool = {
                    let page = inner.lock().await;
                    page.evaluate(script.as_str())
                        .await
                        .ok()
                        .and_then(|r| r.into_value().ok())
                        .unwrap_or(false)
                };
                if visible {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(PilotarError::Timeout {
                        ms: timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(self.wait.poll_interval()).await;
            }
        }
        // A detached page never renders elements.
        Err(PilotarError::Timeout {
            ms: timeout.as_millis() as u64,
        })
    }

    /// Block until the page reports no network activity for the
    /// quiescence window and the document is fully loaded.
    pub async fn wait_for_navigation(&self) -> PilotarResult<()> {
        info!("waiting for navigation to settle");
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let deadline = Instant::now() + self.wait.timeout();
            let idle_window = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
            let mut last_count: u64 = 0;
            let mut stable_since = Instant::now();
            loop {
                let (ready, count) = {
                    let page = inner.lock().await;
                    let ready: String = page
                        .evaluate("document.readyState")
                        .await
                        .ok()
                        .and_then(|r| r.into_value().ok())
                        .unwrap_or_default();
                    let count: u64 = page
                        .evaluate("performance.getEntriesByType('resource').length")
                        .await
                        .ok()
                        .and_then(|r| r.into_value().ok())
                        .unwrap_or(0);
                    (ready, count)
                };
                if count != last_count {
                    last_count = count;
                    stable_since = Instant::now();
                }
                if ready == "complete" && stable_since.elapsed() >= idle_window {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(PilotarError::Timeout {
                        ms: self.wait.timeout_ms,
                    });
                }
                tokio::time::sleep(self.wait.poll_interval()).await;
            }
        }
        Ok(())
    }

    /// Block until the current URL contains `fragment`.
    pub async fn wait_for_url(&mut self, fragment: &str) -> PilotarResult<()> {
        info!(%fragment, "waiting for url");
        #[cfg(feature = "browser")]
        {
            let inner = self.inner.clone();
            if let Some(inner) = inner {
                let deadline = Instant::now() + self.wait.timeout();
                loop {
                    let href: Option<String> = {
                        let page = inner.lock().await;
                        page.evaluate("window.location.href")
                            .await
                            .ok()
                            .and_then(|r| r.into_value().ok())
                    };
                    if let Some(href) = href {
                        if href.contains(fragment) {
                            self.url = href;
                            return Ok(());
                        }
                    }
                    if Instant::now() >= deadline {
                        return Err(PilotarError::Timeout {
                            ms: self.wait.timeout_ms,
                        });
                    }
                    tokio::time::sleep(self.wait.poll_interval()).await;
                }
            }
        }
        if self.url.contains(fragment) {
            Ok(())
        } else {
            Err(PilotarError::Timeout {
                ms: self.wait.timeout_ms,
            })
        }
    }

    /// Capture the rendered page as PNG bytes.
    pub async fn screenshot(&self) -> PilotarResult<Vec<u8>> {
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let page = inner.lock().await;
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = page
                .execute(params)
                .await
                .map_err(|e| PilotarError::Screenshot {
                    message: e.to_string(),
                })?;
            use base64::Engine;
            return base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|e| PilotarError::Screenshot {
                    message: e.to_string(),
                });
        }
        Ok(vec![])
    }

    /// Capture the rendered page to an image file, overwriting any
    /// existing file at `path`.
    pub async fn save_screenshot(&self, path: &Path) -> PilotarResult<()> {
        let bytes = self.screenshot().await?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        info!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    /// Release the underlying tab. Consumes the handle.
    pub async fn close(self) -> PilotarResult<()> {
        info!("closing page");
        #[cfg(feature = "browser")]
        if let Some(inner) = self.inner {
            let mutex = Arc::try_unwrap(inner).map_err(|_| PilotarError::PageError {
                message: "page handle still shared at close".to_string(),
            })?;
            mutex
                .into_inner()
                .close()
                .await
                .map_err(|e| PilotarError::PageError {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn op_timeout(&self, locator: &Locator, timeout: Option<Duration>) -> Duration {
        timeout
            .or_else(|| locator.timeout())
            .unwrap_or(self.wait.timeout())
    }

    async fn run_element_op(&self, locator: &Locator, script: &str) -> PilotarResult<()> {
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let deadline = Instant::now() + self.op_timeout(locator, None);
            loop {
                let done: bool = {
                    let page = inner.lock().await;
                    page.evaluate(script)
                        .await
                        .ok()
                        .and_then(|r| r.into_value().ok())
                        .unwrap_or(false)
                };
                if done {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(self.wait.poll_interval()).await;
            }
            return Err(PilotarError::ElementNotFound {
                selector: locator.to_string(),
            });
        }
        #[cfg(not(feature = "browser"))]
        let _ = script;
        Err(PilotarError::ElementNotFound {
            selector: locator.to_string(),
        })
    }

    async fn probe_visible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> PilotarResult<bool> {
        #[cfg(feature = "browser")]
        if let Some(inner) = &self.inner {
            let script = locator.selector().to_visibility_query();
            let deadline = Instant::now() + self.op_timeout(locator, timeout);
            loop {
                let visible: bool = {
                    let page = inner.lock().await;
                    page.evaluate(script.as_str())
                        .await
                        .map_err(|e| PilotarError::PageError {
                            message: e.to_string(),
                        })?
                        .into_value()?
                };
                if visible {
                    return Ok(true);
                }
                if Instant::now() >= deadline {
                    return Ok(false);
                }
                tokio::time::sleep(self.wait.poll_interval()).await;
            }
        }
        #[cfg(not(feature = "browser"))]
        let _ = timeout;
        Err(PilotarError::ElementNotFound {
            selector: locator.to_string(),
        })
    }
}
