//! Browser process control.
//!
//! With the `browser` feature enabled this launches a real Chromium over
//! the Chrome DevTools Protocol via chromiumoxide. Without the feature a
//! mock implementation with the same API stands in, so the session
//! lifecycle is exercisable in unit tests with no browser installed.

use std::str::FromStr;

use crate::config::EnvConfig;
use crate::result::{PilotarError, PilotarResult};

/// Browser engine kind.
///
/// The CDP backend drives Chromium only; the configuration key is still
/// honoured so that an unsupported engine fails launch instead of
/// silently running a different browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Chromium/Chrome
    Chromium,
}

impl FromStr for EngineKind {
    type Err = PilotarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            other => Err(PilotarError::BrowserLaunch {
                message: format!("unsupported browser engine: {other}"),
            }),
        }
    }
}

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Engine name as configured (parsed at launch)
    pub engine: String,
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Default interaction timeout in milliseconds
    pub default_timeout_ms: u64,
    /// Application base URL handed to new pages
    pub base_url: String,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: String::from("chromium"),
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            default_timeout_ms: crate::wait::DEFAULT_TIMEOUT_MS,
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Build a browser configuration from environment settings.
    #[must_use]
    pub fn from_env_config(env: &EnvConfig) -> Self {
        Self {
            engine: env.engine().to_string(),
            headless: env.headless(),
            viewport_width: env.viewport_width(),
            viewport_height: env.viewport_height(),
            default_timeout_ms: env.timeout_ms(),
            base_url: env.base_url().to_string(),
            ..Self::default()
        }
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the base URL handed to new pages
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{BrowserConfig, EngineKind, PilotarError, PilotarResult};
    use crate::page::Page;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tracing::info;

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser process.
        ///
        /// # Errors
        ///
        /// Returns `BrowserLaunch` when the engine is unsupported or the
        /// process cannot be started.
        pub async fn launch(config: BrowserConfig) -> PilotarResult<Self> {
            let _engine: EngineKind = config.engine.parse()?;

            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|e| PilotarError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                PilotarError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            // Drive CDP messages until the connection drops
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            info!(engine = %config.engine, headless = config.headless, "browser launched");

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a fresh tab with the configured viewport and timeout.
        ///
        /// # Errors
        ///
        /// Returns `PageError` if the tab cannot be created.
        pub async fn new_page(&self) -> PilotarResult<Page> {
            let browser = self.inner.lock().await;
            let cdp_page =
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| PilotarError::PageError {
                        message: e.to_string(),
                    })?;

            let metrics = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(self.config.viewport_width))
                .height(i64::from(self.config.viewport_height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(|e| PilotarError::PageError {
                    message: e.to_string(),
                })?;
            cdp_page
                .execute(metrics)
                .await
                .map_err(|e| PilotarError::PageError {
                    message: e.to_string(),
                })?;

            info!("new page created");

            Ok(Page::attached(
                cdp_page,
                self.config.viewport_width,
                self.config.viewport_height,
                self.config.base_url.clone(),
                Duration::from_millis(self.config.default_timeout_ms),
            ))
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Shut the browser process down. Consumes the handle.
        pub async fn close(self) -> PilotarResult<()> {
            {
                let mut browser = self.inner.lock().await;
                browser
                    .close()
                    .await
                    .map_err(|e| PilotarError::BrowserLaunch {
                        message: e.to_string(),
                    })?;
            }
            self.handle.abort();
            info!("browser closed");
            Ok(())
        }
    }
}

// ============================================================================
// Mock implementation (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod mock {
    use super::{BrowserConfig, EngineKind, PilotarResult};
    use crate::page::Page;
    use std::time::Duration;
    use tracing::info;

    /// Browser instance (mock when the `browser` feature is disabled)
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// Launch a browser (mock).
        ///
        /// # Errors
        ///
        /// Returns `BrowserLaunch` when the engine is unsupported, so
        /// configuration mistakes surface without a real browser.
        pub async fn launch(config: BrowserConfig) -> PilotarResult<Self> {
            let _engine: EngineKind = config.engine.parse()?;
            info!(engine = %config.engine, headless = config.headless, "browser launched (mock)");
            Ok(Self { config })
        }

        /// Open a detached page with the configured viewport and timeout.
        pub async fn new_page(&self) -> PilotarResult<Page> {
            Ok(Page::detached(
                self.config.viewport_width,
                self.config.viewport_height,
                self.config.base_url.clone(),
                Duration::from_millis(self.config.default_timeout_ms),
            ))
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Shut the browser down. Consumes the handle.
        pub async fn close(self) -> PilotarResult<()> {
            info!("browser closed (mock)");
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::Browser;

#[cfg(not(feature = "browser"))]
pub use mock::Browser;
