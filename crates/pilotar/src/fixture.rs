//! Session fixtures: configuration context and the per-test browser
//! lifecycle.
//!
//! [`SessionContext`] loads environment settings, credentials, and
//! tenants once per run; it is immutable afterwards and handed to every
//! scenario explicitly. [`TestSession`] provisions one browser and one
//! page per test, and releases them in reverse order after the body has
//! run, capturing a screenshot first regardless of the outcome.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::browser::{Browser, BrowserConfig};
use crate::config::{ConfigLoader, Credentials, EnvConfig, TenantSet};
use crate::page::Page;
use crate::result::{PilotarError, PilotarResult};

/// Default directory for teardown screenshots
pub const SCREENSHOTS_DIR: &str = "screenshots";

/// Read-only configuration shared by every test in a run.
#[derive(Debug, Clone)]
pub struct SessionContext {
    environment: String,
    env: EnvConfig,
    credentials: Credentials,
    tenants: TenantSet,
}

impl SessionContext {
    /// Load all three configuration documents for the named environment.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` / `ConfigParseError` abort session setup.
    pub fn load(config_dir: impl AsRef<Path>, environment: &str) -> PilotarResult<Self> {
        let loader = ConfigLoader::new(config_dir.as_ref());
        info!(environment, dir = %config_dir.as_ref().display(), "loading session configuration");
        Ok(Self {
            environment: environment.to_string(),
            env: loader.env_config(environment)?,
            credentials: loader.credentials()?,
            tenants: loader.tenants()?,
        })
    }

    /// The selected environment name.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Environment settings.
    #[must_use]
    pub const fn env(&self) -> &EnvConfig {
        &self.env
    }

    /// Seeded account credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Tenant definitions.
    #[must_use]
    pub const fn tenants(&self) -> &TenantSet {
        &self.tenants
    }
}

/// Lifecycle states of a test session, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing provisioned yet
    Uninitialized,
    /// Browser process is up
    BrowserLaunched,
    /// Page is open; the test body runs here
    PageOpened,
    /// Teardown screenshot has been attempted
    ScreenshotCaptured,
    /// Page handle released
    PageClosed,
    /// Browser process released
    BrowserClosed,
}

/// One browser and one page, scoped to a single test.
///
/// Setup and teardown are strictly sequential. Teardown always runs the
/// same steps in the same order: screenshot, close page, close browser.
#[derive(Debug)]
pub struct TestSession {
    state: SessionState,
    browser: Option<Browser>,
    page: Option<Page>,
    screenshots_dir: PathBuf,
    test_name: Option<String>,
}

impl TestSession {
    /// Create a session writing teardown screenshots under `screenshots_dir`.
    #[must_use]
    pub fn new(screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: SessionState::Uninitialized,
            browser: None,
            page: None,
            screenshots_dir: screenshots_dir.into(),
            test_name: None,
        }
    }

    /// Tag the session with a test name; the slug becomes part of the
    /// screenshot filename so parallel tests cannot collide on it.
    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(slug(&name.into()));
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Launch the browser and open the page, per the session configuration.
    ///
    /// # Errors
    ///
    /// Fails when called twice, or when launch fails. If the page cannot
    /// be opened the already-launched browser is released before the
    /// error is returned.
    pub async fn start(&mut self, ctx: &SessionContext) -> PilotarResult<()> {
        if self.state != SessionState::Uninitialized {
            return Err(PilotarError::invalid_state(format!(
                "session already started (state: {:?})",
                self.state
            )));
        }

        let config = BrowserConfig::from_env_config(ctx.env());
        let browser = Browser::launch(config).await?;
        self.browser = Some(browser);
        self.state = SessionState::BrowserLaunched;

        let page = match &self.browser {
            Some(browser) => browser.new_page().await,
            None => Err(PilotarError::fixture("browser handle missing")),
        };
        match page {
            Ok(page) => {
                self.page = Some(page);
                self.state = SessionState::PageOpened;
                Ok(())
            }
            Err(e) => {
                if let Some(browser) = self.browser.take() {
                    if let Err(close_err) = browser.close().await {
                        warn!(error = %close_err, "browser close failed after page open error");
                    }
                }
                self.state = SessionState::BrowserClosed;
                Err(e)
            }
        }
    }

    /// The open page.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is in `PageOpened`.
    pub fn page_mut(&mut self) -> PilotarResult<&mut Page> {
        self.page
            .as_mut()
            .ok_or_else(|| PilotarError::invalid_state("no open page; call start first"))
    }

    /// Tear the session down: screenshot, close page, close browser.
    ///
    /// Runs unconditionally of the test outcome. The screenshot is
    /// diagnostics; its failure is logged and suppressed so it cannot
    /// mask the test's own result. Close failures are reported, but
    /// teardown still proceeds through the remaining steps and the first
    /// error wins.
    pub async fn finish(&mut self) -> PilotarResult<()> {
        let mut first_error: Option<PilotarError> = None;

        if let Some(page) = &self.page {
            let path = self.screenshot_path();
            match page.save_screenshot(&path).await {
                Ok(()) => info!(path = %path.display(), "teardown screenshot captured"),
                Err(e) => warn!(error = %e, "teardown screenshot failed"),
            }
            self.state = SessionState::ScreenshotCaptured;
        }

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!(error = %e, "page close failed");
                first_error.get_or_insert(e);
            }
            self.state = SessionState::PageClosed;
        }

        if let Some(browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "browser close failed");
                first_error.get_or_insert(e);
            }
            self.state = SessionState::BrowserClosed;
        }

        match first_error {
            Some(e) => Err(PilotarError::fixture(format!("teardown failed: {e}"))),
            None => Ok(()),
        }
    }

    fn screenshot_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let file = match &self.test_name {
            Some(name) => format!("screenshot_{name}_{stamp}.png"),
            None => format!("screenshot_{stamp}.png"),
        };
        self.screenshots_dir.join(file)
    }
}

/// Lowercase a test name into a filename-safe slug.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> SessionContext {
        fs::write(
            dir.path().join("env.yaml"),
            "staging:\n  headless: true\n  base_url: https://staging.example.com\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("credentials.yaml"),
            "test_users:\n  admin:\n    email: admin@x.com\n    password: Secret1\n",
        )
        .unwrap();
        fs::write(dir.path().join("tenants.yaml"), "acme:\n  plan: enterprise\n").unwrap();
        SessionContext::load(dir.path(), "staging").unwrap()
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_load_reads_all_documents() {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir);
            assert_eq!(ctx.environment(), "staging");
            assert!(ctx.env().headless());
            assert_eq!(ctx.credentials().user("admin").unwrap().email, "admin@x.com");
            assert_eq!(ctx.tenants().ids(), vec!["acme"]);
        }

        #[test]
        fn test_load_fails_on_missing_document() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("env.yaml"), "staging: {}\n").unwrap();
            let err = SessionContext::load(dir.path(), "staging").unwrap_err();
            assert!(matches!(err, PilotarError::ConfigNotFound { .. }));
        }
    }

    mod slug_tests {
        use super::*;

        #[test]
        fn test_slug_is_filename_safe() {
            assert_eq!(slug("Successful Login!"), "successful_login_");
            assert_eq!(slug("invalid-credentials"), "invalid_credentials");
        }
    }

    #[test]
    fn test_new_session_is_uninitialized() {
        let session = TestSession::new("screenshots");
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_page_before_start_is_invalid_state() {
        let mut session = TestSession::new("screenshots");
        assert!(matches!(
            session.page_mut().unwrap_err(),
            PilotarError::InvalidState { .. }
        ));
    }

    #[cfg(not(feature = "browser"))]
    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_lifecycle_produces_one_screenshot() {
            let config_dir = TempDir::new().unwrap();
            let shots_dir = TempDir::new().unwrap();
            let ctx = context(&config_dir);

            let mut session =
                TestSession::new(shots_dir.path()).with_test_name("successful_login");
            session.start(&ctx).await.unwrap();
            assert_eq!(session.state(), SessionState::PageOpened);
            assert_eq!(
                session.page_mut().unwrap().base_url(),
                "https://staging.example.com"
            );

            session.finish().await.unwrap();
            assert_eq!(session.state(), SessionState::BrowserClosed);

            let files: Vec<_> = fs::read_dir(shots_dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect();
            assert_eq!(files.len(), 1);
            assert!(files[0].starts_with("screenshot_successful_login_"));
            assert!(files[0].ends_with(".png"));
        }

        #[tokio::test]
        async fn test_teardown_runs_after_failed_body_too() {
            let config_dir = TempDir::new().unwrap();
            let shots_dir = TempDir::new().unwrap();
            let ctx = context(&config_dir);

            let mut session = TestSession::new(shots_dir.path());
            session.start(&ctx).await.unwrap();

            // Body fails; teardown still captures and releases everything.
            let body: PilotarResult<()> = Err(PilotarError::assertion("boom"));
            assert!(body.is_err());

            session.finish().await.unwrap();
            assert_eq!(session.state(), SessionState::BrowserClosed);
            assert_eq!(fs::read_dir(shots_dir.path()).unwrap().count(), 1);
        }

        #[tokio::test]
        async fn test_double_start_is_rejected() {
            let config_dir = TempDir::new().unwrap();
            let ctx = context(&config_dir);
            let shots_dir = TempDir::new().unwrap();

            let mut session = TestSession::new(shots_dir.path());
            session.start(&ctx).await.unwrap();
            assert!(matches!(
                session.start(&ctx).await.unwrap_err(),
                PilotarError::InvalidState { .. }
            ));
            session.finish().await.unwrap();
        }

        #[tokio::test]
        async fn test_finish_without_start_is_a_no_op() {
            let mut session = TestSession::new("screenshots");
            session.finish().await.unwrap();
            assert_eq!(session.state(), SessionState::Uninitialized);
        }
    }
}
