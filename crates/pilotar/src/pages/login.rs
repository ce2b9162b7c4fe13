//! Login screen page object.

use tracing::info;

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::PilotarResult;

/// Page object for the login screen.
///
/// Holds a borrowed page handle for the duration of a flow; the fixture
/// keeps ownership of the page itself.
#[derive(Debug)]
pub struct LoginPage<'a> {
    page: &'a mut Page,
}

impl<'a> LoginPage<'a> {
    /// Wrap a page handle.
    #[must_use]
    pub fn new(page: &'a mut Page) -> Self {
        Self { page }
    }

    fn email_input() -> Locator {
        Locator::new("input[type='email']")
    }

    fn password_input() -> Locator {
        Locator::new("input[type='password']")
    }

    fn login_button() -> Locator {
        Locator::new("button").with_text("Sign In")
    }

    fn error_message() -> Locator {
        Locator::new(".error-message")
    }

    fn forgot_password_link() -> Locator {
        Locator::new("a").with_text("Forgot Password")
    }

    fn signup_link() -> Locator {
        Locator::new("a").with_text("Sign Up")
    }

    fn remember_me_checkbox() -> Locator {
        Locator::new("input[type='checkbox']")
    }

    /// Navigate to the login screen and wait for the email field.
    pub async fn open(&mut self) -> PilotarResult<()> {
        self.page.navigate("/login").await?;
        self.page.wait_for_element(&Self::email_input(), None).await
    }

    /// Submit the login form and wait for navigation to settle.
    pub async fn login(&mut self, email: &str, password: &str) -> PilotarResult<()> {
        info!(%email, "attempting login");
        self.page.fill(&Self::email_input(), email).await?;
        self.page.fill(&Self::password_input(), password).await?;
        self.page.click(&Self::login_button()).await?;
        self.page.wait_for_navigation().await
    }

    /// Log in with the remember-me toggle checked.
    pub async fn login_with_remember_me(
        &mut self,
        email: &str,
        password: &str,
    ) -> PilotarResult<()> {
        info!(%email, "attempting login with remember me");
        self.page.fill(&Self::email_input(), email).await?;
        self.page.fill(&Self::password_input(), password).await?;
        self.page.click(&Self::remember_me_checkbox()).await?;
        self.page.click(&Self::login_button()).await?;
        self.page.wait_for_navigation().await
    }

    /// Fill only the password field (for partial-submission flows).
    pub async fn fill_password(&mut self, password: &str) -> PilotarResult<()> {
        self.page.fill(&Self::password_input(), password).await
    }

    /// Submit the form without touching the inputs.
    pub async fn submit(&mut self) -> PilotarResult<()> {
        self.page.click(&Self::login_button()).await
    }

    /// Text of the error banner.
    pub async fn error_text(&self) -> PilotarResult<String> {
        self.page.text(&Self::error_message()).await
    }

    /// Whether the error banner is visible (soft query).
    pub async fn is_error_displayed(&self) -> bool {
        self.page.is_visible(&Self::error_message(), None).await
    }

    /// Follow the forgot-password link and wait for navigation to settle.
    pub async fn click_forgot_password(&mut self) -> PilotarResult<()> {
        self.page.click(&Self::forgot_password_link()).await?;
        self.page.wait_for_navigation().await
    }

    /// Follow the signup link and wait for navigation to settle.
    pub async fn click_signup(&mut self) -> PilotarResult<()> {
        self.page.click(&Self::signup_link()).await?;
        self.page.wait_for_navigation().await
    }

    /// Mutable access to the underlying page, for URL waits after a flow.
    pub fn page_mut(&mut self) -> &mut Page {
        self.page
    }
}

impl PageObject for LoginPage<'_> {
    fn page(&self) -> &Page {
        self.page
    }

    fn url_pattern(&self) -> &str {
        "/login"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn page() -> Page {
        Page::detached(
            1280,
            720,
            "https://staging.example.com",
            Duration::from_millis(20),
        )
    }

    #[tokio::test]
    async fn test_open_navigates_to_login_path() {
        let mut page = page();
        let mut login = LoginPage::new(&mut page);
        // The wait fails on a detached page, but navigation already happened.
        let _ = login.open().await;
        assert_eq!(page.current_url(), "https://staging.example.com/login");
    }

    #[tokio::test]
    async fn test_error_banner_soft_query_defaults_to_false() {
        let mut page = page();
        let login = LoginPage::new(&mut page);
        assert!(!login.is_error_displayed().await);
    }

    #[tokio::test]
    async fn test_at_page_after_open() {
        let mut page = page();
        let mut login = LoginPage::new(&mut page);
        let _ = login.open().await;
        assert!(login.at_page());
        assert_eq!(login.url_pattern(), "/login");
    }
}
