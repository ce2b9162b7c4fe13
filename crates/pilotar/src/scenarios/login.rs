//! Login test cases.
//!
//! Each scenario receives the session context and the session's page;
//! the suite runner owns the browser lifecycle around it.

use super::ensure;
use crate::config::Credential;
use crate::fixture::SessionContext;
use crate::harness::{Marker, Scenario, ScenarioFuture, Suite};
use crate::page::Page;
use crate::page_object::PageObject;
use crate::pages::LoginPage;
use crate::result::{PilotarError, PilotarResult};
use crate::testdata::{DataGenerator, DEFAULT_PASSWORD_LENGTH};

/// Build the login suite.
#[must_use]
pub fn suite() -> Suite {
    Suite::new("login")
        .with_scenario(Scenario::new(
            "successful_login",
            Marker::Smoke,
            successful_login,
        ))
        .with_scenario(Scenario::new(
            "invalid_credentials",
            Marker::Smoke,
            invalid_credentials,
        ))
        .with_scenario(Scenario::new("empty_email", Marker::Smoke, empty_email))
        .with_scenario(Scenario::new("remember_me", Marker::Smoke, remember_me))
        .with_scenario(Scenario::new(
            "forgot_password_link",
            Marker::Regression,
            forgot_password_link,
        ))
        .with_scenario(Scenario::new(
            "signup_link",
            Marker::Regression,
            signup_link,
        ))
}

fn admin(ctx: &SessionContext) -> PilotarResult<Credential> {
    ctx.credentials()
        .user("admin")
        .ok_or_else(|| PilotarError::fixture("no admin entry under test_users"))
}

fn successful_login<'a>(ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let user = admin(ctx)?;
        let mut login = LoginPage::new(page);
        login.open().await?;
        login.login(&user.email, &user.password).await?;
        login.page_mut().wait_for_url("/dashboard").await?;
        ensure(
            login.page().current_url().contains("/dashboard"),
            "login did not land on the dashboard",
        )
    })
}

fn invalid_credentials<'a>(_ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let mut login = LoginPage::new(page);
        login.open().await?;
        login.login("invalid@example.com", "wrongpassword").await?;
        ensure(
            login.is_error_displayed().await,
            "error banner not visible after rejected login",
        )?;
        let message = login.error_text().await?.to_lowercase();
        ensure(
            message.contains("invalid") || message.contains("incorrect"),
            "error banner does not mention invalid credentials",
        )?;
        login.page_mut().wait_for_url("/login").await?;
        ensure(login.at_page(), "left the login screen on a rejected login")
    })
}

fn empty_email<'a>(_ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let mut generator = DataGenerator::new();
        let mut login = LoginPage::new(page);
        login.open().await?;
        login
            .fill_password(&generator.password(DEFAULT_PASSWORD_LENGTH))
            .await?;
        login.submit().await?;
        ensure(
            login.is_error_displayed().await,
            "error banner not visible for an empty email submission",
        )
    })
}

fn remember_me<'a>(ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let user = admin(ctx)?;
        let mut login = LoginPage::new(page);
        login.open().await?;
        login
            .login_with_remember_me(&user.email, &user.password)
            .await?;
        login.page_mut().wait_for_url("/dashboard").await?;
        ensure(
            login.page().current_url().contains("/dashboard"),
            "remember-me login did not land on the dashboard",
        )
    })
}

fn forgot_password_link<'a>(_ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let mut login = LoginPage::new(page);
        login.open().await?;
        login.click_forgot_password().await?;
        login.page_mut().wait_for_url("/forgot-password").await?;
        ensure(
            login.page().current_url().contains("/forgot-password"),
            "forgot-password link did not navigate",
        )
    })
}

fn signup_link<'a>(_ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let mut login = LoginPage::new(page);
        login.open().await?;
        login.click_signup().await?;
        login.page_mut().wait_for_url("/signup").await?;
        ensure(
            login.page().current_url().contains("/signup"),
            "signup link did not navigate",
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_registers_all_flows() {
        let suite = suite();
        assert_eq!(suite.len(), 6);
        let names: Vec<_> = suite.scenarios().iter().map(|s| s.name).collect();
        assert!(names.contains(&"successful_login"));
        assert!(names.contains(&"signup_link"));
    }

    #[test]
    fn test_marker_split() {
        let suite = suite();
        assert_eq!(suite.clone().filtered(Some(Marker::Smoke), None).len(), 4);
        assert_eq!(suite.filtered(Some(Marker::Regression), None).len(), 2);
    }
}
