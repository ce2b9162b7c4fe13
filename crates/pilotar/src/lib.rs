//! Pilotar: browser-driven end-to-end test harness for WorkflowPro.
//!
//! The harness follows the page-object pattern: page objects encapsulate
//! element locators and interaction flows for one screen, scenarios
//! compose those flows into assertions, and session fixtures provision
//! one browser and one page per scenario.
//!
//! # Architecture
//!
//! ```text
//! config/*.yaml ──► SessionContext ──► TestSession ──► Page ──► page objects
//!                    (per run)          (per test)              (per flow)
//! ```
//!
//! Real browser control requires the `browser` feature (Chromium over
//! CDP). Without it every handle is a mock with the same API, which is
//! what the unit tests run against.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod browser;
pub mod config;
pub mod fixture;
pub mod harness;
pub mod locator;
pub mod page;
pub mod page_object;
pub mod pages;
pub mod result;
pub mod scenarios;
pub mod testdata;
pub mod wait;

pub use browser::{Browser, BrowserConfig, EngineKind};
pub use config::{ConfigLoader, Credential, Credentials, EnvConfig, TenantSet};
pub use fixture::{SessionContext, SessionState, TestSession, SCREENSHOTS_DIR};
pub use harness::{Marker, Scenario, ScenarioFn, ScenarioFuture, ScenarioResult, Suite, SuiteResults};
pub use locator::{Locator, Selector};
pub use page::Page;
pub use page_object::{PageObject, UrlMatcher};
pub use pages::LoginPage;
pub use result::{PilotarError, PilotarResult};
pub use testdata::{DataGenerator, DEFAULT_PASSWORD_LENGTH};
pub use wait::{WaitOptions, DEFAULT_TIMEOUT_MS};
